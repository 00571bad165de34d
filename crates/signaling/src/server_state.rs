//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt die WebRTC-API, die Metriken und den Sitzungszaehler als
//! Arc-geteilten Zustand fuer alle Verbindungs-Tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rtcrest_media::RtcApi;
use rtcrest_observability::RtcMetriken;
use tokio::sync::watch;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Maximale gleichzeitige Sitzungen
    pub max_sitzungen: usize,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            max_sitzungen: 100,
            keepalive_sek: 30,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState {
    pub config: SignalingConfig,
    pub rtc: RtcApi,
    pub metriken: RtcMetriken,
    shutdown_rx: watch::Receiver<bool>,
    aktive: AtomicUsize,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState
    pub fn neu(
        config: SignalingConfig,
        rtc: RtcApi,
        metriken: RtcMetriken,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            rtc,
            metriken,
            shutdown_rx,
            aktive: AtomicUsize::new(0),
        })
    }

    /// Anzahl offener Sitzungen
    pub fn aktive_sitzungen(&self) -> usize {
        self.aktive.load(Ordering::SeqCst)
    }

    /// Shutdown-Empfaenger fuer eine neue Verbindung
    pub fn shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Reserviert einen Sitzungsplatz
    ///
    /// Gibt `None` zurueck wenn `max_sitzungen` erreicht ist. Der Platz wird
    /// freigegeben sobald der [`SitzungsPlatz`] gedroppt wird.
    pub fn platz_reservieren(self: &Arc<Self>) -> Option<SitzungsPlatz> {
        let max = self.config.max_sitzungen;
        let reserviert = self
            .aktive
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < max).then_some(n + 1)
            })
            .is_ok();

        if !reserviert {
            self.metriken.abgelehnte_sitzungen_total.inc();
            return None;
        }

        self.metriken.aktive_sitzungen.inc();
        self.metriken.sitzungen_total.inc();
        Some(SitzungsPlatz {
            state: Arc::clone(self),
        })
    }
}

impl std::fmt::Debug for SignalingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalingState")
            .field("config", &self.config)
            .field("aktive", &self.aktive_sitzungen())
            .finish_non_exhaustive()
    }
}

/// Belegter Sitzungsplatz, gibt sich beim Drop frei
#[derive(Debug)]
pub struct SitzungsPlatz {
    state: Arc<SignalingState>,
}

impl Drop for SitzungsPlatz {
    fn drop(&mut self) {
        self.state.aktive.fetch_sub(1, Ordering::SeqCst);
        self.state.metriken.aktive_sitzungen.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtcrest_api::{api_router, ApiState, RestDispatcher};
    use rtcrest_media::MediaKonfig;

    fn state(max: usize) -> (Arc<SignalingState>, watch::Sender<bool>) {
        let metriken = RtcMetriken::neu().unwrap();
        let rtc = RtcApi::neu(
            MediaKonfig::default(),
            RestDispatcher::neu(api_router(ApiState::default())),
            metriken.clone(),
        )
        .unwrap();
        let (tx, rx) = watch::channel(false);
        let config = SignalingConfig {
            max_sitzungen: max,
            ..Default::default()
        };
        (SignalingState::neu(config, rtc, metriken, rx), tx)
    }

    #[test]
    fn limit_wird_eingehalten() {
        let (state, _tx) = state(2);
        let a = state.platz_reservieren().unwrap();
        let _b = state.platz_reservieren().unwrap();
        assert!(state.platz_reservieren().is_none());
        assert_eq!(state.aktive_sitzungen(), 2);
        assert_eq!(state.metriken.abgelehnte_sitzungen_total.get(), 1);

        drop(a);
        assert_eq!(state.aktive_sitzungen(), 1);
        assert!(state.platz_reservieren().is_some());
    }

    #[test]
    fn gauge_folgt_plaetzen() {
        let (state, _tx) = state(10);
        let plaetze: Vec<_> = (0..3).filter_map(|_| state.platz_reservieren()).collect();
        assert_eq!(state.metriken.aktive_sitzungen.get(), 3);
        assert_eq!(state.metriken.sitzungen_total.get(), 3);
        drop(plaetze);
        assert_eq!(state.metriken.aktive_sitzungen.get(), 0);
    }

    #[test]
    fn shutdown_wird_geteilt() {
        let (state, tx) = state(1);
        let rx = state.shutdown();
        tx.send(true).unwrap();
        assert!(*rx.borrow());
    }
}
