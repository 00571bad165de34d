//! REST ueber DataChannel
//!
//! Jede Text- oder Binaernachricht auf dem Kanal ist ein JSON-`RestAnfrage`.
//! webrtc-rs ruft den Nachrichten-Handler sequentiell auf, die Antworten
//! gehen daher in Anfragereihenfolge zurueck.

use std::sync::{Arc, Weak};

use rtcrest_api::RestDispatcher;
use rtcrest_observability::RtcMetriken;
use rtcrest_protocol::{RestAnfrage, RestAntwort};
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::RTCDataChannel;

/// Haengt die REST-Verarbeitung an einen neuen DataChannel
pub fn binden(
    kanal: Arc<RTCDataChannel>,
    dispatcher: RestDispatcher,
    metriken: RtcMetriken,
    sitzung: String,
) {
    tracing::info!(
        sitzung = %sitzung,
        label = %kanal.label(),
        kanal_id = kanal.id(),
        "DataChannel vom Browser empfangen"
    );

    let offen_kanal = Arc::downgrade(&kanal);
    let offen_sitzung = sitzung.clone();
    kanal.on_open(Box::new(move || {
        Box::pin(async move {
            tracing::info!(sitzung = %offen_sitzung, "DataChannel geoeffnet");
            if let Some(kanal) = offen_kanal.upgrade() {
                senden(&kanal, &RestAntwort::willkommen(), &offen_sitzung).await;
            }
        })
    }));

    let nachricht_kanal: Weak<RTCDataChannel> = Arc::downgrade(&kanal);
    let nachricht_sitzung = sitzung.clone();
    kanal.on_message(Box::new(move |nachricht: DataChannelMessage| {
        let kanal = nachricht_kanal.clone();
        let dispatcher = dispatcher.clone();
        let metriken = metriken.clone();
        let sitzung = nachricht_sitzung.clone();
        Box::pin(async move {
            tracing::debug!(
                sitzung = %sitzung,
                bytes = nachricht.data.len(),
                text = nachricht.is_string,
                "DataChannel-Nachricht empfangen"
            );

            let anfrage = match RestAnfrage::aus_bytes(&nachricht.data) {
                Ok(a) => a,
                Err(e) => {
                    tracing::warn!(sitzung = %sitzung, fehler = %e, "REST-Anfrage nicht lesbar, verworfen");
                    return;
                }
            };

            let antwort = dispatcher.verarbeiten(anfrage).await;
            metriken.rest_beantwortet(antwort.status);

            if let Some(kanal) = kanal.upgrade() {
                senden(&kanal, &antwort, &sitzung).await;
            }
        })
    }));

    let schliessen_sitzung = sitzung.clone();
    kanal.on_close(Box::new(move || {
        tracing::info!(sitzung = %schliessen_sitzung, "DataChannel geschlossen");
        Box::pin(async {})
    }));

    kanal.on_error(Box::new(move |e: webrtc::Error| {
        tracing::warn!(sitzung = %sitzung, fehler = %e, "DataChannel-Fehler");
        Box::pin(async {})
    }));
}

async fn senden(kanal: &RTCDataChannel, antwort: &RestAntwort, sitzung: &str) {
    let text = match serde_json::to_string(antwort) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(sitzung = %sitzung, fehler = %e, "REST-Antwort nicht serialisierbar");
            return;
        }
    };

    if let Err(e) = kanal.send_text(text).await {
        tracing::warn!(sitzung = %sitzung, fehler = %e, "REST-Antwort konnte nicht gesendet werden");
    }
}
