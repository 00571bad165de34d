//! Signaling-Schleife ueber In-Memory-Kanaele statt echtem WebSocket

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures_channel::mpsc as fmpsc;
use futures_util::StreamExt;
use rtcrest_api::{api_router, ApiState, RestDispatcher};
use rtcrest_media::{MediaKonfig, RtcApi};
use rtcrest_observability::RtcMetriken;
use rtcrest_protocol::SignalNachricht;
use rtcrest_signaling::{SignalVerbindung, SignalingConfig, SignalingState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;

struct Testaufbau {
    state: Arc<SignalingState>,
    shutdown_tx: watch::Sender<bool>,
    browser_tx: fmpsc::UnboundedSender<Result<Message, axum::Error>>,
    browser_rx: fmpsc::UnboundedReceiver<Message>,
    task: JoinHandle<()>,
}

fn aufbauen() -> Testaufbau {
    let metriken = RtcMetriken::neu().unwrap();
    let rtc = RtcApi::neu(
        MediaKonfig {
            ice_server: vec![],
            ..Default::default()
        },
        RestDispatcher::neu(api_router(ApiState::default())),
        metriken.clone(),
    )
    .unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = SignalingState::neu(SignalingConfig::default(), rtc, metriken, shutdown_rx);

    let (browser_tx, server_stream) = fmpsc::unbounded::<Result<Message, axum::Error>>();
    let (server_sink, browser_rx) = fmpsc::unbounded::<Message>();

    let platz = state.platz_reservieren().unwrap();
    let verbindung = SignalVerbindung::neu(Arc::clone(&state), None, platz);
    let task = tokio::spawn(verbindung.verarbeiten(server_sink, server_stream));

    Testaufbau {
        state,
        shutdown_tx,
        browser_tx,
        browser_rx,
        task,
    }
}

fn text(s: &str) -> Result<Message, axum::Error> {
    Ok(Message::Text(s.to_string()))
}

async fn browser_offer() -> String {
    let mut media_engine = MediaEngine::default();
    media_engine.register_default_codecs().unwrap();
    let registry = register_default_interceptors(Registry::new(), &mut media_engine).unwrap();
    let api = APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build();

    let pc = api
        .new_peer_connection(RTCConfiguration::default())
        .await
        .unwrap();
    pc.create_data_channel("rest-api", None).await.unwrap();
    pc.add_transceiver_from_kind(RTPCodecType::Video, None)
        .await
        .unwrap();
    let angebot = pc.create_offer(None).await.unwrap();
    let sdp = angebot.sdp.clone();
    pc.close().await.unwrap();
    sdp
}

async fn beendet(task: JoinHandle<()>) -> bool {
    tokio::time::timeout(Duration::from_secs(5), task).await.is_ok()
}

#[tokio::test]
async fn offer_wird_mit_answer_beantwortet() {
    let mut t = aufbauen();
    let angebot = SignalNachricht::Offer {
        sdp: browser_offer().await,
    };
    t.browser_tx
        .unbounded_send(text(&angebot.zu_json().unwrap()))
        .unwrap();

    let antwort = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(nachricht) = t.browser_rx.next().await {
            if let Message::Text(json) = nachricht {
                if let Ok(SignalNachricht::Answer { sdp }) = SignalNachricht::aus_json(&json) {
                    return Some(sdp);
                }
            }
        }
        None
    })
    .await
    .unwrap()
    .unwrap();
    assert!(antwort.contains("m=video"));

    assert_eq!(
        t.state
            .metriken
            .signal_nachrichten_total
            .with_label_values(&["offer", "in"])
            .get(),
        1
    );

    // Browser trennt
    drop(t.browser_tx);
    assert!(beendet(t.task).await);
    assert_eq!(t.state.aktive_sitzungen(), 0);
}

#[tokio::test]
async fn kein_json_trennt_die_verbindung() {
    let t = aufbauen();
    t.browser_tx.unbounded_send(text("kein json")).unwrap();
    assert!(beendet(t.task).await);
    assert_eq!(t.state.aktive_sitzungen(), 0);
}

#[tokio::test]
async fn unbekannte_form_wird_ignoriert() {
    let mut t = aufbauen();
    t.browser_tx
        .unbounded_send(text(r#"{"type":"bye"}"#))
        .unwrap();
    t.browser_tx
        .unbounded_send(text(r#"{"type":"offer"}"#))
        .unwrap();
    t.browser_tx
        .unbounded_send(Ok(Message::Binary(vec![1, 2, 3])))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!t.task.is_finished());
    assert_eq!(t.state.aktive_sitzungen(), 1);

    // Shutdown schickt einen Close-Frame
    t.shutdown_tx.send(true).unwrap();
    let close = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(nachricht) = t.browser_rx.next().await {
            if matches!(nachricht, Message::Close(_)) {
                return true;
            }
        }
        false
    })
    .await
    .unwrap();
    assert!(close);
    assert!(beendet(t.task).await);
}

#[tokio::test]
async fn fehlgeschlagene_operation_haelt_verbindung_offen() {
    let t = aufbauen();
    // Answer ohne vorheriges Offer ist ein Sitzungsfehler, kein Verbindungsende
    t.browser_tx
        .unbounded_send(text(r#"{"type":"answer","sdp":"v=0"}"#))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!t.task.is_finished());

    drop(t.browser_tx);
    assert!(beendet(t.task).await);
}
