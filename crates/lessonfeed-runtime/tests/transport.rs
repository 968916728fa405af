use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use lessonfeed_core::backoff::ReconnectPolicy;
use lessonfeed_core::store::StoreConfig;
use lessonfeed_core::types::{ConnectionState, NotificationKind};
use lessonfeed_runtime::config::WatchSettings;
use lessonfeed_runtime::session::Session;
use lessonfeed_runtime::transport::{
    CLOSE_ABNORMAL, Dialer, LoopEvent, TransportEvent, TransportEventKind, WsDialer,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

async fn next_event(rx: &mut mpsc::UnboundedReceiver<LoopEvent>) -> LoopEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for transport event")
        .expect("event channel closed")
}

fn kind(event: LoopEvent) -> TransportEventKind {
    match event {
        LoopEvent::Transport(TransportEvent { kind, .. }) => kind,
        other => panic!("expected transport event, got {other:?}"),
    }
}

#[tokio::test]
async fn relays_frames_and_close_code() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text("hello".into())).await.unwrap();
        let received = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(_)) => continue,
                other => panic!("unexpected frame: {other:?}"),
            }
        };
        ws.close(Some(CloseFrame {
            code: CloseCode::from(4000),
            reason: "bye".into(),
        }))
        .await
        .unwrap();
        while ws.next().await.is_some() {}
        received
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = WsDialer.dial(&format!("ws://{addr}/ws/lesson/"), 7, tx);
    assert_eq!(handle.generation, 7);

    let first = next_event(&mut rx).await;
    assert!(matches!(
        first,
        LoopEvent::Transport(TransportEvent { generation: 7, .. })
    ));
    assert_eq!(kind(first), TransportEventKind::Opened);
    assert_eq!(
        kind(next_event(&mut rx).await),
        TransportEventKind::Message("hello".into())
    );

    assert!(handle.send("ping".into()));
    assert_eq!(server.await.unwrap(), "ping");
    assert_eq!(kind(next_event(&mut rx).await), TransportEventKind::Closed(4000));
}

#[tokio::test]
async fn refused_connection_reports_error_then_abnormal_close() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _handle = WsDialer.dial(&format!("ws://{addr}/ws/lesson/"), 1, tx);

    assert!(matches!(
        kind(next_event(&mut rx).await),
        TransportEventKind::Errored(_)
    ));
    assert_eq!(
        kind(next_event(&mut rx).await),
        TransportEventKind::Closed(CLOSE_ABNORMAL)
    );
}

#[tokio::test]
async fn session_shows_server_notification() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"{"type":"lesson_created","message":"Math at 10:00"}"#.into(),
        ))
        .await
        .unwrap();
        while ws.next().await.is_some() {}
    });

    let settings = WatchSettings {
        ws_url: format!("ws://{addr}/ws/lesson/"),
        reconnect: ReconnectPolicy::default(),
        store: StoreConfig::default(),
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session::new(&settings, WsDialer, tx);
    session.start(Utc::now());

    while session.view().items.len() < 2 {
        let event = next_event(&mut rx).await;
        session.handle_loop_event(event, Utc::now());
    }

    assert_eq!(session.connection_state(), ConnectionState::Connected);
    let newest = &session.view().items[0];
    assert_eq!(newest.kind, NotificationKind::Success);
    assert!(newest.title.contains("created"));
    assert_eq!(newest.raw_body, "Math at 10:00");
    assert!(session.send("hello server"));
}
