//! WebSocket transport task.
//!
//! Each dial spawns one task that reports `Opened`, every text frame, and
//! finally exactly one `Closed`. Events carry the dial generation so the
//! session can ignore a transport it has already replaced.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Close code reported when the peer vanished without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;
/// Close code reported when a close frame carried no status.
pub const CLOSE_NO_STATUS: u16 = 1005;
pub const CLOSE_NORMAL: u16 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    Opened,
    Message(String),
    Errored(String),
    Closed(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub generation: u64,
    pub kind: TransportEventKind,
}

/// Everything the session loop waits on besides terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    Transport(TransportEvent),
    RetryDue,
}

/// Sending half of a live transport. Dropping it closes the connection.
#[derive(Debug)]
pub struct TransportHandle {
    pub generation: u64,
    outbound: mpsc::UnboundedSender<String>,
}

impl TransportHandle {
    pub fn new(generation: u64, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            generation,
            outbound,
        }
    }

    /// Queue a text frame. False if the transport task has ended.
    pub fn send(&self, text: String) -> bool {
        self.outbound.send(text).is_ok()
    }
}

/// Opens transports. The session only ever talks to this seam.
pub trait Dialer {
    fn dial(
        &mut self,
        url: &str,
        generation: u64,
        events: mpsc::UnboundedSender<LoopEvent>,
    ) -> TransportHandle;
}

/// Dials real WebSocket connections with tokio-tungstenite.
pub struct WsDialer;

impl Dialer for WsDialer {
    fn dial(
        &mut self,
        url: &str,
        generation: u64,
        events: mpsc::UnboundedSender<LoopEvent>,
    ) -> TransportHandle {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let reporter = Reporter { generation, events };
        tokio::spawn(run_transport(url.to_owned(), reporter, outbound_rx));
        TransportHandle::new(generation, outbound_tx)
    }
}

struct Reporter {
    generation: u64,
    events: mpsc::UnboundedSender<LoopEvent>,
}

impl Reporter {
    fn report(&self, kind: TransportEventKind) {
        let event = LoopEvent::Transport(TransportEvent {
            generation: self.generation,
            kind,
        });
        // The loop is gone only during shutdown.
        let _ = self.events.send(event);
    }

    fn fail(&self, detail: String) {
        self.report(TransportEventKind::Errored(detail));
        self.report(TransportEventKind::Closed(CLOSE_ABNORMAL));
    }
}

async fn run_transport(
    url: String,
    reporter: Reporter,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let (ws_stream, _response) = match tokio_tungstenite::connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!(url = %url, generation = reporter.generation, "transport: connect failed: {e}");
            reporter.fail(e.to_string());
            return;
        }
    };
    tracing::info!(url = %url, generation = reporter.generation, "transport: connected");
    reporter.report(TransportEventKind::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        reporter.report(TransportEventKind::Message(text));
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        reporter.report(TransportEventKind::Message(
                            String::from_utf8_lossy(&bytes).into_owned(),
                        ));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let code = frame.map(|f| u16::from(f.code)).unwrap_or(CLOSE_NO_STATUS);
                        tracing::info!(code, "transport: closed by server");
                        reporter.report(TransportEventKind::Closed(code));
                        return;
                    }
                    // Ping/pong are answered by tungstenite.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("transport: read error: {e}");
                        reporter.fail(e.to_string());
                        return;
                    }
                    None => {
                        reporter.report(TransportEventKind::Closed(CLOSE_ABNORMAL));
                        return;
                    }
                }
            }
            out = outbound.recv() => {
                match out {
                    Some(text) => {
                        tracing::debug!(len = text.len(), "transport: sending");
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::warn!("transport: write error: {e}");
                            reporter.fail(e.to_string());
                            return;
                        }
                    }
                    None => {
                        // Handle dropped: the session replaced or shut down this transport.
                        let _ = write.send(Message::Close(None)).await;
                        reporter.report(TransportEventKind::Closed(CLOSE_NORMAL));
                        return;
                    }
                }
            }
        }
    }
}
