//! Feed session: wires the connection manager, classifier and feed
//! presenter to a transport dialer and the retry timers.
//!
//! The session runs on a single task. Every loop event is handled to
//! completion before the next one.

use std::time::Duration;

use chrono::{DateTime, Utc};
use lessonfeed_core::classify::classify;
use lessonfeed_core::connection::{ConnectionEvent, ConnectionManager, Effect};
use lessonfeed_core::feed::FeedPresenter;
use lessonfeed_core::store::NotificationStore;
use lessonfeed_core::types::ConnectionState;
use tokio::sync::mpsc;

use crate::config::WatchSettings;
use crate::transport::{Dialer, LoopEvent, TransportEventKind, TransportHandle};
use crate::view::FeedView;

/// User input the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    TogglePause,
    Clear,
    DismissSelected,
    SelectNext,
    SelectPrevious,
    Reconnect,
    /// The terminal regained focus.
    Focus,
}

pub struct Session<D: Dialer> {
    manager: ConnectionManager,
    feed: FeedPresenter<FeedView>,
    dialer: D,
    url: String,
    transport: Option<TransportHandle>,
    generation: u64,
    events: mpsc::UnboundedSender<LoopEvent>,
}

impl<D: Dialer> Session<D> {
    pub fn new(settings: &WatchSettings, dialer: D, events: mpsc::UnboundedSender<LoopEvent>) -> Self {
        Self {
            manager: ConnectionManager::new(settings.reconnect),
            feed: FeedPresenter::new(NotificationStore::new(settings.store), FeedView::default()),
            dialer,
            url: settings.ws_url.clone(),
            transport: None,
            generation: 0,
            events,
        }
    }

    pub fn view(&self) -> &FeedView {
        self.feed.port()
    }

    pub fn feed(&self) -> &FeedPresenter<FeedView> {
        &self.feed
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the first connection.
    pub fn start(&mut self, now: DateTime<Utc>) {
        let effects = self.manager.connect();
        self.apply(effects, now);
    }

    pub fn handle_loop_event(&mut self, event: LoopEvent, now: DateTime<Utc>) {
        let connection_event = match event {
            LoopEvent::RetryDue => ConnectionEvent::RetryDue,
            LoopEvent::Transport(te) => {
                if te.generation != self.generation {
                    tracing::debug!(
                        generation = te.generation,
                        current = self.generation,
                        "ignoring event from replaced transport"
                    );
                    return;
                }
                match te.kind {
                    TransportEventKind::Opened => ConnectionEvent::TransportOpened,
                    TransportEventKind::Message(raw) => ConnectionEvent::MessageReceived(raw),
                    TransportEventKind::Errored(detail) => {
                        tracing::warn!(url = %self.url, "connection error: {detail}");
                        ConnectionEvent::TransportErrored
                    }
                    TransportEventKind::Closed(code) => {
                        tracing::info!(code, "connection closed");
                        self.transport = None;
                        ConnectionEvent::TransportClosed { code }
                    }
                }
            }
        };
        let effects = self.manager.handle(connection_event);
        self.apply(effects, now);
    }

    pub fn handle_action(&mut self, action: UserAction, now: DateTime<Utc>) {
        match action {
            UserAction::TogglePause => {
                let paused = self.feed.toggle_pause(now);
                tracing::info!(paused, "pause toggled");
            }
            UserAction::Clear => self.feed.clear(),
            UserAction::DismissSelected => {
                if let Some(id) = self.feed.port().selected_id() {
                    self.feed.dismiss(id);
                }
            }
            UserAction::SelectNext => self.feed.port_mut().next(),
            UserAction::SelectPrevious => self.feed.port_mut().previous(),
            UserAction::Reconnect => {
                let effects = self.manager.reconnect();
                self.apply(effects, now);
            }
            UserAction::Focus => {
                let effects = self.manager.handle(ConnectionEvent::PageFocused);
                self.apply(effects, now);
            }
        }
    }

    /// Periodic housekeeping: expire old notifications.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let removed = self.feed.sweep(now);
        if removed > 0 {
            tracing::debug!(removed, "expired notifications");
        }
    }

    /// Send a text frame on the live transport. False unless connected.
    pub fn send(&self, text: impl Into<String>) -> bool {
        if self.manager.state() != ConnectionState::Connected {
            tracing::warn!("send skipped: not connected");
            return false;
        }
        let text = text.into();
        tracing::info!(len = text.len(), "sending message");
        match &self.transport {
            Some(transport) => transport.send(text),
            None => false,
        }
    }

    fn apply(&mut self, effects: Vec<Effect>, now: DateTime<Utc>) {
        for effect in effects {
            match effect {
                Effect::OpenTransport => {
                    self.generation += 1;
                    tracing::info!(url = %self.url, generation = self.generation, "connecting");
                    // Replacing the handle drops the previous transport.
                    self.transport =
                        Some(self.dialer.dial(&self.url, self.generation, self.events.clone()));
                }
                Effect::ScheduleRetry { attempt, after_ms } => {
                    tracing::info!(attempt, after_ms, "reconnecting after delay");
                    let events = self.events.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(after_ms)).await;
                        let _ = events.send(LoopEvent::RetryDue);
                    });
                }
                Effect::Status(status) => {
                    tracing::debug!(state = %status.state, "status changed");
                    self.feed.set_status(status);
                }
                Effect::Deliver(inbound) => {
                    let notification = classify(&inbound, now);
                    if self.feed.push(notification, now).is_none() {
                        tracing::debug!("paused: inbound notification dropped");
                    }
                }
                Effect::Announce(announcement) => {
                    self.feed.push(announcement.notification(now), now);
                }
            }
        }
    }
}
