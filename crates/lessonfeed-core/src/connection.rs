//! Connection lifecycle state machine.
//!
//! Pure and deterministic: the manager never touches a socket or a timer.
//! Every call returns the [`Effect`]s the runtime must carry out (open a
//! transport, schedule a retry, publish status, deliver a message).

use chrono::{DateTime, Utc};

use crate::backoff::ReconnectPolicy;
use crate::types::{ConnectionState, InboundEvent, Notification, StatusSignal};

// ─── Events & Effects ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// `connect()` was called.
    OpenRequested,
    /// `reconnect()` was called: reset the retry budget, then connect.
    ReconnectRequested,
    /// A scheduled retry timer fired.
    RetryDue,
    TransportOpened,
    TransportClosed { code: u16 },
    TransportErrored,
    MessageReceived(String),
    /// The user came back to the client (terminal focus gained).
    PageFocused,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open a new transport to the endpoint.
    OpenTransport,
    /// Fire `ConnectionEvent::RetryDue` after `after_ms`.
    ScheduleRetry { attempt: u32, after_ms: u64 },
    /// Connection state changed.
    Status(StatusSignal),
    /// Hand an inbound message to the classifier.
    Deliver(InboundEvent),
    /// Emit a locally synthesized notice.
    Announce(Announcement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    Connected,
}

impl Announcement {
    pub fn notification(self, now: DateTime<Utc>) -> Notification {
        match self {
            Self::Connected => Notification::system(
                "Connected",
                "Connection established successfully",
                now,
            ),
        }
    }
}

// ─── Transition table ────────────────────────────────────────────

/// Next state for `(state, event)`, or `None` if the event does not move
/// the machine. Compound events (`ReconnectRequested`, `PageFocused`) are
/// resolved by [`ConnectionManager::handle`] before reaching the table.
pub fn transition(state: ConnectionState, event: &ConnectionEvent) -> Option<ConnectionState> {
    use ConnectionEvent as E;
    use ConnectionState as S;

    match (state, event) {
        (S::Disconnected | S::Error, E::OpenRequested | E::RetryDue) => Some(S::Connecting),
        (S::Connecting | S::Connected, E::OpenRequested | E::RetryDue) => None,
        (S::Connecting | S::Error, E::TransportOpened) => Some(S::Connected),
        (S::Disconnected | S::Connected, E::TransportOpened) => None,
        (S::Connecting | S::Connected | S::Error, E::TransportClosed { .. }) => {
            Some(S::Disconnected)
        }
        (S::Disconnected, E::TransportClosed { .. }) => None,
        (S::Connecting | S::Connected, E::TransportErrored) => Some(S::Error),
        (S::Disconnected | S::Error, E::TransportErrored) => None,
        (_, E::MessageReceived(_) | E::ReconnectRequested | E::PageFocused) => None,
    }
}

// ─── Manager ─────────────────────────────────────────────────────

/// Owns the connection state and the reconnect context.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    policy: ReconnectPolicy,
    state: ConnectionState,
    /// Failed attempts since the last successful open.
    attempts: u32,
    last_close_code: Option<u16>,
}

impl ConnectionManager {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected,
            attempts: 0,
            last_close_code: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn last_close_code(&self) -> Option<u16> {
        self.last_close_code
    }

    /// No automatic retries remain.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    pub fn connect(&mut self) -> Vec<Effect> {
        self.handle(ConnectionEvent::OpenRequested)
    }

    pub fn reconnect(&mut self) -> Vec<Effect> {
        self.handle(ConnectionEvent::ReconnectRequested)
    }

    /// Feed one event through the machine.
    pub fn handle(&mut self, event: ConnectionEvent) -> Vec<Effect> {
        match event {
            ConnectionEvent::ReconnectRequested => {
                self.attempts = 0;
                self.handle(ConnectionEvent::OpenRequested)
            }
            ConnectionEvent::PageFocused => {
                if self.state.is_active() {
                    Vec::new()
                } else {
                    self.reconnect()
                }
            }
            ConnectionEvent::MessageReceived(raw) => {
                vec![Effect::Deliver(InboundEvent::parse(&raw))]
            }
            event => {
                let Some(next) = transition(self.state, &event) else {
                    return Vec::new();
                };
                self.enter(next, &event)
            }
        }
    }

    fn enter(&mut self, next: ConnectionState, event: &ConnectionEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        if next != self.state {
            self.state = next;
            effects.push(Effect::Status(next.into()));
        }

        match next {
            ConnectionState::Connecting => effects.push(Effect::OpenTransport),
            ConnectionState::Connected => {
                self.attempts = 0;
                self.last_close_code = None;
                effects.push(Effect::Announce(Announcement::Connected));
            }
            ConnectionState::Disconnected => {
                if let ConnectionEvent::TransportClosed { code } = event {
                    self.last_close_code = Some(*code);
                }
                if !self.is_exhausted() {
                    self.attempts += 1;
                    effects.push(Effect::ScheduleRetry {
                        attempt: self.attempts,
                        after_ms: self.policy.next_delay(self.attempts),
                    });
                }
            }
            ConnectionState::Error => {}
        }
        effects
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
