use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::Body;

// ─── Connection ───────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    pub const ALL: [Self; 4] = [
        Self::Disconnected,
        Self::Connecting,
        Self::Connected,
        Self::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }

    /// Human-readable status text shown next to the status dot.
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Error => "Connection error",
        }
    }

    /// Connecting or Connected: a transport is live or being opened.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status published on every connection state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSignal {
    pub state: ConnectionState,
    pub label: &'static str,
}

impl From<ConnectionState> for StatusSignal {
    fn from(state: ConnectionState) -> Self {
        Self {
            state,
            label: state.label(),
        }
    }
}

// ─── Inbound ──────────────────────────────────────────────────────

/// A message received on the transport, after the structured/plain split.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A JSON object payload, normally carrying a `type` discriminator.
    Structured(serde_json::Value),
    /// Anything that did not parse as a JSON object.
    Text(String),
}

impl InboundEvent {
    /// Split raw transport text into a structured or plain-text event.
    ///
    /// Only JSON objects count as structured; scalars and arrays are
    /// treated as text so they still render verbatim.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) if value.is_object() => Self::Structured(value),
            _ => Self::Text(raw.to_owned()),
        }
    }
}

// ─── Notification ─────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    System,
    Success,
    Reminder,
    #[default]
    Info,
    Error,
    /// Server-supplied status outside the known set.
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::Success => "success",
            Self::Reminder => "reminder",
            Self::Info => "info",
            Self::Error => "error",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Label shown in the notification footer.
    pub fn label(&self) -> &str {
        match self {
            Self::System => "System",
            Self::Success => "Success",
            Self::Reminder => "Reminder",
            Self::Info => "Info",
            Self::Error => "Error",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Parse a server status string. Empty strings fall back to `Info`.
    pub fn from_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "" | "info" => Self::Info,
            "system" => Self::System,
            "success" => Self::Success,
            "reminder" => Self::Reminder,
            "error" => Self::Error,
            _ => Self::Other(status.to_owned()),
        }
    }
}

impl From<String> for NotificationKind {
    fn from(s: String) -> Self {
        Self::from_status(&s)
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a notification came from. Only remote notifications are subject
/// to the pause gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Remote,
    Local,
}

/// Stable per-notification identifier, assigned by the store on insertion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: Body,
    pub raw_body: String,
    pub created_at: DateTime<Utc>,
    pub origin: Origin,
    pub payload: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        raw_body: impl Into<String>,
        created_at: DateTime<Utc>,
        origin: Origin,
    ) -> Self {
        let raw_body = raw_body.into();
        Self {
            id: NotificationId::default(),
            kind,
            title: title.into(),
            body: Body::format(&raw_body),
            raw_body,
            created_at,
            origin,
            payload: None,
        }
    }

    /// A locally synthesized `System` notice.
    pub fn system(title: impl Into<String>, body: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new(NotificationKind::System, title, body, now, Origin::Local)
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Identifier assigned by the store; `#0` until inserted.
    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: NotificationId) {
        self.id = id;
    }
}
