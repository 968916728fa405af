//! Inbound event classification.
//!
//! Every inbound event, however malformed, becomes a renderable
//! [`Notification`]. Structured events are dispatched on their `type`
//! field; anything else is shown as plain text.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::{InboundEvent, Notification, NotificationKind, Origin};

pub const TITLE_LESSON_CREATED: &str = "Lesson created";
pub const TITLE_REMINDER: &str = "Reminder";
pub const TITLE_TASK_COMPLETED: &str = "Task completed";
pub const TITLE_ERROR: &str = "Error";
pub const TITLE_MESSAGE: &str = "Message";
pub const TITLE_TEXT: &str = "Text message";

/// Closed set of server event types the feed knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    LessonCreated,
    Reminder,
    TaskCompleted,
    Error,
    Notification,
    Unrecognized,
}

impl EventType {
    pub fn from_type_field(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("lesson_created") => Self::LessonCreated,
            Some("reminder") => Self::Reminder,
            Some("task_completed") => Self::TaskCompleted,
            Some("error") => Self::Error,
            Some("notification") => Self::Notification,
            _ => Self::Unrecognized,
        }
    }
}

/// Map an inbound event to a notification stamped `now` (unless the
/// event carries its own timestamp).
pub fn classify(event: &InboundEvent, now: DateTime<Utc>) -> Notification {
    match event {
        InboundEvent::Text(text) => {
            Notification::new(NotificationKind::Info, TITLE_TEXT, text.as_str(), now, Origin::Remote)
        }
        InboundEvent::Structured(data) => classify_structured(data, now),
    }
}

fn classify_structured(data: &Value, now: DateTime<Utc>) -> Notification {
    let message = message_text(data.get("message"));
    let remote = |kind, title: &str, body: String, at| {
        Notification::new(kind, title, body, at, Origin::Remote).with_payload(data.clone())
    };

    match EventType::from_type_field(data.get("type")) {
        EventType::LessonCreated => remote(
            NotificationKind::Success,
            TITLE_LESSON_CREATED,
            message.unwrap_or_default(),
            now,
        ),
        EventType::Reminder => remote(
            NotificationKind::Reminder,
            TITLE_REMINDER,
            message.unwrap_or_else(|| "A lesson starts soon".to_owned()),
            now,
        ),
        EventType::TaskCompleted => remote(
            NotificationKind::Info,
            TITLE_TASK_COMPLETED,
            message.unwrap_or_else(|| "Background task finished".to_owned()),
            now,
        ),
        EventType::Error => remote(
            NotificationKind::Error,
            TITLE_ERROR,
            message.unwrap_or_else(|| "Something went wrong".to_owned()),
            now,
        ),
        EventType::Notification => {
            let kind = data
                .get("status")
                .and_then(Value::as_str)
                .map(NotificationKind::from_status)
                .unwrap_or_default();
            let title = data
                .get("title")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .unwrap_or(TITLE_MESSAGE);
            let at = data
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc))
                .unwrap_or(now);
            remote(kind, title, message.unwrap_or_default(), at)
        }
        EventType::Unrecognized => remote(
            NotificationKind::Info,
            TITLE_MESSAGE,
            message.unwrap_or_else(|| data.to_string()),
            now,
        ),
    }
}

/// `message` as display text: non-empty strings as-is, other non-null
/// values in their JSON form.
fn message_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
