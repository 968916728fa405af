//! Feed presenter: owns the notification store and pushes every change
//! to a [`RenderPort`].
//!
//! The presenter re-renders the full sequence after each mutation; ports
//! replace whatever they showed before.

use chrono::{DateTime, Utc};

use crate::store::NotificationStore;
use crate::types::{Notification, NotificationId, StatusSignal};

/// What to show when the feed is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Nothing received yet.
    Waiting,
    /// The user just cleared the feed.
    Cleared,
}

impl Placeholder {
    pub fn text(self) -> (&'static str, &'static str) {
        match self {
            Self::Waiting => ("No notifications yet", "Waiting for new messages..."),
            Self::Cleared => ("Notifications cleared", "Waiting for new messages..."),
        }
    }
}

/// Rendering target for the feed.
pub trait RenderPort {
    /// Replace the rendered list with `items` (newest first, never empty).
    fn render_items(&mut self, items: &[Notification]);
    /// Replace the rendered list with a placeholder.
    fn render_placeholder(&mut self, placeholder: Placeholder);
    fn render_count(&mut self, count: usize);
    fn render_pause(&mut self, paused: bool);
    fn render_status(&mut self, status: StatusSignal);
}

pub struct FeedPresenter<R: RenderPort> {
    store: NotificationStore,
    port: R,
    /// Ids in the order they were last rendered.
    rendered: Vec<NotificationId>,
    cleared: bool,
}

impl<R: RenderPort> FeedPresenter<R> {
    /// Wrap `store` and render its initial state.
    pub fn new(store: NotificationStore, port: R) -> Self {
        let mut presenter = Self {
            store,
            port,
            rendered: Vec::new(),
            cleared: false,
        };
        presenter.render();
        presenter
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn port(&self) -> &R {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut R {
        &mut self.port
    }

    /// Ids of the last rendered snapshot, newest first.
    pub fn rendered_ids(&self) -> &[NotificationId] {
        &self.rendered
    }

    /// Add a notification; re-renders only if the store accepted it.
    pub fn push(&mut self, notification: Notification, now: DateTime<Utc>) -> Option<NotificationId> {
        let id = self.store.add(notification, now)?;
        self.cleared = false;
        self.render();
        Some(id)
    }

    /// Dismiss one notification by id.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let removed = self.store.remove(id);
        if removed {
            self.render();
        }
        removed
    }

    /// Dismiss the item shown at `index` of the last rendered snapshot.
    pub fn dismiss_at(&mut self, index: usize) -> bool {
        match self.rendered.get(index).copied() {
            Some(id) => self.dismiss(id),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.cleared = true;
        self.render();
    }

    pub fn toggle_pause(&mut self, now: DateTime<Utc>) -> bool {
        self.store.toggle_pause(now);
        self.cleared = false;
        self.render();
        self.store.is_paused()
    }

    pub fn set_paused(&mut self, paused: bool, now: DateTime<Utc>) {
        self.store.set_paused(paused, now);
        self.cleared = false;
        self.render();
    }

    /// Expire old entries; re-renders if anything was removed.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let removed = self.store.sweep(now);
        if removed > 0 {
            self.render();
        }
        removed
    }

    pub fn set_status(&mut self, status: StatusSignal) {
        self.port.render_status(status);
    }

    fn render(&mut self) {
        if self.store.is_empty() {
            self.rendered.clear();
            let placeholder = if self.cleared {
                Placeholder::Cleared
            } else {
                Placeholder::Waiting
            };
            self.port.render_placeholder(placeholder);
        } else {
            let items = self.store.snapshot();
            self.rendered = items.iter().map(Notification::id).collect();
            self.port.render_items(&items);
        }
        self.port.render_count(self.store.len());
        self.port.render_pause(self.store.is_paused());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreConfig, TITLE_PAUSED};
    use crate::types::{ConnectionState, NotificationKind, Origin};
    use chrono::TimeZone;

    #[derive(Default)]
    struct RecordingPort {
        items: Vec<String>,
        placeholder: Option<Placeholder>,
        count: usize,
        paused: bool,
        status: Option<StatusSignal>,
        renders: usize,
    }

    impl RenderPort for RecordingPort {
        fn render_items(&mut self, items: &[Notification]) {
            self.items = items.iter().map(|n| n.title.clone()).collect();
            self.placeholder = None;
            self.renders += 1;
        }
        fn render_placeholder(&mut self, placeholder: Placeholder) {
            self.items.clear();
            self.placeholder = Some(placeholder);
            self.renders += 1;
        }
        fn render_count(&mut self, count: usize) {
            self.count = count;
        }
        fn render_pause(&mut self, paused: bool) {
            self.paused = paused;
        }
        fn render_status(&mut self, status: StatusSignal) {
            self.status = Some(status);
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn remote(title: &str) -> Notification {
        Notification::new(NotificationKind::Info, title, "", t0(), Origin::Remote)
    }

    fn presenter() -> FeedPresenter<RecordingPort> {
        FeedPresenter::new(NotificationStore::default(), RecordingPort::default())
    }

    #[test]
    fn initial_render_is_waiting_placeholder() {
        let p = presenter();
        assert_eq!(p.port().placeholder, Some(Placeholder::Waiting));
        assert_eq!(p.port().count, 0);
    }

    #[test]
    fn push_renders_full_list_and_count() {
        let mut p = presenter();
        p.push(remote("a"), t0());
        p.push(remote("b"), t0());
        assert_eq!(p.port().items, vec!["b", "a"]);
        assert_eq!(p.port().count, 2);
        assert_eq!(p.rendered_ids().len(), 2);
    }

    #[test]
    fn dismiss_uses_ids_not_positions() {
        let mut p = presenter();
        p.push(remote("a"), t0());
        let clicked = p.rendered_ids()[0];
        p.push(remote("b"), t0());
        assert!(p.dismiss(clicked));
        assert_eq!(p.port().items, vec!["b"]);
    }

    #[test]
    fn dismiss_at_resolves_against_rendered_snapshot() {
        let mut p = presenter();
        p.push(remote("a"), t0());
        p.push(remote("b"), t0());
        assert!(p.dismiss_at(1));
        assert_eq!(p.port().items, vec!["b"]);
        assert!(!p.dismiss_at(7));
    }

    #[test]
    fn clear_shows_cleared_placeholder() {
        let mut p = presenter();
        p.push(remote("a"), t0());
        p.clear();
        assert_eq!(p.port().placeholder, Some(Placeholder::Cleared));
        assert_eq!(p.port().count, 0);
        assert!(p.rendered_ids().is_empty());
    }

    #[test]
    fn paused_push_does_not_rerender() {
        let mut p = presenter();
        assert!(p.toggle_pause(t0()));
        assert!(p.port().paused);
        let renders = p.port().renders;
        assert!(p.push(remote("dropped"), t0()).is_none());
        assert_eq!(p.port().renders, renders);
        assert_eq!(p.port().items, vec![TITLE_PAUSED]);
    }

    #[test]
    fn sweep_rerenders_when_entries_expire() {
        let mut p = FeedPresenter::new(
            NotificationStore::new(StoreConfig {
                capacity: 10,
                retention_secs: 60,
            }),
            RecordingPort::default(),
        );
        p.push(remote("a"), t0());
        assert_eq!(p.sweep(t0() + chrono::Duration::seconds(61)), 1);
        assert_eq!(p.port().placeholder, Some(Placeholder::Waiting));
    }

    #[test]
    fn status_is_forwarded() {
        let mut p = presenter();
        p.set_status(ConnectionState::Connected.into());
        assert_eq!(p.port().status.map(|s| s.label), Some("Connected"));
    }
}
