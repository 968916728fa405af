//! Bounded, newest-first notification store.
//!
//! Invariants:
//! - `len() <= capacity` after every operation; inserts evict from the tail.
//! - every `add` sweeps entries older than the retention window.
//! - while paused, remote notifications never enter the store.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Notification, NotificationId, Origin};

pub const TITLE_PAUSED: &str = "Notifications paused";
pub const TITLE_RESUMED: &str = "Notifications resumed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of notifications kept (default 100).
    pub capacity: usize,
    /// Age after which a notification is swept (default 3600 = 1h).
    pub retention_secs: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            retention_secs: 3_600,
        }
    }
}

impl StoreConfig {
    /// Retention window, or `None` when `retention_secs` is out of
    /// chrono's range.
    pub fn retention(&self) -> Option<Duration> {
        Duration::try_seconds(self.retention_secs)
    }
}

#[derive(Debug, Clone)]
pub struct NotificationStore {
    config: StoreConfig,
    /// Index 0 is the newest entry.
    items: VecDeque<Notification>,
    paused: bool,
    next_id: u64,
}

impl NotificationStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            items: VecDeque::new(),
            paused: false,
            next_id: 1,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Newest-first view of the current sequence.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Notification> {
        self.items.get(index)
    }

    /// Snapshot of the current sequence, newest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }

    /// Insert `notification` at the head.
    ///
    /// Returns the assigned id, or `None` when the pause gate dropped it.
    /// The returned id may already have been swept if the notification was
    /// older than the retention window on arrival.
    pub fn add(&mut self, mut notification: Notification, now: DateTime<Utc>) -> Option<NotificationId> {
        if self.paused && notification.origin == Origin::Remote {
            return None;
        }
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        notification.assign_id(id);

        self.items.push_front(notification);
        self.items.truncate(self.config.capacity);
        self.sweep(now);
        Some(id)
    }

    /// Drop entries older than the retention window. Returns how many
    /// entries were removed.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = self
            .config
            .retention()
            .and_then(|r| now.checked_sub_signed(r))
        else {
            return 0;
        };
        let before = self.items.len();
        self.items.retain(|n| n.created_at > cutoff);
        before - self.items.len()
    }

    /// Remove the notification with `id`. Returns false if it is not
    /// present (already evicted, swept or dismissed).
    pub fn remove(&mut self, id: NotificationId) -> bool {
        match self.items.iter().position(|n| n.id() == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove the entry at `index` of the current sequence. Out of range
    /// is a silent no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<Notification> {
        self.items.remove(index)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Set the pause gate and announce the new state. The announcement
    /// bypasses the gate, so it is always recorded.
    pub fn set_paused(&mut self, paused: bool, now: DateTime<Utc>) -> Option<NotificationId> {
        self.paused = paused;
        let announcement = if paused {
            Notification::system(TITLE_PAUSED, "New notifications will not be shown", now)
        } else {
            Notification::system(TITLE_RESUMED, "Notifications are active again", now)
        };
        self.add(announcement, now)
    }

    pub fn toggle_pause(&mut self, now: DateTime<Utc>) -> Option<NotificationId> {
        self.set_paused(!self.paused, now)
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NotificationKind;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn remote(title: &str, at: DateTime<Utc>) -> Notification {
        Notification::new(NotificationKind::Info, title, "", at, Origin::Remote)
    }

    fn titles(store: &NotificationStore) -> Vec<String> {
        store.iter().map(|n| n.title.clone()).collect()
    }

    #[test]
    fn out_of_range_retention_never_sweeps() {
        let mut s = NotificationStore::new(StoreConfig {
            capacity: 10,
            retention_secs: i64::MAX,
        });
        assert_eq!(s.config().retention(), None);
        s.set_paused(true, t0());
        assert_eq!(s.sweep(t0()), 0);
        assert_eq!(titles(&s), vec![TITLE_PAUSED]);
    }

    #[test]
    fn retention_beyond_epoch_keeps_entries() {
        // Within TimeDelta range, but now - retention underflows DateTime.
        let mut s = NotificationStore::new(StoreConfig {
            capacity: 10,
            retention_secs: i64::MAX / 1_000 - 1,
        });
        s.add(remote("a", t0()), t0());
        assert_eq!(s.sweep(t0()), 0);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn newest_first() {
        let mut s = NotificationStore::default();
        s.add(remote("a", t0()), t0());
        s.add(remote("b", t0()), t0());
        assert_eq!(titles(&s), vec!["b", "a"]);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut s = NotificationStore::default();
        let a = s.add(remote("a", t0()), t0()).unwrap();
        let b = s.add(remote("b", t0()), t0()).unwrap();
        assert!(b > a);
        assert_eq!(s.get(0).map(|n| n.id()), Some(b));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut s = NotificationStore::default();
        for i in 0..100 {
            s.add(remote(&format!("n{i}"), t0()), t0());
        }
        assert_eq!(s.len(), 100);
        s.add(remote("n100", t0()), t0());
        assert_eq!(s.len(), 100);
        assert_eq!(s.get(0).unwrap().title, "n100");
        assert!(s.iter().all(|n| n.title != "n0"));
        assert_eq!(s.get(99).unwrap().title, "n1");
    }

    #[test]
    fn add_sweeps_expired_entries() {
        let mut s = NotificationStore::default();
        s.add(remote("old", t0()), t0());
        let later = t0() + Duration::minutes(61);
        s.add(remote("new", later), later);
        assert_eq!(titles(&s), vec!["new"]);
    }

    #[test]
    fn entry_exactly_at_cutoff_is_swept() {
        let mut s = NotificationStore::default();
        s.add(remote("edge", t0()), t0());
        assert_eq!(s.sweep(t0() + Duration::hours(1)), 1);
        assert!(s.is_empty());
    }

    #[test]
    fn paused_drops_remote_but_announces() {
        let mut s = NotificationStore::default();
        assert!(s.set_paused(true, t0()).is_some());
        assert!(s.add(remote("dropped", t0()), t0()).is_none());
        assert_eq!(titles(&s), vec![TITLE_PAUSED]);

        s.toggle_pause(t0());
        assert!(!s.is_paused());
        s.add(remote("kept", t0()), t0());
        assert_eq!(titles(&s), vec!["kept", TITLE_RESUMED, TITLE_PAUSED]);
    }

    #[test]
    fn local_notices_pass_the_gate() {
        let mut s = NotificationStore::default();
        s.set_paused(true, t0());
        assert!(s.add(Notification::system("Connected", "", t0()), t0()).is_some());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn announcement_obeys_capacity() {
        let mut s = NotificationStore::new(StoreConfig {
            capacity: 2,
            ..StoreConfig::default()
        });
        s.add(remote("a", t0()), t0());
        s.add(remote("b", t0()), t0());
        s.set_paused(true, t0());
        assert_eq!(titles(&s), vec![TITLE_PAUSED, "b"]);
    }

    #[test]
    fn remove_by_id_is_stable_across_prepends() {
        let mut s = NotificationStore::default();
        let target = s.add(remote("target", t0()), t0()).unwrap();
        // Snapshot rendered, then a new message arrives before the click.
        s.add(remote("newer", t0()), t0());
        assert!(s.remove(target));
        assert_eq!(titles(&s), vec!["newer"]);
        assert!(!s.remove(target));
    }

    #[test]
    fn remove_at_out_of_range_is_noop() {
        let mut s = NotificationStore::default();
        s.add(remote("a", t0()), t0());
        assert!(s.remove_at(5).is_none());
        assert_eq!(s.len(), 1);
        assert_eq!(s.remove_at(0).map(|n| n.title), Some("a".into()));
    }

    #[test]
    fn clear_empties() {
        let mut s = NotificationStore::default();
        s.add(remote("a", t0()), t0());
        s.clear();
        assert!(s.is_empty());
    }
}
