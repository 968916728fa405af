//! View model the terminal draws from. It is the feed's render port: the
//! presenter replaces its contents on every change, the draw loop only
//! reads it.

use lessonfeed_core::feed::{Placeholder, RenderPort};
use lessonfeed_core::types::{ConnectionState, Notification, NotificationId, StatusSignal};

#[derive(Debug, Clone)]
pub struct FeedView {
    pub items: Vec<Notification>,
    pub placeholder: Option<Placeholder>,
    pub count: usize,
    pub paused: bool,
    pub status: StatusSignal,
    pub selected: usize,
}

impl Default for FeedView {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            placeholder: Some(Placeholder::Waiting),
            count: 0,
            paused: false,
            status: ConnectionState::Disconnected.into(),
            selected: 0,
        }
    }
}

impl FeedView {
    /// Move selection down (j / Down).
    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    /// Move selection up (k / Up).
    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Id of the selected item as rendered.
    pub fn selected_id(&self) -> Option<NotificationId> {
        self.items.get(self.selected).map(Notification::id)
    }

    fn clamp_selection(&mut self) {
        if self.items.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.items.len() {
            self.selected = self.items.len() - 1;
        }
    }
}

impl RenderPort for FeedView {
    fn render_items(&mut self, items: &[Notification]) {
        self.items = items.to_vec();
        self.placeholder = None;
        self.clamp_selection();
    }

    fn render_placeholder(&mut self, placeholder: Placeholder) {
        self.items.clear();
        self.placeholder = Some(placeholder);
        self.clamp_selection();
    }

    fn render_count(&mut self, count: usize) {
        self.count = count;
    }

    fn render_pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn render_status(&mut self, status: StatusSignal) {
        self.status = status;
    }
}
