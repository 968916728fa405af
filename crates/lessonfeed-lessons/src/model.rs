use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    pub status: String,
}

impl Lesson {
    /// Description, or a stand-in when the lesson has none.
    pub fn description_or_default(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "No description",
        }
    }

    pub fn status_label(&self) -> &str {
        match self.status.as_str() {
            "scheduled" => "Scheduled",
            "in_progress" => "In progress",
            "completed" => "Completed",
            "cancelled" => "Cancelled",
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPage {
    pub items: Vec<Lesson>,
    pub pagination: Pagination,
}

/// Fields submitted to the lesson creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLesson {
    pub title: String,
    pub description: String,
    /// Local datetime as the form expects it, e.g. `2026-05-01T10:00`.
    pub start_time: String,
    pub end_time: Option<String>,
    pub status: String,
}

impl NewLesson {
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("start_time", self.start_time.as_str()),
            ("status", self.status.as_str()),
        ];
        if let Some(end) = self.end_time.as_deref() {
            fields.push(("end_time", end));
        }
        fields
    }
}
