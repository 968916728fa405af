//! Error types for the lessons client.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LessonsError {
    #[error("invalid origin {origin}: {detail}")]
    InvalidOrigin { origin: String, detail: String },

    #[error("no csrftoken cookie for {0}; open the site once or pass --cookie")]
    MissingCsrfToken(String),

    #[error("{}", format_field_errors(.0))]
    Validation(BTreeMap<String, Vec<String>>),

    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("lessons http error: {0}")]
    Http(#[from] reqwest::Error),
}

fn format_field_errors(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join("; ")))
        .collect::<Vec<_>>()
        .join(", ")
}
