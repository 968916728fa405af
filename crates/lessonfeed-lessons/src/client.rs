//! HTTP client for the lesson endpoints.
//!
//! Mutating requests carry the `X-CSRFToken` header, read from the
//! origin's `csrftoken` cookie. The cookie jar is primed by fetching the
//! origin page or seeded explicitly with [`LessonsClient::add_cookie`].

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::error::LessonsError;
use crate::model::{LessonPage, NewLesson};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

const LIST_PATH: &str = "/lessons/";
const CREATE_PATH: &str = "/lesson_add/";
const GENERIC_CREATE_ERROR: &str = "Failed to save the lesson";

pub struct LessonsClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    origin: Url,
}

impl LessonsClient {
    pub fn new(origin: &str) -> Result<Self, LessonsError> {
        let origin = Url::parse(origin).map_err(|e| LessonsError::InvalidOrigin {
            origin: origin.to_owned(),
            detail: e.to_string(),
        })?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()?;
        Ok(Self { http, jar, origin })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Seed the jar with a `name=value` cookie for the origin.
    pub fn add_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.origin);
    }

    /// Current anti-forgery token, if the jar holds one.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        cookie_value(header.to_str().ok()?, CSRF_COOKIE)
    }

    /// Fetch the origin page so the server can set its `csrftoken` cookie.
    pub async fn prime_csrf(&self) -> Result<(), LessonsError> {
        let resp = self.http.get(self.origin.clone()).send().await?;
        tracing::debug!(status = %resp.status(), "primed csrf cookie");
        Ok(())
    }

    /// Fetch one page of lessons (1-based).
    pub async fn list(&self, page: u32) -> Result<LessonPage, LessonsError> {
        let url = self.endpoint(LIST_PATH)?;
        let resp = self
            .http
            .get(url)
            .query(&[("page", page)])
            .send()
            .await?
            .error_for_status()?;
        let page: LessonPage = resp.json().await?;
        tracing::debug!(
            page = page.pagination.page,
            pages = page.pagination.pages,
            items = page.items.len(),
            "fetched lessons"
        );
        Ok(page)
    }

    /// Submit the lesson creation form.
    pub async fn create(&self, lesson: &NewLesson) -> Result<(), LessonsError> {
        let token = match self.csrf_token() {
            Some(token) => token,
            None => {
                self.prime_csrf().await?;
                self.csrf_token()
                    .ok_or_else(|| LessonsError::MissingCsrfToken(self.origin.to_string()))?
            }
        };

        let url = self.endpoint(CREATE_PATH)?;
        let resp = self
            .http
            .post(url)
            .header(CSRF_HEADER, token)
            .header(reqwest::header::REFERER, self.origin.as_str())
            .form(&lesson.form_fields())
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            tracing::info!(title = %lesson.title, "lesson created");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "lesson creation rejected");
        Err(rejection(status, &body))
    }

    fn endpoint(&self, path: &str) -> Result<Url, LessonsError> {
        self.origin
            .join(path)
            .map_err(|e| LessonsError::InvalidOrigin {
                origin: self.origin.to_string(),
                detail: e.to_string(),
            })
    }
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`) and percent-decode
/// its value. A value that does not decode to UTF-8 is returned as is.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_owned())
        })
    })
}

/// Turn a non-2xx creation response into an error: field-level
/// `errors` first, then `message`, then a generic text.
fn rejection(status: StatusCode, body: &str) -> LessonsError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if let Some(errors) = parsed.as_ref().and_then(|v| v.get("errors")) {
        let fields = field_errors(errors);
        if !fields.is_empty() {
            return LessonsError::Validation(fields);
        }
    }
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(GENERIC_CREATE_ERROR)
        .to_owned();
    LessonsError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn field_errors(errors: &Value) -> BTreeMap<String, Vec<String>> {
    let mut fields = BTreeMap::new();
    match errors {
        Value::Object(map) => {
            for (field, messages) in map {
                let messages = match messages {
                    Value::Array(items) => items.iter().map(value_text).collect(),
                    other => vec![value_text(other)],
                };
                fields.insert(field.clone(), messages);
            }
        }
        Value::Null => {}
        other => {
            fields.insert("__all__".to_owned(), vec![value_text(other)]);
        }
    }
    fields
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Django's `errors.get_json_data()` shape.
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "sessionid=s1; csrftoken=abc123; theme=dark";
        assert_eq!(cookie_value(header, "csrftoken"), Some("abc123".into()));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("csrftokenx=1", "csrftoken"), None);
    }

    #[test]
    fn cookie_value_is_percent_decoded() {
        assert_eq!(
            cookie_value("csrftoken=a%2Bb%3D%3D; x=1", "csrftoken"),
            Some("a+b==".into())
        );
        assert_eq!(cookie_value("csrftoken=%FF", "csrftoken"), Some("%FF".into()));
    }

    #[test]
    fn rejection_prefers_field_errors() {
        let body = json!({"errors": {"title": ["This field is required."]}}).to_string();
        match rejection(StatusCode::BAD_REQUEST, &body) {
            LessonsError::Validation(fields) => {
                assert_eq!(fields["title"], vec!["This field is required."]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejection_handles_django_json_shape() {
        let body = json!({"errors": {"end_time": [{"message": "too early", "code": "invalid"}]}})
            .to_string();
        match rejection(StatusCode::BAD_REQUEST, &body) {
            LessonsError::Validation(fields) => assert_eq!(fields["end_time"], vec!["too early"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejection_falls_back_to_message_then_generic() {
        let body = json!({"status": "boom", "message": "Internal error"}).to_string();
        assert!(matches!(
            rejection(StatusCode::INTERNAL_SERVER_ERROR, &body),
            LessonsError::Rejected { status: 500, ref message } if message == "Internal error"
        ));
        assert!(matches!(
            rejection(StatusCode::BAD_GATEWAY, "<html>"),
            LessonsError::Rejected { status: 502, ref message } if message == GENERIC_CREATE_ERROR
        ));
    }

    #[test]
    fn invalid_origin_is_reported() {
        assert!(matches!(
            LessonsClient::new("not a url"),
            Err(LessonsError::InvalidOrigin { .. })
        ));
    }

    #[test]
    fn seeded_cookie_becomes_token() {
        let client = LessonsClient::new("http://127.0.0.1:8000").unwrap();
        assert_eq!(client.csrf_token(), None);
        client.add_cookie("csrftoken=seeded");
        assert_eq!(client.csrf_token(), Some("seeded".into()));
    }
}
