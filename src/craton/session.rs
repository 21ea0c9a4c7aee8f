//! Session
//!
//! Identity, project scope and the HTTP transport shared by every manager of
//! one [`Client`](super::client::Client).

use crate::error::{CratonError, CratonResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::fmt;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const AUTH_USER: HeaderName = HeaderName::from_static("x-auth-user");
const AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");
const AUTH_PROJECT: HeaderName = HeaderName::from_static("x-auth-project");

/// Cut `text` to at most `max` bytes on a char boundary
fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, {} bytes total]", &text[..end], text.len())
}

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    truncate(body, MAX_LOG_BODY_LENGTH).replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Server message as shown to the user: any script is kept, control
/// characters are dropped
fn sanitize_for_display(message: &str) -> String {
    truncate(message, MAX_LOG_BODY_LENGTH).replace(char::is_control, "")
}

/// Pull a human readable message out of an error body, if there is one
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .and_then(|v| v.as_str())?;
    Some(sanitize_for_display(message))
}

/// Credentials and scope for one invocation
#[derive(Clone)]
pub struct Session {
    username: Option<String>,
    token: Option<String>,
    project_id: i64,
    http: reqwest::Client,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl Session {
    /// Create a new session carrying the given identity
    pub fn new(
        username: Option<String>,
        token: Option<String>,
        project_id: i64,
    ) -> CratonResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_PROJECT, HeaderValue::from(project_id));
        if let Some(user) = &username {
            headers.insert(AUTH_USER, header_value(user, "username")?);
        }
        if let Some(token) = &token {
            let mut value = header_value(token, "password")?;
            value.set_sensitive(true);
            headers.insert(AUTH_TOKEN, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("craton/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            username,
            token,
            project_id,
            http,
        })
    }

    pub fn project_id(&self) -> i64 {
        self.project_id
    }

    /// Make a GET request with query parameters
    pub async fn get(&self, url: &str, query: &[(String, String)]) -> CratonResult<Value> {
        self.send(Method::GET, url, query, None).await
    }

    /// Make a POST request with a JSON body
    pub async fn post(&self, url: &str, body: &Value) -> CratonResult<Value> {
        self.send(Method::POST, url, &[], Some(body)).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, body: &Value) -> CratonResult<Value> {
        self.send(Method::PUT, url, &[], Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> CratonResult<Value> {
        self.send(Method::DELETE, url, &[], None).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> CratonResult<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("{} {} returned 404", method, url);
            return Err(CratonError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(CratonError::Request {
                method,
                url: url.to_string(),
                status,
                message: error_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| CratonError::Decode(format!("invalid JSON from {}: {}", url, e)))
    }
}

fn header_value(value: &str, what: &str) -> CratonResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| CratonError::Config(format!("{} contains characters not allowed in a header", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message": "Region already exists"}"#),
            Some("Region already exists".to_string())
        );
        assert_eq!(
            error_message(r#"{"error": {"code": 400, "message": "bad name"}}"#),
            Some("bad name".to_string())
        );
        assert_eq!(error_message("<html>oops</html>"), None);
    }

    #[test]
    fn test_error_message_keeps_non_ascii_text() {
        assert_eq!(
            error_message(r#"{"message": "Région « est »\n existe déjà"}"#),
            Some("Région « est » existe déjà".to_string())
        );
        assert_eq!(sanitize_for_log("Région"), "Rgion");
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(Some("demo".into()), Some("s3cret".into()), 1).unwrap();
        let debug = format!("{:?}", session);
        assert!(debug.contains("demo"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_rejects_header_unsafe_credentials() {
        let err = Session::new(Some("bad\nuser".into()), None, 1).unwrap_err();
        assert!(matches!(err, CratonError::Config(_)));
    }
}
