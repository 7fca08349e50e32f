use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("API error {status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("unexpected payload from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        match error {
            error if error.is_timeout() => FetchError::Timeout(error),
            error => FetchError::Network(error),
        }
    }
}

/// Builds the message for a failed response. The body is usually
/// `{"error": "..."}` but sometimes `{"error": {...}}` or not JSON at all.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || status.canonical_reason().unwrap_or("unknown status").to_string();

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };

    match value.get("error") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        Some(serde_json::Value::Null) | None => fallback(),
        Some(serde_json::Value::String(_)) => fallback(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_from_string_error() {
        let m = error_message(StatusCode::TOO_MANY_REQUESTS, r#"{"error":"rate limited"}"#);
        assert_eq!(m, "rate limited");
    }

    #[test]
    fn message_from_object_error_is_serialized() {
        let m = error_message(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"status":{"error_code":10002,"error_message":"bad key"}}}"#,
        );
        assert!(m.contains("bad key"));
    }

    #[test]
    fn message_falls_back_to_reason_phrase() {
        assert_eq!(error_message(StatusCode::NOT_FOUND, "<html>"), "Not Found");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "{}"), "Bad Gateway");
    }

    #[test]
    fn http_error_display_carries_status() {
        let e = FetchError::Http {
            status: StatusCode::BAD_GATEWAY,
            message: "Bad Gateway".into(),
        };
        assert_eq!(e.to_string(), "API error 502 Bad Gateway: Bad Gateway");
    }
}
