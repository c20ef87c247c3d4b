//! Gateway error model and backend error-message extraction.

use serde_json::Value;
use thiserror::Error;

/// Coarse error category, used by callers to pick a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Backend unreachable, connection reset, timeout.
    Transport,
    /// 401 on an authenticated call; the session has already been reset.
    Authorization,
    /// Any other non-2xx answer (bad credentials, validation, not found, server errors).
    Rejected,
    /// 2xx answer whose body did not have the expected shape.
    Decode,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("session is no longer valid (401 from {endpoint})")]
    Unauthorized { endpoint: String },

    #[error("backend rejected the request with status {status}")]
    Rejected {
        status: u16,
        /// Human-readable message pulled out of the error payload, if any.
        message: Option<String>,
        /// Error payload, when it was JSON.
        body: Option<Value>,
    },

    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Transport(_) => ApiErrorKind::Transport,
            ApiError::Unauthorized { .. } => ApiErrorKind::Authorization,
            ApiError::Rejected { .. } => ApiErrorKind::Rejected,
            ApiError::Decode(_) => ApiErrorKind::Decode,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    /// Message the backend attached to its error payload.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text suitable for display: the backend's message, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message().unwrap_or(fallback).to_string()
    }
}

/// Pull a human-readable message out of a backend error payload.
///
/// Looks at, in order: `detail` as a string, `detail` as a list of validation entries
/// carrying `msg` (joined with `"; "`), `message` as a string, `error` as a string.
/// Blank strings are ignored. Returns `None` for any other shape.
pub fn extract_message(payload: &Value) -> Option<String> {
    let Value::Object(fields) = payload else {
        return None;
    };

    if let Some(detail) = fields.get("detail") {
        match detail {
            Value::String(s) => {
                if let Some(msg) = non_blank(s) {
                    return Some(msg);
                }
            }
            Value::Array(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .filter_map(|entry| match entry {
                        Value::Object(obj) => obj.get("msg").and_then(Value::as_str),
                        Value::String(s) => Some(s.as_str()),
                        _ => None,
                    })
                    .filter_map(non_blank)
                    .collect();
                if !parts.is_empty() {
                    return Some(parts.join("; "));
                }
            }
            _ => {}
        }
    }

    ["message", "error"]
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find_map(non_blank)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn detail_string_wins() {
        let payload = json!({ "detail": "Incorrect username or password", "message": "x" });
        assert_eq!(
            extract_message(&payload).as_deref(),
            Some("Incorrect username or password")
        );
    }

    #[test]
    fn validation_entries_are_joined() {
        let payload = json!({
            "detail": [
                { "loc": ["body", "username"], "msg": "field required", "type": "missing" },
                { "loc": ["body", "password"], "msg": "field required", "type": "missing" }
            ]
        });
        assert_eq!(
            extract_message(&payload).as_deref(),
            Some("field required; field required")
        );
    }

    #[test]
    fn falls_through_to_message_then_error() {
        assert_eq!(
            extract_message(&json!({ "error": "conflict", "message": "Document already registered" }))
                .as_deref(),
            Some("Document already registered")
        );
        assert_eq!(
            extract_message(&json!({ "detail": "  ", "error": "not_found" })).as_deref(),
            Some("not_found")
        );
    }

    #[test]
    fn unknown_shapes_yield_nothing() {
        assert_eq!(extract_message(&json!(null)), None);
        assert_eq!(extract_message(&json!("boom")), None);
        assert_eq!(extract_message(&json!({ "detail": 42 })), None);
        assert_eq!(extract_message(&json!({ "detail": [{ "loc": [] }] })), None);
    }

    #[test]
    fn user_message_falls_back() {
        let err = ApiError::Rejected {
            status: 500,
            message: None,
            body: None,
        };
        assert_eq!(err.user_message("Unable to sign in"), "Unable to sign in");
        assert_eq!(err.kind(), ApiErrorKind::Rejected);
        assert_eq!(err.status(), Some(500));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            ".{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("detail".to_string()),
                        Just("msg".to_string()),
                        Just("message".to_string()),
                        Just("error".to_string()),
                        "[a-z]{1,6}",
                    ],
                    inner,
                    0..5,
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Property: extraction never panics and never yields a blank message.
        #[test]
        fn extraction_is_total_and_non_blank(payload in arb_json()) {
            if let Some(msg) = extract_message(&payload) {
                prop_assert!(!msg.trim().is_empty());
            }
        }
    }
}
