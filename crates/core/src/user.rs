//! Identity payload of the signed-in user.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// User record as returned by the backend's "who am I" endpoint.
///
/// The record is opaque: the client only requires it to be a JSON object and exposes a
/// few read-only accessors for display. Unknown fields are preserved as-is so that the
/// persisted copy round-trips whatever the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct UserRecord {
    fields: Map<String, Value>,
}

impl UserRecord {
    /// Wrap a backend payload. Anything but a JSON object is rejected.
    pub fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(DomainError::malformed(format!(
                "user record must be a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Backend identifier, rendered as text regardless of its JSON type.
    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.str_field("username")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    pub fn full_name(&self) -> Option<&str> {
        self.str_field("full_name")
    }

    pub fn role(&self) -> Option<&str> {
        self.str_field("role")
    }

    /// Best human-facing label: full name, then name, then username, then email.
    pub fn display_name(&self) -> &str {
        self.full_name()
            .or_else(|| self.str_field("name"))
            .or_else(|| self.username())
            .or_else(|| self.email())
            .unwrap_or("unknown user")
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

impl TryFrom<Value> for UserRecord {
    type Error = DomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<UserRecord> for Value {
    fn from(value: UserRecord) -> Self {
        Value::Object(value.fields)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_read_display_fields() {
        let user = UserRecord::from_value(json!({
            "id": 1,
            "username": "admin",
            "email": "admin@tms.local",
            "full_name": "",
            "role": "admin",
        }))
        .unwrap();

        assert_eq!(user.id().as_deref(), Some("1"));
        assert_eq!(user.username(), Some("admin"));
        assert_eq!(user.role(), Some("admin"));
        // Blank full name is skipped in favour of the username.
        assert_eq!(user.display_name(), "admin");
    }

    #[test]
    fn non_object_payloads_are_rejected() {
        assert!(UserRecord::from_value(json!(null)).is_err());
        assert!(UserRecord::from_value(json!("admin")).is_err());
        assert!(serde_json::from_str::<UserRecord>("[1,2]").is_err());
    }

    #[test]
    fn serde_preserves_unknown_fields() {
        let raw = r#"{"id":7,"username":"ops","tenant":{"slug":"acme"}}"#;
        let user: UserRecord = serde_json::from_str(raw).unwrap();
        let back: Value = serde_json::from_str(&serde_json::to_string(&user).unwrap()).unwrap();
        assert_eq!(back["tenant"]["slug"], "acme");
    }
}
