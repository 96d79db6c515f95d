//! The response envelope every endpoint of the webinar API answers with.
//!
//! # Design
//! The backend wraps each reply in `{success, message, error_code, data, ...}`.
//! Only `error_code` matters for pass/fail, and it is decoded as an integer
//! that falls back to `MISSING_ERROR_CODE` when absent, so a body without the
//! field never matches an expectation of `0`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProbeError;

/// Substituted for `error_code` when the body omits it.
pub const MISSING_ERROR_CODE: i64 = -1;

fn missing_error_code() -> i64 {
    MISSING_ERROR_CODE
}

/// Decoded form of a response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default = "missing_error_code")]
    pub error_code: i64,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Decode an already parsed body. Anything but a JSON object, or an
    /// `error_code` that is not an integer, is rejected.
    pub fn from_value(body: &Value) -> Result<Self, ProbeError> {
        if !body.is_object() {
            return Err(ProbeError::Deserialization(format!(
                "expected a JSON object, got {body}"
            )));
        }
        Envelope::deserialize(body).map_err(|e| ProbeError::Deserialization(e.to_string()))
    }

    pub fn is_success(&self) -> bool {
        self.error_code == 0
    }
}

/// Parse raw response text as JSON.
pub fn parse_body(body: &str) -> Result<Value, ProbeError> {
    serde_json::from_str(body).map_err(|e| ProbeError::Deserialization(e.to_string()))
}

/// Payload of `POST login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub pass: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_error_code_defaults_to_sentinel() {
        let env = Envelope::from_value(&json!({"success": true})).unwrap();
        assert_eq!(env.error_code, MISSING_ERROR_CODE);
        assert!(!env.is_success());
    }

    #[test]
    fn full_envelope_decodes() {
        let body = json!({
            "success": true,
            "message": "successfully logged in.",
            "error_code": 0,
            "data": {"UserEmail": "a@b.com"},
            "token": "abc123"
        });
        let env = Envelope::from_value(&body).unwrap();
        assert!(env.is_success());
        assert_eq!(env.token.as_deref(), Some("abc123"));
        assert_eq!(env.data.unwrap()["UserEmail"], "a@b.com");
    }

    #[test]
    fn null_fields_are_tolerated() {
        let env = Envelope::from_value(&json!({"error_code": 2, "data": null, "message": null})).unwrap();
        assert_eq!(env.error_code, 2);
        assert!(env.data.is_none());
    }

    #[test]
    fn string_error_code_is_rejected() {
        let err = Envelope::from_value(&json!({"error_code": "0"})).unwrap_err();
        assert!(matches!(err, ProbeError::Deserialization(_)));
    }

    #[test]
    fn arrays_are_rejected() {
        assert!(Envelope::from_value(&json!([0, true])).is_err());
    }

    #[test]
    fn parse_body_rejects_html() {
        assert!(parse_body("<html>Bad Gateway</html>").is_err());
    }

    #[test]
    fn login_request_uses_wire_names() {
        let req = LoginRequest {
            email: "a@b.com".to_string(),
            pass: "x".to_string(),
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"email": "a@b.com", "pass": "x"}));
    }
}
