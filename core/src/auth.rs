//! Obtaining a bearer token from `POST login`.
//!
//! `login` mirrors the lenient helper the endpoint scripts were written
//! against: any failure collapses to an empty string. `try_login` reports why
//! the login failed so a runner can stop before sending authorized calls with
//! an empty token.

use std::fmt;

use crate::client::{ApiCall, ApiClient};
use crate::envelope::{Envelope, LoginRequest};
use crate::error::ProbeError;
use crate::http::Transport;

/// A non-empty token returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

fn login_call(email: &str, pass: &str) -> ApiCall {
    ApiCall::post("login")
        .payload(&LoginRequest {
            email: email.to_string(),
            pass: pass.to_string(),
        })
        .description(format!("login as {email}"))
}

/// Log in and return the token, or `""` on any failure (transport error,
/// unparsable body, missing or non-string `token`).
pub fn login<T: Transport>(client: &ApiClient<T>, email: &str, pass: &str) -> String {
    client
        .execute_and_extract(&login_call(email, pass))
        .and_then(|body| body.get("token").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_default()
}

/// Log in and fail fast when no usable token comes back.
pub fn try_login<T: Transport>(
    client: &ApiClient<T>,
    email: &str,
    pass: &str,
) -> Result<BearerToken, ProbeError> {
    let (_, body) = client.send(&login_call(email, pass))?;
    let envelope = Envelope::from_value(&body)?;
    if !envelope.is_success() {
        return Err(ProbeError::LoginRejected {
            error_code: envelope.error_code,
        });
    }
    match envelope.token {
        Some(token) if !token.is_empty() => Ok(BearerToken(token)),
        _ => Err(ProbeError::MissingToken),
    }
}
