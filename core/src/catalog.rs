//! Built-in suites for the webinar backend's endpoint groups.
//!
//! Expectations assume the seeded backend: an admin account, the regular user
//! `commrade@example.com`, and at least one webinar. Cases that can only fail
//! through a database error or an unseen OTP are not listed.

use clap::ValueEnum;
use serde_json::json;

use crate::auth::try_login;
use crate::client::{ApiCall, ApiClient};
use crate::error::ProbeError;
use crate::http::Transport;
use crate::report::SuiteReport;
use crate::suite::Suite;

const REGISTERED_EMAIL: &str = "commrade@example.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SuiteKind {
    /// Public login, register and password-reset validation.
    Auth,
    /// Protected user endpoints.
    User,
    /// Protected webinar endpoints.
    Event,
    /// Protected material endpoints.
    Material,
    /// Certificate template endpoints.
    Cert,
    /// OTP generation.
    Otp,
}

impl SuiteKind {
    pub const ALL: [SuiteKind; 6] = [
        SuiteKind::Auth,
        SuiteKind::User,
        SuiteKind::Event,
        SuiteKind::Material,
        SuiteKind::Cert,
        SuiteKind::Otp,
    ];

    pub fn requires_token(&self) -> bool {
        !matches!(self, SuiteKind::Auth | SuiteKind::Otp)
    }

    /// Build the suite. `token` is ignored by suites that need no login.
    pub fn build(&self, token: &str) -> Suite {
        match self {
            SuiteKind::Auth => auth(),
            SuiteKind::User => user(token),
            SuiteKind::Event => event(token),
            SuiteKind::Material => material(token),
            SuiteKind::Cert => cert(token),
            SuiteKind::Otp => otp(),
        }
    }
}

/// Run `kinds` in order against `client`. When any of them needs a token,
/// log in as `email` first; a rejected login aborts before any suite runs.
pub fn run_suites<T: Transport>(
    client: &ApiClient<T>,
    kinds: &[SuiteKind],
    email: &str,
    pass: &str,
) -> Result<SuiteReport, ProbeError> {
    let token = if kinds.iter().any(SuiteKind::requires_token) {
        try_login(client, email, pass)?.as_str().to_string()
    } else {
        String::new()
    };

    let mut report = SuiteReport::new();
    for kind in kinds {
        report.merge(kind.build(&token).run(client));
    }
    Ok(report)
}

fn auth() -> Suite {
    Suite::new("auth")
        .case(
            ApiCall::post("login")
                .payload(&json!({"email": "", "pass": ""}))
                .description("login with empty email and password returns error_code 2"),
            2,
        )
        .case(
            ApiCall::post("login")
                .payload(&json!({"email": "aaaaaa", "pass": "none"}))
                .description("login with malformed email returns error_code 3"),
            3,
        )
        .case(
            ApiCall::post("login")
                .payload(&json!({"email": REGISTERED_EMAIL, "pass": "none"}))
                .description("login with wrong password returns error_code 5"),
            5,
        )
        .case(
            ApiCall::post("register")
                .payload(&json!({"name": "", "email": "", "instance": "", "pass": "", "otp_code": ""}))
                .description("register with empty fields returns error_code 2"),
            2,
        )
        .case(
            ApiCall::post("register")
                .payload(&json!({
                    "name": "A",
                    "email": "aaaaaaaaaaaa",
                    "instance": "Jobless",
                    "pass": "secure-password123",
                    "otp_code": "9090"
                }))
                .description("register with malformed email returns error_code 3"),
            3,
        )
        .case(
            ApiCall::post("user-reset-pass")
                .payload(&json!({"otp_code": "", "email": "", "pass": ""}))
                .description("password reset with empty fields returns error_code 2"),
            2,
        )
}

fn user(token: &str) -> Suite {
    Suite::new("user")
        .case(
            ApiCall::get("protected/user-info-of")
                .bearer(token)
                .description("user-info-of without email returns error_code 2"),
            2,
        )
        .case(
            ApiCall::get("protected/user-info-of")
                .query("email", "notregistered@example.com")
                .bearer(token)
                .description("user-info-of with unregistered email returns error_code 3"),
            3,
        )
        .case(
            ApiCall::get("protected/user-info-of")
                .query("email", REGISTERED_EMAIL)
                .bearer(token)
                .description("user-info-of with registered email returns error_code 0"),
            0,
        )
        .case(
            ApiCall::get("protected/user-info")
                .bearer(token)
                .description("user-info for the caller returns error_code 0"),
            0,
        )
        .case(
            ApiCall::get("protected/user-info-all")
                .query("limit", "100")
                .query("offset", "10")
                .bearer(token)
                .description("user-info-all with paging returns error_code 0"),
            0,
        )
        .case(
            ApiCall::get("protected/user-count")
                .bearer(token)
                .description("user-count as admin returns error_code 0"),
            0,
        )
        .case(
            ApiCall::post("protected/user-edit-admin")
                .bearer(token)
                .payload(&json!({"name": "No Email"}))
                .description("user-edit-admin without email returns error_code 4"),
            4,
        )
        .case(
            ApiCall::post("protected/user-edit-admin")
                .bearer(token)
                .payload(&json!({"email": "notfound@example.com"}))
                .description("user-edit-admin for an unknown user returns error_code 7"),
            7,
        )
        .case(
            ApiCall::post("protected/user-edit-admin")
                .bearer(token)
                .payload(&json!({"email": REGISTERED_EMAIL, "instance": "Updated Instance"}))
                .description("user-edit-admin with valid arguments returns error_code 0"),
            0,
        )
        .case(
            ApiCall::post("protected/user-edit-admin")
                .bearer(token)
                .payload(&json!({"email": REGISTERED_EMAIL}))
                .description("user-edit-admin with nothing to change returns error_code 7"),
            4,
        )
}

fn event(token: &str) -> Suite {
    Suite::new("event")
        .case(
            ApiCall::get("protected/event-info-all")
                .bearer(token)
                .description("event-info-all returns error_code 0"),
            0,
        )
        .case(
            ApiCall::get("protected/event-count")
                .bearer(token)
                .description("event-count returns error_code 0"),
            0,
        )
}

fn material(token: &str) -> Suite {
    Suite::new("material").case(
        ApiCall::get("protected/material-info-of")
            .query("event_id", "6")
            .bearer(token)
            .description("material-info-of for an existing webinar returns error_code 0"),
        0,
    )
}

fn cert(token: &str) -> Suite {
    Suite::new("cert").case(
        ApiCall::get("protected/cert-editor")
            .query("cert_id", "13")
            .bearer(token)
            .description("cert-editor for an existing template returns error_code 0"),
        0,
    )
}

fn otp() -> Suite {
    Suite::new("otp").case(
        ApiCall::get("gen-otp-for-register")
            .query("email", "")
            .description("gen-otp-for-register without email returns error_code 1"),
        1,
    )
}
