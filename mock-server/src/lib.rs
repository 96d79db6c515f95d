//! In-memory stand-in for the webinar backend.
//!
//! Implements a handful of endpoints with the same `{success, message,
//! error_code, data}` envelope and the same error codes as the real service.
//! Protected routes behave like the JWT middleware in front of them: a missing
//! or unknown bearer token gets a plain-text 400/401, not an envelope.

use std::{
    collections::HashMap,
    sync::Arc,
};

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@wowadmin.com";
pub const ADMIN_PASS: &str = "secret";
pub const USER_EMAIL: &str = "commrade@example.com";
pub const USER_PASS: &str = "secure-password123";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub picture: String,
    #[serde(skip_serializing)]
    pub pass: String,
    pub admin: bool,
}

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub pass: String,
}

#[derive(Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub otp_code: String,
}

#[derive(Deserialize)]
pub struct ResetPassBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub otp_code: String,
}

#[derive(Deserialize)]
pub struct EditAdminBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instance: String,
    #[serde(default)]
    pub picture: String,
    pub password: Option<String>,
}

#[derive(Default)]
pub struct Backend {
    users: HashMap<String, User>,
    /// token -> email
    sessions: HashMap<String, String>,
    /// email -> pending OTP code
    otp_codes: HashMap<String, String>,
}

impl Backend {
    /// Backend seeded with one admin and one regular user.
    pub fn seeded() -> Self {
        let mut backend = Self::default();
        for (email, name, pass, admin) in [
            (ADMIN_EMAIL, "admin", ADMIN_PASS, true),
            (USER_EMAIL, "Commrade", USER_PASS, false),
        ] {
            backend.users.insert(
                email.to_string(),
                User {
                    email: email.to_string(),
                    name: name.to_string(),
                    instance: String::new(),
                    picture: String::new(),
                    pass: pass.to_string(),
                    admin,
                },
            );
        }
        backend
    }

    /// The OTP code currently pending for `email`, as the real service would
    /// print to its console.
    pub fn pending_otp(&self, email: &str) -> Option<&str> {
        self.otp_codes.get(email).map(String::as_str)
    }
}

pub type Db = Arc<RwLock<Backend>>;

/// Every route `app` serves, as `(method, path)`.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/api/health"),
    ("GET", "/api/gen-otp-for-register"),
    ("POST", "/api/login"),
    ("POST", "/api/register"),
    ("POST", "/api/user-reset-pass"),
    ("GET", "/api/protected/user-info"),
    ("GET", "/api/protected/user-info-of"),
    ("GET", "/api/protected/user-info-all"),
    ("GET", "/api/protected/user-count"),
    ("POST", "/api/protected/user-edit-admin"),
];

pub fn app() -> Router {
    app_with_state(Arc::new(RwLock::new(Backend::seeded())))
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/gen-otp-for-register", get(gen_otp))
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/user-reset-pass", post(reset_pass))
        .route("/api/protected/user-info", get(user_info))
        .route("/api/protected/user-info-of", get(user_info_of))
        .route("/api/protected/user-info-all", get(user_info_all))
        .route("/api/protected/user-count", get(user_count))
        .route("/api/protected/user-edit-admin", post(user_edit_admin))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn envelope(status: StatusCode, error_code: i64, message: &str, data: Value) -> Response {
    let success = error_code == 0;
    (
        status,
        Json(json!({
            "success": success,
            "message": message,
            "error_code": error_code,
            "data": data,
        })),
    )
        .into_response()
}

fn is_email_valid(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Resolve the caller from `Authorization: Bearer <token>`, or produce the
/// middleware's plain-text rejection.
fn authenticate(backend: &Backend, headers: &HeaderMap) -> Result<User, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty());
    let Some(token) = token else {
        return Err((StatusCode::BAD_REQUEST, "Missing or malformed JWT").into_response());
    };
    backend
        .sessions
        .get(token)
        .and_then(|email| backend.users.get(email))
        .cloned()
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Invalid or expired JWT").into_response())
}

async fn health() -> &'static str {
    "ok"
}

async fn gen_otp(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Response {
    let email = query.get("email").map(String::as_str).unwrap_or_default();
    if !is_email_valid(email) {
        return envelope(StatusCode::BAD_REQUEST, 1, "Invalid email.", Value::Null);
    }
    let code = format!("{:04}", Uuid::new_v4().as_u128() % 10_000);
    tracing::info!(%email, %code, "generated OTP code");
    db.write().await.otp_codes.insert(email.to_string(), code);
    envelope(
        StatusCode::OK,
        0,
        "Generated the OTP please check console or email.",
        Value::Null,
    )
}

async fn login(State(db): State<Db>, body: Result<Json<LoginBody>, JsonRejection>) -> Response {
    let Ok(Json(body)) = body else {
        return envelope(StatusCode::BAD_REQUEST, 1, "Invalid request body", Value::Null);
    };
    if body.email.is_empty() || body.pass.is_empty() {
        return envelope(StatusCode::BAD_REQUEST, 2, "Email or password empty", Value::Null);
    }
    if !is_email_valid(&body.email) {
        return envelope(StatusCode::BAD_REQUEST, 3, "Invalid email", Value::Null);
    }

    let mut backend = db.write().await;
    let Some(user) = backend.users.get(&body.email).cloned() else {
        return envelope(StatusCode::INTERNAL_SERVER_ERROR, 4, "record not found", Value::Null);
    };
    if user.pass != body.pass {
        return envelope(StatusCode::BAD_REQUEST, 5, "Wrong Password", Value::Null);
    }

    let token = Uuid::new_v4().to_string();
    backend.sessions.insert(token.clone(), user.email.clone());
    tracing::debug!(email = %user.email, "issued token");
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "successfully logged in.",
            "data": user,
            "error_code": 0,
            "token": token,
        })),
    )
        .into_response()
}

async fn register(State(db): State<Db>, body: Result<Json<RegisterBody>, JsonRejection>) -> Response {
    let Ok(Json(body)) = body else {
        return envelope(StatusCode::BAD_REQUEST, 1, "Invalid request body", Value::Null);
    };
    if [&body.name, &body.email, &body.instance, &body.pass, &body.otp_code]
        .iter()
        .any(|field| field.is_empty())
    {
        return envelope(StatusCode::BAD_REQUEST, 2, "Some fields are empty", Value::Null);
    }
    if !is_email_valid(&body.email) {
        return envelope(StatusCode::BAD_REQUEST, 3, "Invalid email", Value::Null);
    }

    let mut backend = db.write().await;
    if backend.users.contains_key(&body.email) {
        return envelope(StatusCode::BAD_REQUEST, 5, "Email already registered", Value::Null);
    }
    if backend.otp_codes.get(&body.email) != Some(&body.otp_code) {
        return envelope(StatusCode::BAD_REQUEST, 10, "Invalid OTP code", Value::Null);
    }
    backend.otp_codes.remove(&body.email);
    let user = User {
        email: body.email.clone(),
        name: body.name,
        instance: body.instance,
        picture: String::new(),
        pass: body.pass,
        admin: false,
    };
    backend.users.insert(body.email, user.clone());
    envelope(StatusCode::OK, 0, "registered", json!(user))
}

async fn reset_pass(State(db): State<Db>, body: Result<Json<ResetPassBody>, JsonRejection>) -> Response {
    let Ok(Json(body)) = body else {
        return envelope(StatusCode::BAD_REQUEST, 1, "Invalid request body", Value::Null);
    };
    if body.email.is_empty() || body.pass.is_empty() || body.otp_code.is_empty() {
        return envelope(StatusCode::BAD_REQUEST, 2, "Some fields are empty", Value::Null);
    }

    let mut backend = db.write().await;
    if backend.otp_codes.get(&body.email) != Some(&body.otp_code) {
        return envelope(StatusCode::BAD_REQUEST, 4, "Invalid OTP or user", Value::Null);
    }
    backend.otp_codes.remove(&body.email);
    let Some(user) = backend.users.get_mut(&body.email) else {
        return envelope(StatusCode::BAD_REQUEST, 4, "Invalid OTP or user", Value::Null);
    };
    user.pass = body.pass;
    envelope(StatusCode::OK, 0, "Password updated.", Value::Null)
}

async fn user_info(State(db): State<Db>, headers: HeaderMap) -> Response {
    let backend = db.read().await;
    match authenticate(&backend, &headers) {
        Ok(user) => envelope(StatusCode::OK, 0, "Check the data.", json!(user)),
        Err(rejection) => rejection,
    }
}

async fn user_info_of(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let backend = db.read().await;
    let caller = match authenticate(&backend, &headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    if !caller.admin {
        return envelope(
            StatusCode::UNAUTHORIZED,
            1,
            "Invalid credentials to access this api.",
            Value::Null,
        );
    }
    let email = query.get("email").map(String::as_str).unwrap_or_default();
    if email.is_empty() {
        return envelope(StatusCode::BAD_REQUEST, 2, "No email specified.", Value::Null);
    }
    match backend.users.get(email) {
        Some(user) => envelope(StatusCode::OK, 0, "Check the data.", json!(user)),
        None => envelope(
            StatusCode::BAD_REQUEST,
            3,
            "The email specified is not registered.",
            Value::Null,
        ),
    }
}

async fn user_info_all(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let backend = db.read().await;
    let caller = match authenticate(&backend, &headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    if !caller.admin {
        return envelope(
            StatusCode::UNAUTHORIZED,
            1,
            "Invalid credentials to access this api.",
            Value::Null,
        );
    }
    let offset = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10_000);

    let mut users: Vec<&User> = backend.users.values().collect();
    users.sort_by(|a, b| a.name.cmp(&b.name));
    let page: Vec<&User> = users.into_iter().skip(offset).take(limit).collect();
    envelope(StatusCode::OK, 0, "Accept the data.", json!(page))
}

async fn user_edit_admin(
    State(db): State<Db>,
    headers: HeaderMap,
    body: Result<Json<EditAdminBody>, JsonRejection>,
) -> Response {
    let mut backend = db.write().await;
    let caller = match authenticate(&backend, &headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    if !caller.admin {
        return envelope(
            StatusCode::BAD_REQUEST,
            2,
            "Invalid credentials to access this api.",
            Value::Null,
        );
    }
    let Ok(Json(body)) = body else {
        return envelope(StatusCode::BAD_REQUEST, 3, "Invalid request body", Value::Null);
    };
    if body.email.is_empty() {
        return envelope(StatusCode::BAD_REQUEST, 4, "Target user email is required.", Value::Null);
    }

    let not_found = || envelope(StatusCode::NOT_FOUND, 7, "User not found or no changes made.", Value::Null);
    let Some(user) = backend.users.get_mut(&body.email) else {
        return not_found();
    };
    let mut changed = false;
    for (field, value) in [
        (&mut user.name, body.name),
        (&mut user.instance, body.instance),
        (&mut user.picture, body.picture),
        (&mut user.pass, body.password.unwrap_or_default()),
    ] {
        if !value.is_empty() {
            *field = value;
            changed = true;
        }
    }
    if !changed {
        return not_found();
    }
    envelope(StatusCode::OK, 0, "Data modified.", Value::Null)
}

async fn user_count(State(db): State<Db>, headers: HeaderMap) -> Response {
    let backend = db.read().await;
    let caller = match authenticate(&backend, &headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    if !caller.admin {
        return envelope(StatusCode::UNAUTHORIZED, 1, "Admin only.", Value::Null);
    }
    envelope(StatusCode::OK, 0, "Check the data.", json!(backend.users.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_without_password() {
        let backend = Backend::seeded();
        let json = serde_json::to_value(&backend.users[ADMIN_EMAIL]).unwrap();
        assert_eq!(json["email"], ADMIN_EMAIL);
        assert_eq!(json["admin"], true);
        assert!(json.get("pass").is_none());
    }

    #[test]
    fn email_validation() {
        assert!(is_email_valid("a@b.com"));
        assert!(!is_email_valid("aaaaaa"));
        assert!(!is_email_valid("@b.com"));
        assert!(!is_email_valid("a@b"));
    }

    #[test]
    fn register_body_fields_default_to_empty() {
        let body: RegisterBody = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert_eq!(body.name, "A");
        assert!(body.email.is_empty());
        assert!(body.otp_code.is_empty());
    }

    #[test]
    fn unauthenticated_requests_are_rejected() {
        let backend = Backend::seeded();
        assert!(authenticate(&backend, &HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
        assert!(authenticate(&backend, &headers).is_err());
    }
}
