//! End-to-end checks against the live mock backend over real sockets.
//!
//! # Design
//! Each test starts the mock backend on a random port in a background tokio
//! runtime, then drives it through the blocking `ApiClient`. Timeouts and
//! refused connections use raw `std::net` sockets instead of the mock.

use std::io::Read;
use std::net::{SocketAddr, TcpListener};
use std::process::Command;
use std::time::{Duration, Instant};

use serde_json::json;
use webinar_mock_server::{ADMIN_EMAIL, ADMIN_PASS, USER_EMAIL, USER_PASS};
use webinar_probe::{
    login, run_suites, try_login, ApiCall, ApiClient, LoginRequest, ProbeConfig, ProbeError,
    SuiteKind,
};

fn spawn_backend() -> SocketAddr {
    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            webinar_mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr, timeout_secs: u64) -> ApiClient {
    ApiClient::from_config(&ProbeConfig {
        origin: format!("http://{addr}"),
        timeout_secs,
    })
    .unwrap()
}

fn login_call(email: &str, pass: &str) -> ApiCall {
    ApiCall::post("login")
        .payload(&LoginRequest {
            email: email.to_string(),
            pass: pass.to_string(),
        })
        .description("login")
}

#[test]
fn login_compare_then_extract_token() {
    let client = client_for(spawn_backend(), 5);
    let call = login_call(ADMIN_EMAIL, ADMIN_PASS);

    assert!(client.execute_and_compare(&call, 0));

    let body = client.execute_and_extract(&call).unwrap();
    assert_eq!(body["error_code"], 0);
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[test]
fn extracted_token_authorizes_follow_up_calls() {
    let client = client_for(spawn_backend(), 5);
    let token = login(&client, ADMIN_EMAIL, ADMIN_PASS);
    assert!(!token.is_empty());

    let missing_email = ApiCall::get("protected/user-info-of")
        .bearer(&token)
        .description("user-info-of without email");
    assert!(client.execute_and_compare(&missing_email, 2));
    assert!(!client.execute_and_compare(&missing_email, 0));

    let registered = ApiCall::get("protected/user-info-of")
        .query("email", USER_EMAIL)
        .bearer(&token);
    assert!(client.execute_and_compare(&registered, 0));
}

#[test]
fn non_admin_gets_error_code_1() {
    let client = client_for(spawn_backend(), 5);
    let token = try_login(&client, USER_EMAIL, USER_PASS).unwrap();
    let call = ApiCall::get("protected/user-info-of")
        .query("email", ADMIN_EMAIL)
        .bearer(token.as_str());
    assert!(client.execute_and_compare(&call, 1));
}

#[test]
fn failed_login_yields_empty_token_and_cascading_failures() {
    let client = client_for(spawn_backend(), 5);
    let token = login(&client, USER_EMAIL, "wrong");
    assert_eq!(token, "");

    // The middleware answers an empty bearer in plain text, so no expectation matches.
    let call = ApiCall::get("protected/user-info").bearer(&token);
    assert!(!client.execute_and_compare(&call, 0));
    assert!(client.execute_and_extract(&call).is_none());

    let err = try_login(&client, USER_EMAIL, "wrong").unwrap_err();
    assert!(matches!(err, ProbeError::LoginRejected { error_code: 5 }));
}

#[test]
fn extract_keeps_failure_envelopes() {
    let client = client_for(spawn_backend(), 5);
    let call = ApiCall::post("login").payload(&json!({"email": "", "pass": ""}));
    let body = client.execute_and_extract(&call).unwrap();
    assert_eq!(body["error_code"], 2);
    assert_eq!(body["success"], false);
}

#[test]
fn plain_text_body_is_a_mismatch() {
    let client = client_for(spawn_backend(), 5);
    let call = ApiCall::get("health");
    assert!(!client.execute_and_compare(&call, 0));
    assert!(!client.execute_and_compare(&call, -1));
    assert!(client.execute_and_extract(&call).is_none());
}

#[test]
fn public_suites_pass_against_mock() {
    let client = client_for(spawn_backend(), 5);
    for kind in [SuiteKind::Auth, SuiteKind::Otp] {
        let report = kind.build("").run(&client);
        assert_eq!(report.failed(), 0, "{kind:?}: {:?}", report.outcomes());
        assert_eq!(report.exit_code(), 0);
    }
}

#[test]
fn user_suite_passes_with_admin_token() {
    let client = client_for(spawn_backend(), 5);
    let report = run_suites(&client, &[SuiteKind::User], ADMIN_EMAIL, ADMIN_PASS).unwrap();
    assert_eq!(report.failed(), 0, "{:?}", report.outcomes());
    assert_eq!(report.passed(), SuiteKind::User.build("").cases().len());
}

#[test]
fn rejected_login_stops_authorized_suites() {
    let client = client_for(spawn_backend(), 5);
    let err = run_suites(&client, &[SuiteKind::Auth, SuiteKind::User], USER_EMAIL, "wrong").unwrap_err();
    assert!(matches!(err, ProbeError::LoginRejected { error_code: 5 }));
}

fn probe_binary(addr: SocketAddr, pass: &str, suites: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_webinar-probe"));
    cmd.arg("--origin")
        .arg(format!("http://{addr}"))
        .arg("--timeout-secs")
        .arg("5")
        .arg("--email")
        .arg(ADMIN_EMAIL)
        .arg("--pass")
        .arg(pass)
        .args(suites)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_exit_codes() {
    let addr = spawn_backend();

    let out = probe_binary(addr, ADMIN_PASS, &["auth", "otp", "user"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(out.status.code(), Some(0), "{stdout}");
    assert!(stdout.contains("0 failed"), "{stdout}");

    let out = probe_binary(addr, "wrong", &["user"]).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(!String::from_utf8_lossy(&out.stdout).contains("[PASSED]"));

    // No token needed, so bad credentials are never tried.
    let out = probe_binary(addr, "wrong", &["otp"]).output().unwrap();
    assert_eq!(out.status.code(), Some(0));

    let out = probe_binary(addr, ADMIN_PASS, &["event"]).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn timeout_degrades_to_false_and_none() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept and hold connections without ever answering.
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            let mut stream = stream;
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            held.push(stream);
        }
    });

    let client = client_for(addr, 1);
    let call = login_call(ADMIN_EMAIL, ADMIN_PASS);

    let started = Instant::now();
    assert!(!client.execute_and_compare(&call, 0));
    assert!(client.execute_and_extract(&call).is_none());
    assert_eq!(login(&client, ADMIN_EMAIL, ADMIN_PASS), "");
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn refused_connection_degrades_to_false_and_none() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let client = client_for(addr, 2);
    let call = ApiCall::get("protected/event-count");
    assert!(!client.execute_and_compare(&call, 0));
    assert!(client.execute_and_extract(&call).is_none());
    assert!(matches!(client.send(&call), Err(ProbeError::Transport(_))));
}
