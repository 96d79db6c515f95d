//! Call descriptors and the client that executes them.
//!
//! # Design
//! `ApiCall` is an immutable description of one request: relative path,
//! query pairs, method name, headers, optional JSON payload and a
//! human-readable description. `ApiClient` resolves it against the `/api/` prefix, hands the
//! resulting `HttpRequest` to its `Transport`, and offers two ways of looking
//! at the answer:
//!
//! - `execute_and_compare` / `report_outcome` check the envelope's
//!   `error_code` against an expectation and print diagnostics.
//! - `execute_and_extract` returns the parsed body silently, for setup steps
//!   such as pulling a token out of a login response.
//!
//! Both sit on the fallible `send` primitive and never propagate its errors.

use serde::Serialize;
use serde_json::Value;

use crate::config::ProbeConfig;
use crate::endpoint::ApiBase;
use crate::envelope::{parse_body, Envelope};
use crate::error::ProbeError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::report::Outcome;

/// Printed before each compared call.
pub const SEPARATOR: &str = "====================";

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// One probe call against the API.
///
/// The method is stored upper-cased but not validated; an unsupported method
/// surfaces as a failed result when the call is executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    path: String,
    query: Vec<(String, String)>,
    method: String,
    headers: Option<Vec<(String, String)>>,
    /// Serialized once, in the caller's field order.
    payload: Option<String>,
    payload_error: Option<String>,
    description: String,
}

impl ApiCall {
    pub fn new(path: impl Into<String>, method: &str) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            method: method.to_ascii_uppercase(),
            headers: None,
            payload: None,
            payload_error: None,
            description: String::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path, "GET")
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(path, "POST")
    }

    /// Append a query pair. Pairs are form-encoded when the request is built,
    /// after any query already written into the path.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add a header. The first explicit header replaces the default
    /// `Content-Type: application/json` set.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    /// Add `Authorization: Bearer <token>`.
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    /// Attach a JSON payload. It is serialized here and sent byte for byte;
    /// a serialization failure is reported when the call is executed.
    pub fn payload<P: Serialize>(mut self, payload: &P) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => {
                self.payload = Some(body);
                self.payload_error = None;
            }
            Err(e) => {
                self.payload = None;
                self.payload_error = Some(e.to_string());
            }
        }
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// The serialized payload, if one was attached.
    pub fn payload_json(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn describe(&self) -> &str {
        &self.description
    }

    /// Headers that will be sent, after defaulting.
    pub fn effective_headers(&self) -> Vec<(String, String)> {
        match &self.headers {
            Some(headers) => headers.clone(),
            None => vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
        }
    }
}

/// Executes `ApiCall`s against one API origin.
#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    base: ApiBase,
    transport: T,
}

impl ApiClient<UreqTransport> {
    /// Blocking client for the configured origin and timeout.
    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let base = ApiBase::new(&config.origin)?;
        Ok(Self::new(base, UreqTransport::new(config.timeout())))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base: ApiBase, transport: T) -> Self {
        Self { base, transport }
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    /// Turn a descriptor into a concrete request. GET never carries a body;
    /// POST carries the payload serialized as JSON, if there is one.
    pub fn build_request(&self, call: &ApiCall) -> Result<HttpRequest, ProbeError> {
        let method = HttpMethod::parse(&call.method)?;
        let pairs: Vec<(&str, &str)> = call
            .query
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let url = self.base.endpoint_with_query(&call.path, &pairs)?;
        let mut headers = call.effective_headers();

        let body = match method {
            HttpMethod::Get => None,
            HttpMethod::Post => {
                if let Some(err) = &call.payload_error {
                    return Err(ProbeError::Serialization(err.clone()));
                }
                match &call.payload {
                    Some(payload) => {
                        let has_content_type = headers
                            .iter()
                            .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE));
                        if !has_content_type {
                            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
                        }
                        Some(payload.clone())
                    }
                    None => None,
                }
            }
        };

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    /// Execute the call and return the raw response, whatever its status.
    pub fn dispatch(&self, call: &ApiCall) -> Result<HttpResponse, ProbeError> {
        let request = self.build_request(call)?;
        self.transport.execute(&request)
    }

    /// Execute the call and parse the response body as JSON.
    pub fn send(&self, call: &ApiCall) -> Result<(HttpResponse, Value), ProbeError> {
        let response = self.dispatch(call)?;
        let body = parse_body(&response.body)?;
        Ok((response, body))
    }

    /// Execute the call and check the envelope's `error_code` (or -1 when
    /// absent) against `expected`. Prints a separator, the status and the raw
    /// body. Every failure to get a decodable envelope counts as a mismatch.
    pub fn execute_and_compare(&self, call: &ApiCall, expected: i64) -> bool {
        println!("{SEPARATOR}");
        match self.compare(call, expected) {
            Ok(matched) => matched,
            Err(ProbeError::UnsupportedMethod(method)) => {
                println!("[ERROR] Unsupported HTTP method: {method}");
                false
            }
            Err(err) => {
                tracing::debug!(path = call.path(), error = %err, "probe call failed");
                println!("[ERROR] Request failed: {err}");
                false
            }
        }
    }

    fn compare(&self, call: &ApiCall, expected: i64) -> Result<bool, ProbeError> {
        let response = self.dispatch(call)?;
        println!("Status : {}\nResponse : {}", response.status, response.body);
        let body = parse_body(&response.body)?;
        let envelope = Envelope::from_value(&body)?;
        Ok(envelope.error_code == expected)
    }

    /// Execute the call and return its parsed JSON body, including bodies
    /// reporting a nonzero `error_code`. `None` on any failure. Prints nothing.
    pub fn execute_and_extract(&self, call: &ApiCall) -> Option<Value> {
        match self.send(call) {
            Ok((_, body)) => Some(body),
            Err(err) => {
                tracing::debug!(path = call.path(), error = %err, "extract failed");
                None
            }
        }
    }

    /// `execute_and_compare` followed by a `[PASSED]` / `[FAIL]` line tagged
    /// with the call's description.
    pub fn report_outcome(&self, call: &ApiCall, expected: i64) -> Outcome {
        let outcome = Outcome::new(self.execute_and_compare(call, expected), call.describe());
        println!("{outcome}\n");
        outcome
    }
}
