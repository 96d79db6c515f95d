//! HTTP transport types and the blocking transport that executes them.
//!
//! # Design
//! Requests and responses are plain owned data. `ApiClient` builds an
//! `HttpRequest`, hands it to a `Transport`, and interprets the returned
//! `HttpResponse`. The production transport is a blocking `ureq` agent; tests
//! substitute a closure so no socket is needed to check request shaping.

use std::time::Duration;

use crate::error::ProbeError;

/// HTTP method for a probe call. The target API only speaks GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Parse a method name case-insensitively.
    pub fn parse(name: &str) -> Result<Self, ProbeError> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => Err(ProbeError::UnsupportedMethod(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data, with an absolute URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one `HttpRequest` and returns the response, whatever its status.
///
/// Only failures to obtain a response at all (refused connection, timeout,
/// unreadable body) are errors.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProbeError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, ProbeError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProbeError> {
        self(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// Status codes are never turned into errors: a 400 with a JSON envelope is a
/// normal answer for this API.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProbeError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "dispatching request");

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("get").unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("Post").unwrap(), HttpMethod::Post);
    }

    #[test]
    fn parse_rejects_other_methods() {
        let err = HttpMethod::parse("delete").unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedMethod(ref m) if m == "DELETE"));
    }

    #[test]
    fn closures_act_as_transports() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ProbeError> {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: req.url.clone(),
            })
        };
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost:3000/api/login".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let resp = transport.execute(&req).unwrap();
        assert_eq!(resp.body, "http://localhost:3000/api/login");
    }
}
