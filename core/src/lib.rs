//! Blocking probe client for the webinar API.
//!
//! # Overview
//! Describes one HTTP call as an `ApiCall`, executes it against
//! `<origin>/api/<path>` and judges the answer by the `error_code` field of the
//! JSON envelope every endpoint returns.
//!
//! # Design
//! - `ApiClient` holds only the API prefix and a `Transport`; no state is
//!   shared between calls except what the caller threads through (a token).
//! - Request building is pure (`build_request`), so shaping rules can be
//!   checked without a socket.
//! - Compare/extract/report never propagate errors: every failure becomes a
//!   `false` or `None` so suites run to completion.
//! - The blocking `ureq` transport applies one global timeout per request.

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod http;
pub mod report;
pub mod suite;

pub use auth::{login, try_login, BearerToken};
pub use catalog::{run_suites, SuiteKind};
pub use client::{ApiCall, ApiClient};
pub use config::ProbeConfig;
pub use endpoint::{ApiBase, DEFAULT_ORIGIN};
pub use envelope::{Envelope, LoginRequest, MISSING_ERROR_CODE};
pub use error::ProbeError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use report::{Outcome, SuiteReport};
pub use suite::{Case, Suite};
