//! Probe configuration.
//!
//! ProbeConfig holds the origin of the API under test and the request timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::DEFAULT_ORIGIN;

/// Environment variable overriding the origin.
pub const ORIGIN_ENV: &str = "WEBINAR_API_ORIGIN";
/// Environment variable overriding the timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "WEBINAR_API_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Scheme, host and port of the API (default: "http://localhost:3000")
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Per-request timeout in seconds, covering connect through body read (default: 10).
    /// Zero falls back to the default.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProbeConfig {
    /// Defaults overlaid with `WEBINAR_API_ORIGIN` / `WEBINAR_API_TIMEOUT_SECS`.
    /// An unparsable or zero timeout keeps the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(origin) = std::env::var(ORIGIN_ENV) {
            if !origin.trim().is_empty() {
                config.origin = origin;
            }
        }
        if let Some(secs) = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
        {
            config.timeout_secs = secs;
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(default_timeout_secs()),
            secs => Duration::from_secs(secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.origin, "http://localhost:3000");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ProbeConfig = serde_json::from_str(r#"{"origin":"http://api.example.com"}"#).unwrap();
        assert_eq!(config.origin, "http://api.example.com");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn zero_timeout_uses_default() {
        let config = ProbeConfig {
            timeout_secs: 0,
            ..ProbeConfig::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(10));

        let config: ProbeConfig = serde_json::from_str(r#"{"timeout_secs":0}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
