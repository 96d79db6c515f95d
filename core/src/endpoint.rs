//! Joining relative endpoint paths onto the fixed `/api/` prefix.

use url::Url;

use crate::error::ProbeError;

/// Origin used when nothing else is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// The `<origin>/api/` prefix every probe call is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    prefix: Url,
}

impl ApiBase {
    /// Build the prefix from an origin such as `http://localhost:3000`. Any
    /// path, query or fragment on the origin is replaced by `/api/`.
    pub fn new(origin: &str) -> Result<Self, ProbeError> {
        let mut prefix = Url::parse(origin)?;
        if prefix.cannot_be_a_base() || prefix.host_str().is_none() {
            return Err(ProbeError::InvalidUrl(format!("{origin} is not an http origin")));
        }
        prefix.set_path("/api/");
        prefix.set_query(None);
        prefix.set_fragment(None);
        Ok(Self { prefix })
    }

    pub fn as_str(&self) -> &str {
        self.prefix.as_str()
    }

    /// Resolve `relative` (for example `protected/user-info-of?email=a@b.com`)
    /// under the prefix. Leading slashes are ignored so exactly one slash
    /// separates prefix and path. Paths that would escape the prefix are
    /// rejected.
    pub fn endpoint(&self, relative: &str) -> Result<Url, ProbeError> {
        // "./" keeps a colon in the first segment from reading as a scheme.
        let joined = self
            .prefix
            .join(&format!("./{}", relative.trim_start_matches('/')))?;
        if !joined.as_str().starts_with(self.prefix.as_str()) {
            return Err(ProbeError::InvalidUrl(format!(
                "{relative} escapes {}",
                self.prefix
            )));
        }
        Ok(joined)
    }

    /// Like `endpoint`, then append form-encoded query pairs.
    pub fn endpoint_with_query(&self, relative: &str, pairs: &[(&str, &str)]) -> Result<Url, ProbeError> {
        let mut url = self.endpoint(relative)?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}
