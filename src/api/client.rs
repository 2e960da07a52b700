//! HTTP client for the prediction service.
//!
//! Uses the synchronous `ureq` client. Each call is a single best-effort
//! GET: no retries, no caching, no custom headers and no request timeout,
//! so a stalled service stalls the caller.
use std::time::Duration;

use serde_json::Value;

use super::{DashboardApi, Endpoint, FetchError};
use crate::config::schema::BackendConfig;

/// Timeout for the reachability probe only. Data fetches never time out.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Perform one GET and parse the body as JSON.
///
/// A non-2xx status becomes [`FetchError::Network`], whose message is the
/// fixed string `Network response was not ok`; the body of such a response
/// is discarded even if it carries an `error` field.
pub fn fetch_json(url: &str) -> Result<Value, FetchError> {
    let resp = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::Status(status, _) => FetchError::Network { status },
        ureq::Error::Transport(t) => FetchError::Transport(t.to_string()),
    })?;

    resp.into_json::<Value>()
        .map_err(|e| FetchError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from the resolved `[backend]` section.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url)
    }

    /// Absolute URL for an endpoint.
    ///
    /// `localhost` is rewritten to `127.0.0.1`: on Windows it may resolve to
    /// `::1` first and stall when the service only binds IPv4.
    pub fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path()).replace("://localhost", "://127.0.0.1")
    }
}

impl DashboardApi for ApiClient {
    fn fetch_json(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        let url = self.url_for(endpoint);
        tracing::debug!(%url, "GET");
        fetch_json(&url)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Any HTTP response, including an error status, counts as reachable.
    /// Unlike data fetches, the probe gives up after a few seconds.
    fn is_reachable(&self) -> bool {
        let url = self.url_for(Endpoint::DatasetInfo);
        match ureq::get(&url).timeout(PROBE_TIMEOUT).call() {
            Ok(_) | Err(ureq::Error::Status(..)) => true,
            Err(ureq::Error::Transport(_)) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
