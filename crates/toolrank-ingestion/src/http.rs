//! HTTP client with retry, exponential backoff and a per-request timeout.
//!
//! Only idempotent GETs go through here. Throttling and transient server
//! errors (403, 429, 5xx gateway family) and transport failures are retried;
//! any other non-success status is returned to the caller immediately.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use toolrank_common::{Result, ToolrankError};
use tracing::{debug, warn};
use url::Url;

/// Statuses that are retried.
pub const RETRY_STATUSES: [u16; 6] = [403, 429, 500, 502, 503, 504];

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Sent on every request; Wikimedia rejects anonymous clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Sleep before retry n is `backoff_factor * 2^(n-1)` seconds
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_user_agent() -> String {
    format!("toolrank/{} (popularity tracker)", env!("CARGO_PKG_VERSION"))
}
fn default_timeout_secs() -> u64 { 30 }
fn default_max_retries() -> u32 { 5 }
fn default_backoff_factor() -> f64 { 1.5 }

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

impl HttpSettings {
    /// Delay before the `retry`-th retry (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        if retry == 0 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let secs = self.backoff_factor * 2f64.powi(retry as i32 - 1);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRY_STATUSES.contains(&status.as_u16())
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// GET-only client shared by the remote signal sources.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    settings: HttpSettings,
}

impl FetchClient {
    pub fn new(settings: HttpSettings) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ToolrankError::Source(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    /// GET `url` and decode the JSON body, retrying per the settings.
    pub async fn get_json(&self, url: &Url) -> Result<serde_json::Value> {
        let max_retries = self.settings.max_retries;
        let mut last_err = String::new();

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = self.settings.backoff_delay(attempt);
                debug!(%url, attempt, max_retries, ?delay, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url.clone()).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.json::<serde_json::Value>().await?);
                    }
                    if !is_retryable_status(status) {
                        return Err(ToolrankError::Source(format!("HTTP {status} from {url}")));
                    }
                    warn!(%url, %status, attempt, "Retryable status");
                    last_err = format!("HTTP {status}");
                }
                Err(e) if is_retryable_error(&e) => {
                    warn!(%url, error = %e, attempt, "Request failed");
                    last_err = e.to_string();
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ToolrankError::Source(format!(
            "all {max_retries} retries exhausted for {url}: {last_err}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let s = HttpSettings::default();
        assert_eq!(s.timeout_secs, 30);
        assert_eq!(s.max_retries, 5);
        assert!(s.user_agent.starts_with("toolrank/"));
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let s = HttpSettings::default();
        assert_eq!(s.backoff_delay(0), Duration::ZERO);
        assert_eq!(s.backoff_delay(1), Duration::from_millis(1500));
        assert_eq!(s.backoff_delay(2), Duration::from_secs(3));
        assert_eq!(s.backoff_delay(3), Duration::from_secs(6));
        assert_eq!(s.backoff_delay(30), MAX_BACKOFF);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::FORBIDDEN));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let s: HttpSettings = serde_json::from_str(r#"{"user_agent": "me@example.com"}"#).unwrap();
        assert_eq!(s.user_agent, "me@example.com");
        assert_eq!(s.backoff_factor, 1.5);
    }
}
