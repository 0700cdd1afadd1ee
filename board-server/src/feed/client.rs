//! Staff feed HTTP client.
//!
//! Fetches the departure board and the reason-code reference feed. Each
//! departures fetch mints a strictly-increasing snapshot version, so a
//! slow response that lands after a newer one can be detected and
//! rejected at the ingestion boundary.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use reqwest::header::HeaderValue;

use super::error::FeedError;

/// Default base URL for the staff arrival/departure board endpoint.
/// The station code and a timestamp are appended per request.
const DEFAULT_BOARD_URL: &str = "https://api1.raildata.org.uk/1010-live-arrival-and-departure-boards---staff-version1_0/LDBSVWS/api/20220120/GetArrDepBoardWithDetails";

/// Default URL for the reason-code reference feed.
const DEFAULT_REASON_URL: &str = "https://api1.raildata.org.uk/1010-reference-data1_0/LDBSVWS/api/ref/20211101/GetReasonCodeList";

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// API key for the staff departure board feed.
    pub board_api_key: String,
    /// API key for the reason-code reference feed.
    pub reason_api_key: String,
    /// Base URL for the departure board endpoint.
    pub board_url: String,
    /// URL for the reason-code feed.
    pub reason_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a config with the given API keys and default endpoints.
    pub fn new(board_api_key: impl Into<String>, reason_api_key: impl Into<String>) -> Self {
        Self {
            board_api_key: board_api_key.into(),
            reason_api_key: reason_api_key.into(),
            board_url: DEFAULT_BOARD_URL.to_string(),
            reason_url: DEFAULT_REASON_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom board endpoint (for testing).
    pub fn with_board_url(mut self, url: impl Into<String>) -> Self {
        self.board_url = url.into();
        self
    }

    /// Set a custom reason-code endpoint (for testing).
    pub fn with_reason_url(mut self, url: impl Into<String>) -> Self {
        self.reason_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// A fetched departures snapshot: the raw body plus the version minted
/// for it. Handed to [`crate::board::DepartureBoard::update`] whole.
#[derive(Debug, Clone)]
pub struct FetchedSnapshot {
    pub body: String,
    pub version: u64,
}

/// HTTP client for the staff feeds.
#[derive(Debug)]
pub struct FeedClient {
    http: reqwest::Client,
    board_api_key: HeaderValue,
    reason_api_key: HeaderValue,
    board_url: String,
    reason_url: String,
    version: AtomicU64,
}

impl FeedClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let board_api_key =
            HeaderValue::from_str(&config.board_api_key).map_err(|_| FeedError::InvalidApiKey)?;
        let reason_api_key =
            HeaderValue::from_str(&config.reason_api_key).map_err(|_| FeedError::InvalidApiKey)?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            board_api_key,
            reason_api_key,
            board_url: config.board_url,
            reason_url: config.reason_url,
            version: AtomicU64::new(0),
        })
    }

    /// Fetch the departure board for a station, minting the next snapshot
    /// version. The body is returned raw; parsing happens at ingestion so
    /// a malformed payload cannot disturb published state here.
    pub async fn fetch_departures(&self, station_code: &str) -> Result<FetchedSnapshot, FeedError> {
        let timestamp = Local::now().format("%Y%m%dT%H%M%S");
        let url = format!("{}/{station_code}/{timestamp}", self.board_url);

        tracing::debug!(%url, "fetching departures");

        let response = self
            .http
            .get(&url)
            .header("x-apikey", self.board_api_key.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;

        tracing::debug!(version, bytes = body.len(), "departures fetched");

        Ok(FetchedSnapshot { body, version })
    }

    /// Fetch the reason-code reference feed.
    pub async fn fetch_reason_codes(&self) -> Result<String, FeedError> {
        tracing::debug!(url = %self.reason_url, "fetching reason codes");

        let response = self
            .http
            .get(&self.reason_url)
            .header("x-apikey", self.reason_api_key.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Api {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// The most recently minted snapshot version.
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = FeedConfig::new("board-key", "reason-key");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.board_url.contains("GetArrDepBoardWithDetails"));
        assert!(config.reason_url.contains("GetReasonCodeList"));
    }

    #[test]
    fn config_builders() {
        let config = FeedConfig::new("a", "b")
            .with_board_url("http://localhost:9000/board")
            .with_reason_url("http://localhost:9000/reasons")
            .with_timeout(5);
        assert_eq!(config.board_url, "http://localhost:9000/board");
        assert_eq!(config.reason_url, "http://localhost:9000/reasons");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn version_starts_at_zero() {
        let client = FeedClient::new(FeedConfig::new("a", "b")).unwrap();
        assert_eq!(client.current_version(), 0);
    }

    #[test]
    fn invalid_api_key_rejected() {
        let config = FeedConfig::new("bad\nkey", "ok");
        assert!(matches!(
            FeedClient::new(config),
            Err(FeedError::InvalidApiKey)
        ));
    }
}
