//! Feed client error types.

/// Errors from the staff feed HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("staff API returned status {status}")]
    Api { status: u16 },

    /// API key contains characters that cannot form an HTTP header
    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeedError::Api { status: 503 };
        assert_eq!(err.to_string(), "staff API returned status 503");

        let err = FeedError::InvalidApiKey;
        assert_eq!(err.to_string(), "API key is not a valid header value");
    }
}
