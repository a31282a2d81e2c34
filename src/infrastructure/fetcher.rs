//! HTTP fetcher for CDN icon payloads.

use bytes::Bytes;

use crate::domain::errors::{IconError, IconResult};
use crate::domain::ports::{FetchFailure, IconFetcher};

/// User-Agent sent with every CDN request.
pub const USER_AGENT: &str = concat!("cordicons/", env!("CARGO_PKG_VERSION"));

/// [`IconFetcher`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct CdnFetcher {
    client: reqwest::Client,
}

impl CdnFetcher {
    /// Builds a fetcher with the given per-request timeout.
    ///
    /// # Errors
    /// Returns [`IconError::Setup`] if the HTTP client cannot be built.
    pub fn new(timeout: std::time::Duration) -> IconResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| IconError::Setup(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl IconFetcher for CdnFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(classify_transport)?;
        if bytes.is_empty() {
            return Err(FetchFailure::EmptyBody);
        }
        Ok(bytes)
    }
}

/// Maps a transport error to its failure category.
fn classify_transport(error: reqwest::Error) -> FetchFailure {
    let category = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect error"
    } else if error.is_body() || error.is_decode() {
        "body error"
    } else {
        "request error"
    };
    FetchFailure::Transport(category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("cordicons/"));
    }

    #[test]
    fn test_fetcher_builds() {
        assert!(CdnFetcher::new(std::time::Duration::from_secs(8)).is_ok());
    }

    #[test]
    fn test_failure_reasons() {
        assert_eq!(FetchFailure::Status(404).to_string(), "HTTP 404");
        assert_eq!(FetchFailure::EmptyBody.to_string(), "empty response body");
        assert_eq!(
            FetchFailure::Transport("timeout".into()).to_string(),
            "timeout"
        );
    }
}
