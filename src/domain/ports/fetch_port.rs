//! Port definition for downloading icon payloads.

use bytes::Bytes;

/// Ways a fetch job can fail.
///
/// The `Display` form is the failure reason recorded against the key when the
/// negative cache is armed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchFailure {
    /// Server answered with a non-success status code.
    #[error("HTTP {0}")]
    Status(u16),

    /// Server answered 2xx with an empty body.
    #[error("empty response body")]
    EmptyBody,

    /// Transport-level failure; the payload names the category
    /// (timeout, connect, request).
    #[error("{0}")]
    Transport(String),
}

/// Port for fetching raw icon bytes from a URL.
///
/// Implementations must be thread-safe: fetch jobs run on a bounded worker
/// pool, never on the cache owner's context.
#[async_trait::async_trait]
pub trait IconFetcher: Send + Sync {
    /// Downloads the payload at `url`.
    ///
    /// # Errors
    /// Returns a classified [`FetchFailure`] for non-success statuses, empty
    /// bodies, and transport errors.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchFailure>;
}
