//! Icon cache error types.
//!
//! Nothing here is fatal to the host application. Download and decode
//! failures degrade to a retry cooldown, disk failures degrade the cache to
//! memory-only for that key. The worst observable effect is a placeholder
//! icon persisting in the UI.

use thiserror::Error;

/// Result type for icon cache operations.
pub type IconResult<T> = std::result::Result<T, IconError>;

/// Errors that can occur while resolving an icon.
#[derive(Debug, Clone, Error)]
pub enum IconError {
    /// Download failed with the given reason (status, empty body, transport).
    #[error("download failed: {0}")]
    DownloadFailed(String),

    /// Payload bytes could not be decoded as an image.
    #[error("invalid image: {0}")]
    DecodeFailed(String),

    /// Disk cache read failed; treated as a cache miss.
    #[error("disk read failed: {0}")]
    DiskReadFailed(String),

    /// Disk cache write failed; the entry stays memory-only.
    #[error("disk write failed: {0}")]
    DiskWriteFailed(String),

    /// Cache construction failed (directory creation, HTTP client build).
    #[error("setup failed: {0}")]
    Setup(String),
}
