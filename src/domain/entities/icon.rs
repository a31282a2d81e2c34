//! Domain types for icon identity and decoded icon bitmaps.

use crate::domain::errors::{IconError, IconResult};

/// Stable string identity of one icon's visual content.
///
/// Keys are structured as `<kind>:<identity>[:<variant>]` so that two
/// different avatar hashes for the same user never collide. Key equality
/// implies content equality as long as the hashes are content-derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconKey(String);

impl IconKey {
    /// Creates an `IconKey` from any string-like input.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a direct-message partner with an uploaded avatar.
    #[must_use]
    pub fn dm(user_id: &str, avatar_hash: &str) -> Self {
        Self(format!("dm:{user_id}:{avatar_hash}"))
    }

    /// Key for a direct-message partner falling back to a stock avatar.
    #[must_use]
    pub fn dm_default(user_id: Option<&str>, index: u64) -> Self {
        Self(format!("dm-default:{}:{index}", user_id.unwrap_or("unknown")))
    }

    /// Key for a guild with an uploaded icon.
    #[must_use]
    pub fn guild(guild_id: &str, icon_hash: &str) -> Self {
        Self(format!("guild:{guild_id}:{icon_hash}"))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key carries no identity at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for IconKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IconKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IconKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A decoded icon bitmap, normalized for display.
///
/// The pixel data is RGBA and fits within a `max_dim` by `max_dim` square
/// with the source aspect ratio preserved. Immutable once constructed, so it
/// is shared as `Arc<IconImage>` between the cache and its consumers.
#[derive(Debug, Clone)]
pub struct IconImage {
    pixels: image::RgbaImage,
}

impl IconImage {
    /// Decodes raw image bytes and resamples them to the display size.
    ///
    /// # Errors
    /// Returns [`IconError::DecodeFailed`] when the payload is not a
    /// supported image format.
    pub fn decode(bytes: &[u8], max_dim: u32) -> IconResult<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| IconError::DecodeFailed(e.to_string()))?;
        let scaled = decoded.resize(max_dim, max_dim, image::imageops::FilterType::Lanczos3);
        Ok(Self {
            pixels: scaled.into_rgba8(),
        })
    }

    /// Returns the bitmap width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Returns the bitmap height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Borrows the underlying RGBA pixel buffer.
    #[must_use]
    pub fn as_rgba(&self) -> &image::RgbaImage {
        &self.pixels
    }
}
