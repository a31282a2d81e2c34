//! Cordicons - a two-tier icon cache for Discord CDN avatars and guild icons.
//!
//! This crate resolves small remote images (user avatars, guild icons) into
//! decoded bitmaps for a list or tree UI without blocking the caller and
//! without re-downloading the same image twice. Lookups go memory -> disk ->
//! network, downloads run on a bounded worker pool with per-key
//! de-duplication, and transient failures are suppressed by a retry cooldown.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing the caches, fetcher, and CDN resolver.
pub mod infrastructure;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "cordicons";
