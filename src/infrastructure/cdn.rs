//! Discord CDN key and URL resolution.
//!
//! Pure functions mapping a domain identity (user id + avatar hash, guild id
//! + icon hash, or a stock-avatar index) to a stable cache key and a fetch
//! URL. Key identity is load-bearing: the same identity always produces the
//! same key, and different avatar hashes for one user produce different keys.

use crate::domain::entities::IconKey;

/// Base URL of the Discord CDN.
pub const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Size parameter requested from the CDN. Larger than the display size so the
/// disk cache keeps a usable source if the display size ever grows.
pub const FETCH_SIZE: u32 = 64;

/// URL of a user's uploaded avatar.
#[must_use]
pub fn dm_avatar_url(user_id: &str, avatar_hash: &str) -> String {
    format!("{CDN_BASE}/avatars/{user_id}/{avatar_hash}.png?size={FETCH_SIZE}")
}

/// URL of a guild's uploaded icon.
#[must_use]
pub fn guild_icon_url(guild_id: &str, icon_hash: &str) -> String {
    format!("{CDN_BASE}/icons/{guild_id}/{icon_hash}.png?size={FETCH_SIZE}")
}

/// URL of one of the six stock avatars.
#[must_use]
pub fn default_avatar_url(index: u64) -> String {
    let normalized = index % 6;
    format!("{CDN_BASE}/embed/avatars/{normalized}.png?size={FETCH_SIZE}")
}

/// Stock-avatar index for a user without an uploaded avatar.
///
/// Mirrors the platform's sharding scheme: legacy discriminators (anything
/// but `"0"`/`"0000"`) shard modulo 5; migrated users shard on
/// `(id >> 22) % 6`. Snowflakes are 63-bit, so `u64` parsing is exact;
/// non-numeric input falls back to index 0 rather than failing.
#[must_use]
pub fn default_avatar_index(user_id: Option<&str>, discriminator: Option<&str>) -> u64 {
    if let Some(disc) = discriminator
        && !disc.is_empty()
        && disc != "0"
        && disc != "0000"
    {
        return disc.parse::<u64>().map_or(0, |d| d % 5);
    }
    if let Some(id) = user_id
        && !id.is_empty()
    {
        return id.parse::<u64>().map_or(0, |id| (id >> 22) % 6);
    }
    0
}

/// Resolves the key and fetch URL for a direct-message partner's icon.
///
/// Falls back to a stock avatar when the partner has no uploaded avatar, so
/// a DM row always has something fetchable.
#[must_use]
pub fn resolve_dm_icon(
    user_id: Option<&str>,
    avatar_hash: Option<&str>,
    discriminator: Option<&str>,
) -> (IconKey, String) {
    if let (Some(id), Some(hash)) = (user_id, avatar_hash)
        && !id.is_empty()
        && !hash.is_empty()
    {
        return (IconKey::dm(id, hash), dm_avatar_url(id, hash));
    }

    let index = default_avatar_index(user_id, discriminator);
    (
        IconKey::dm_default(user_id.filter(|id| !id.is_empty()), index),
        default_avatar_url(index),
    )
}

/// Resolves the key and fetch URL for a guild icon.
///
/// Returns `None` when the guild has no uploaded icon; the caller renders a
/// static placeholder instead of going through the cache.
#[must_use]
pub fn resolve_guild_icon(
    guild_id: Option<&str>,
    icon_hash: Option<&str>,
) -> Option<(IconKey, String)> {
    let (id, hash) = (guild_id?, icon_hash?);
    if id.is_empty() || hash.is_empty() {
        return None;
    }
    Some((IconKey::guild(id, hash), guild_icon_url(id, hash)))
}
