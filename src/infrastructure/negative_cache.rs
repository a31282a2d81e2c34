//! Failure cooldown tracking.
//!
//! Keys that failed to resolve recently are suppressed from re-fetching
//! until their cooldown deadline passes, so a flaky CDN does not turn into a
//! retry storm. Expired entries are cleaned up lazily on lookup.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::entities::IconKey;

/// Map from key to the instant its fetch ban lifts.
#[derive(Debug, Default)]
pub struct NegativeCache {
    deadlines: HashMap<IconKey, Instant>,
}

impl NegativeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure, suppressing the key for `cooldown`.
    pub fn mark_failed(&mut self, key: IconKey, cooldown: Duration) {
        self.deadlines.insert(key, Instant::now() + cooldown);
    }

    /// Returns true while the key's cooldown deadline is in the future.
    pub fn is_cooling_down(&mut self, key: &IconKey) -> bool {
        match self.deadlines.get(key) {
            Some(deadline) if *deadline > Instant::now() => true,
            Some(_) => {
                self.deadlines.remove(key);
                false
            }
            None => false,
        }
    }

    /// Forgets a key, called when a fetch for it succeeds.
    pub fn clear(&mut self, key: &IconKey) {
        self.deadlines.remove(key);
    }

    /// Number of keys currently tracked (including not-yet-swept expired ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Returns true if no failures are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Drops every entry.
    pub fn clear_all(&mut self) {
        self.deadlines.clear();
    }
}
