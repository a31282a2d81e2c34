//! Icon cache facade.
//!
//! Orchestrates the memory cache, disk store, negative cache, and fetch
//! scheduler behind two calls: a synchronous [`IconCache::get_icon`] lookup
//! and an idempotent [`IconCache::request_icon`] "ensure resolved" request.
//!
//! The facade is the single writer for all shared cache state. Fetch jobs
//! run on the bounded pool and never touch the stores; they hand their
//! outcome back over a channel, and the owner applies every mutation when it
//! drains that channel. Per key, at most one fetch is outstanding, and its
//! delivery happens-before any later request may schedule a new one.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::domain::entities::{IconImage, IconKey};
use crate::domain::errors::IconResult;
use crate::domain::ports::IconFetcher;

use super::config::IconCacheConfig;
use super::disk_cache::IconDiskCache;
use super::fetcher::CdnFetcher;
use super::memory_cache::{CacheStats, IconMemoryCache};
use super::negative_cache::NegativeCache;
use super::scheduler::{FetchDelivery, FetchOutcome, FetchScheduler};

/// Notification that a key resolved to a displayable icon.
///
/// Emitted at most once per successful fetch or disk hit; never emitted for
/// failures. Consumers must treat each event independently and idempotently.
#[derive(Debug, Clone)]
pub struct IconReadyEvent {
    /// The resolved key.
    pub key: IconKey,
    /// The decoded, display-sized icon.
    pub image: Arc<IconImage>,
}

/// Two-tier icon cache fronting a bounded-concurrency downloader.
///
/// Owned by one logical execution context (the UI or orchestrator task),
/// which is the only mutator of its state. That owner is expected to drain
/// completions, either [`poll_completions`](Self::poll_completions) once per
/// frame or [`process_next_completion`](Self::process_next_completion) from
/// a select loop.
pub struct IconCache {
    memory: IconMemoryCache,
    disk: IconDiskCache,
    negative: NegativeCache,
    in_flight: HashSet<IconKey>,
    scheduler: FetchScheduler,
    delivery_rx: mpsc::UnboundedReceiver<FetchDelivery>,
    event_tx: mpsc::UnboundedSender<IconReadyEvent>,
    cooldown: Duration,
    icon_size: u32,
}

impl std::fmt::Debug for IconCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconCache")
            .field("memory", &self.memory.len())
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl IconCache {
    /// Creates a cache that downloads through a shared reqwest client.
    ///
    /// Resolved icons are announced on `event_tx`.
    ///
    /// # Errors
    /// Returns [`IconError::Setup`](crate::domain::errors::IconError::Setup)
    /// if the cache directory or HTTP client cannot be created.
    pub async fn new(
        config: IconCacheConfig,
        event_tx: &mpsc::UnboundedSender<IconReadyEvent>,
    ) -> IconResult<Self> {
        let fetcher = Arc::new(CdnFetcher::new(config.fetch_timeout())?);
        Self::with_fetcher(config, event_tx, fetcher).await
    }

    /// Creates a cache with a caller-supplied fetcher.
    ///
    /// # Errors
    /// Returns [`IconError::Setup`](crate::domain::errors::IconError::Setup)
    /// if the cache directory cannot be created.
    pub async fn with_fetcher(
        config: IconCacheConfig,
        event_tx: &mpsc::UnboundedSender<IconReadyEvent>,
        fetcher: Arc<dyn IconFetcher>,
    ) -> IconResult<Self> {
        let disk = IconDiskCache::new(config.resolved_cache_dir()).await?;
        let (scheduler, delivery_rx) =
            FetchScheduler::new(fetcher, config.max_concurrent_fetches, config.icon_size);

        Ok(Self {
            memory: IconMemoryCache::new(config.memory_capacity),
            disk,
            negative: NegativeCache::new(),
            in_flight: HashSet::new(),
            scheduler,
            delivery_rx,
            event_tx: event_tx.clone(),
            cooldown: config.retry_cooldown(),
            icon_size: config.icon_size,
        })
    }

    /// Instantaneous memory-only lookup; never performs I/O.
    ///
    /// Promotes the key's recency on a hit.
    pub fn get_icon(&mut self, key: &IconKey) -> Option<Arc<IconImage>> {
        self.memory.get(key)
    }

    /// Ensures a key resolves eventually. Idempotent and cheap to repeat.
    ///
    /// Already-resolved, in-flight, and cooling-down keys are no-ops. A disk
    /// hit resolves without the network; otherwise a fetch is scheduled when
    /// a URL is available. Resolution is announced on the event channel.
    pub async fn request_icon(&mut self, key: &IconKey, url: Option<&str>) {
        if key.is_empty() {
            return;
        }
        if self.memory.contains(key) {
            return;
        }
        if self.in_flight.contains(key) {
            return;
        }
        if self.negative.is_cooling_down(key) {
            trace!(key = %key, "icon fetch suppressed by cooldown");
            return;
        }

        if let Some(bytes) = self.disk.read(key).await {
            let icon_size = self.icon_size;
            let decoded =
                tokio::task::spawn_blocking(move || IconImage::decode(&bytes, icon_size)).await;
            if let Ok(Ok(image)) = decoded {
                let image = Arc::new(image);
                self.memory.put(key.clone(), image.clone());
                self.emit(key.clone(), image);
                return;
            }
            // Unreadable payloads count as a miss; fall through to refetch.
            debug!(key = %key, "cached icon payload failed to decode");
        }

        let Some(url) = url else {
            return;
        };

        self.in_flight.insert(key.clone());
        self.scheduler.dispatch(key.clone(), url.to_string());
    }

    /// Requests a batch of keys, typically ahead of displaying a list.
    pub async fn prefetch(&mut self, items: Vec<(IconKey, Option<String>)>) {
        for (key, url) in items {
            self.request_icon(&key, url.as_deref()).await;
        }
    }

    /// Applies every already-completed fetch without waiting.
    ///
    /// Returns the number of completions processed. Suited to hosts that
    /// pump the cache once per frame or event-loop turn.
    pub fn poll_completions(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(delivery) = self.delivery_rx.try_recv() {
            self.apply_delivery(delivery);
            processed += 1;
        }
        processed
    }

    /// Waits for one fetch to complete and applies it.
    ///
    /// Returns `false` only if the delivery channel closed, which cannot
    /// happen while the cache is alive. Suited to select-loop hosts.
    pub async fn process_next_completion(&mut self) -> bool {
        match self.delivery_rx.recv().await {
            Some(delivery) => {
                self.apply_delivery(delivery);
                true
            }
            None => false,
        }
    }

    /// Number of keys currently being fetched.
    #[must_use]
    pub fn pending_fetches(&self) -> usize {
        self.in_flight.len()
    }

    /// Memory cache hit/miss statistics.
    #[must_use]
    pub fn memory_stats(&self) -> CacheStats {
        self.memory.stats()
    }

    /// Clears the memory cache, failure cooldowns, and disk store.
    ///
    /// In-flight fetches run to completion and will repopulate the caches
    /// when their deliveries are processed.
    pub async fn clear_all(&mut self) {
        self.memory.clear();
        self.negative.clear_all();
        self.disk.clear().await;
    }

    /// Owner-side application of one fetch result. The in-flight removal
    /// and the store mutations happen together, so a later `request_icon`
    /// for the key can never be silently dropped.
    fn apply_delivery(&mut self, delivery: FetchDelivery) {
        self.in_flight.remove(&delivery.key);

        match delivery.outcome {
            FetchOutcome::Fetched { image, bytes } => {
                self.memory.put(delivery.key.clone(), image.clone());
                self.persist(delivery.key.clone(), bytes);
                self.negative.clear(&delivery.key);
                self.emit(delivery.key, image);
            }
            FetchOutcome::Failed { reason } => {
                self.negative.mark_failed(delivery.key.clone(), self.cooldown);
                debug!(key = %delivery.key, reason = %reason, "icon fetch failed");
            }
        }
    }

    /// Persists raw payload bytes in the background. Disk failures must not
    /// block or fail delivery; the cache degrades to memory-only for the key.
    fn persist(&self, key: IconKey, bytes: Bytes) {
        let disk = self.disk.clone();
        tokio::spawn(async move {
            if let Err(e) = disk.write(&key, &bytes).await {
                warn!(key = %key, error = %e, "failed to persist icon to disk");
            }
        });
    }

    fn emit(&self, key: IconKey, image: Arc<IconImage>) {
        // A dropped receiver means no observers; resolution still counts.
        let _ = self.event_tx.send(IconReadyEvent { key, image });
    }
}
