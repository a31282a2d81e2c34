//! Bounded download scheduling.
//!
//! A fixed pool of permits caps concurrent downloads; excess jobs queue on
//! the semaphore instead of spawning unbounded work. Jobs never touch the
//! shared caches: each one downloads, decodes off-thread, and hands its
//! outcome to the facade over the delivery channel. In-flight bookkeeping
//! lives with the facade, which is the channel's sole consumer.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Semaphore, mpsc};
use tracing::trace;

use crate::domain::entities::{IconImage, IconKey};
use crate::domain::ports::IconFetcher;

/// Default number of concurrent downloads.
pub const DEFAULT_WORKERS: usize = 4;

/// What a fetch job produced. `bytes` keeps the raw payload so the facade
/// can persist it without re-encoding.
#[derive(Debug)]
pub(crate) enum FetchOutcome {
    Fetched { image: Arc<IconImage>, bytes: Bytes },
    Failed { reason: String },
}

/// One completed fetch, delivered to the facade.
#[derive(Debug)]
pub(crate) struct FetchDelivery {
    pub key: IconKey,
    pub outcome: FetchOutcome,
}

/// Spawns bounded fetch jobs and funnels their outcomes to one consumer.
pub struct FetchScheduler {
    fetcher: Arc<dyn IconFetcher>,
    permits: Arc<Semaphore>,
    delivery_tx: mpsc::UnboundedSender<FetchDelivery>,
    icon_size: u32,
}

impl std::fmt::Debug for FetchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchScheduler")
            .field("icon_size", &self.icon_size)
            .finish_non_exhaustive()
    }
}

impl FetchScheduler {
    /// Creates a scheduler with `workers` permits, returning the receiving
    /// end of its delivery channel.
    pub(crate) fn new(
        fetcher: Arc<dyn IconFetcher>,
        workers: usize,
        icon_size: u32,
    ) -> (Self, mpsc::UnboundedReceiver<FetchDelivery>) {
        let (delivery_tx, delivery_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            fetcher,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            delivery_tx,
            icon_size,
        };
        (scheduler, delivery_rx)
    }

    /// Enqueues a fetch job for `(key, url)` and returns immediately.
    ///
    /// The job runs to completion even if nobody cares about the result
    /// anymore; a resolved icon is cache-worthy regardless of UI state. The
    /// download timeout is the only bound on its lifetime.
    pub(crate) fn dispatch(&self, key: IconKey, url: String) {
        let fetcher = self.fetcher.clone();
        let permits = self.permits.clone();
        let delivery_tx = self.delivery_tx.clone();
        let icon_size = self.icon_size;

        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            trace!(key = %key, url = %url, "fetching icon");

            let outcome = match fetcher.fetch(&url).await {
                Ok(bytes) => decode_payload(bytes, icon_size).await,
                Err(failure) => FetchOutcome::Failed {
                    reason: failure.to_string(),
                },
            };

            // The receiver is gone only when the cache itself was dropped.
            let _ = delivery_tx.send(FetchDelivery { key, outcome });
        });
    }
}

/// Decodes and resamples a downloaded payload off the async threads.
async fn decode_payload(bytes: Bytes, icon_size: u32) -> FetchOutcome {
    let payload = bytes.clone();
    let decoded =
        tokio::task::spawn_blocking(move || IconImage::decode(&payload, icon_size)).await;

    match decoded {
        Ok(Ok(image)) => FetchOutcome::Fetched {
            image: Arc::new(image),
            bytes,
        },
        Ok(Err(_)) => FetchOutcome::Failed {
            reason: "invalid image".to_string(),
        },
        Err(e) => FetchOutcome::Failed {
            reason: format!("decode task panicked: {e}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::ports::FetchFailure;

    struct HangingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl IconFetcher for HangingFetcher {
        async fn fetch(&self, _url: &str) -> Result<Bytes, FetchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_pool_bounds_concurrent_fetches() {
        let fetcher = Arc::new(HangingFetcher {
            calls: AtomicUsize::new(0),
        });
        let (scheduler, _rx) = FetchScheduler::new(fetcher.clone(), 2, 18);

        for i in 0..3 {
            scheduler.dispatch(IconKey::new(format!("dm:{i}:aa")), "http://x".into());
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // third job queues on the semaphore
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_delivered_with_reason() {
        struct FailingFetcher;

        #[async_trait::async_trait]
        impl IconFetcher for FailingFetcher {
            async fn fetch(&self, _url: &str) -> Result<Bytes, FetchFailure> {
                Err(FetchFailure::Status(404))
            }
        }

        let (scheduler, mut rx) = FetchScheduler::new(Arc::new(FailingFetcher), 2, 18);
        scheduler.dispatch(IconKey::new("dm:1:aa"), "http://x".into());

        let delivery = rx.recv().await.unwrap();
        assert_eq!(delivery.key, IconKey::new("dm:1:aa"));
        match delivery.outcome {
            FetchOutcome::Failed { reason } => assert_eq!(reason, "HTTP 404"),
            FetchOutcome::Fetched { .. } => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_garbage_payload_is_classified_invalid_image() {
        struct GarbageFetcher;

        #[async_trait::async_trait]
        impl IconFetcher for GarbageFetcher {
            async fn fetch(&self, _url: &str) -> Result<Bytes, FetchFailure> {
                Ok(Bytes::from_static(b"not an image"))
            }
        }

        let (scheduler, mut rx) = FetchScheduler::new(Arc::new(GarbageFetcher), 2, 18);
        scheduler.dispatch(IconKey::new("dm:1:aa"), "http://x".into());

        let delivery = rx.recv().await.unwrap();
        match delivery.outcome {
            FetchOutcome::Failed { reason } => assert_eq!(reason, "invalid image"),
            FetchOutcome::Fetched { .. } => panic!("expected failure"),
        }
    }
}
