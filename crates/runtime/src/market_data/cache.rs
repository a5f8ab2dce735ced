use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use core_sim::PricePoint;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{DataUnavailable, PriceProvider, PriceRequest};

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    points: Vec<PricePoint>,
}

/// Memoizes successful responses of `inner` per request for `ttl`.
///
/// Failures are never cached. Expired entries are dropped on every miss, so
/// the map only holds requests seen within the last `ttl`. Concurrent misses
/// for the same request are serialized behind the cache lock, so the upstream
/// is asked once.
#[derive(Debug)]
pub struct CachedPriceProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<PriceRequest, CacheEntry>>,
}

impl<P> CachedPriceProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<P: PriceProvider> PriceProvider for CachedPriceProvider<P> {
    async fn monthly_closes(
        &self,
        request: &PriceRequest,
    ) -> Result<Vec<PricePoint>, DataUnavailable> {
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get(request) {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!(symbol = %request.symbol, "serving monthly closes from cache");
                return Ok(entry.points.clone());
            }
        }

        let points = self.inner.monthly_closes(request).await?;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        entries.insert(
            request.clone(),
            CacheEntry {
                fetched_at: Instant::now(),
                points: points.clone(),
            },
        );
        Ok(points)
    }
}
