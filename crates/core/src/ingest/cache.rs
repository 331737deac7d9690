use crate::domain::ReturnSeries;
use crate::ingest::provider::ReturnsProvider;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    ticker: String,
    period: String,
}

#[derive(Debug, Clone)]
struct CachedSeries {
    series: ReturnSeries,
    fetched_at: Instant,
}

type Slot = Arc<tokio::sync::Mutex<Option<CachedSeries>>>;

/// Wraps a provider and remembers each `(ticker, period)` answer for `ttl`.
/// Empty answers are cached too, so a mistyped symbol is not re-requested on
/// every interaction.
pub struct CachedReturnsProvider<P> {
    inner: P,
    ttl: Duration,
    // The map lock is only held to find a key's slot. The slot lock is held
    // across the upstream call, so concurrent identical requests share one
    // fetch while other keys proceed.
    slots: tokio::sync::Mutex<HashMap<CacheKey, Slot>>,
}

impl<P: ReturnsProvider> CachedReturnsProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slots: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    fn is_fresh(&self, entry: &CachedSeries, now: Instant) -> bool {
        now.duration_since(entry.fetched_at) < self.ttl
    }

    async fn slot(&self, key: CacheKey) -> Slot {
        let mut slots = self.slots.lock().await;
        let now = Instant::now();
        // Drop idle slots that are stale or never filled; busy ones are kept.
        slots.retain(|_, slot| match slot.try_lock() {
            Ok(entry) => entry.as_ref().is_some_and(|e| self.is_fresh(e, now)),
            Err(_) => true,
        });
        slots.entry(key).or_default().clone()
    }
}

#[async_trait::async_trait]
impl<P: ReturnsProvider> ReturnsProvider for CachedReturnsProvider<P> {
    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    async fn fetch_returns(&self, ticker: &str, period: &str) -> Result<ReturnSeries> {
        let slot = self
            .slot(CacheKey {
                ticker: ticker.to_string(),
                period: period.to_string(),
            })
            .await;

        let mut entry = slot.lock().await;
        if let Some(cached) = entry.as_ref() {
            if self.is_fresh(cached, Instant::now()) {
                tracing::debug!(%ticker, period, "return series cache hit");
                return Ok(cached.series.clone());
            }
        }

        let series = self.inner.fetch_returns(ticker, period).await?;
        *entry = Some(CachedSeries {
            series: series.clone(),
            fetched_at: Instant::now(),
        });
        Ok(series)
    }
}
