//! Top-stories fetch orchestration.
//!
//! [`TopStories::fetch`] turns the upstream ranking into a page of at most
//! `requested` story links:
//!
//! ```text
//! top_ids ─► window (requested × over_fetch) ─► per id:
//!     cache hit  ──────────────────────────────┐
//!     cache miss ─► task: item() ─► enrich ─► filter ─► channel
//!                                              │
//!              collector: bound check ─► append + cache insert
//!                                              │
//!                          join ─► sort by id ─► StoryPage
//! ```
//!
//! Resolution tasks never touch the result list.  They send what they
//! resolved to the orchestrating task, which is the only writer of the page
//! and therefore performs the bound check and the append as one step.  The
//! shared [`StoryCache`] is the only state visible across requests.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use crate::cache::StoryCache;
use crate::error::FetchError;
use crate::source::{DisplayItem, ItemId, ItemResolver};

/// Default number of stories on a page.
pub const DEFAULT_NUM_STORIES: usize = 30;

/// Default candidate inflation, covering items that get filtered out.
pub const DEFAULT_OVER_FETCH: f64 = 1.25;

/// Knobs for a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Multiplier applied to the requested count to size the candidate
    /// window.  Must be at least `1.0`.
    pub over_fetch: f64,
    /// Upper bound on item resolutions running at the same time.
    pub max_in_flight: usize,
    /// Budget for one `item()` call; exceeding it counts as a failure of
    /// that item.
    pub item_timeout: Duration,
    /// Budget for the whole request.  When it runs out, whatever has
    /// arrived is returned and the remaining tasks are aborted.
    pub request_deadline: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            over_fetch: DEFAULT_OVER_FETCH,
            max_in_flight: 32,
            item_timeout: Duration::from_secs(5),
            request_deadline: Duration::from_secs(15),
        }
    }
}

impl FetchConfig {
    pub fn validate(&self) -> Result<(), FetchError> {
        if !self.over_fetch.is_finite() || self.over_fetch < 1.0 {
            return Err(FetchError::InvalidConfig(format!(
                "over-fetch factor must be >= 1.0, got {}",
                self.over_fetch
            )));
        }
        if self.max_in_flight == 0 {
            return Err(FetchError::InvalidConfig(
                "max in-flight resolutions must be at least 1".into(),
            ));
        }
        if self.item_timeout.is_zero() || self.request_deadline.is_zero() {
            return Err(FetchError::InvalidConfig("timeouts must be non-zero".into()));
        }
        Ok(())
    }

    /// Candidate window for `requested` stories out of `available` ids.
    ///
    /// `floor(requested × over_fetch)`, clamped to what upstream returned.
    pub fn window(&self, requested: usize, available: usize) -> usize {
        let wanted = (requested as f64 * self.over_fetch).floor() as usize;
        wanted.min(available)
    }
}

/// Per-request counters, for logging and the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Ids considered after windowing.
    pub candidates: usize,
    pub cache_hits: usize,
    /// Items fetched from upstream, eligible or not.
    pub resolved: usize,
    /// Items whose `item()` call failed or timed out.
    pub failed: usize,
    pub ineligible: usize,
    /// Eligible items discarded because the page was already full.
    pub dropped: usize,
}

/// The result of one fetch.
#[derive(Debug, Clone)]
pub struct StoryPage {
    /// At most `requested` stories, distinct, ascending by id.
    pub stories: Vec<DisplayItem>,
    /// Wall-clock time spent producing the page.
    pub elapsed: Duration,
    pub fetched_at: DateTime<Utc>,
    pub stats: FetchStats,
}

/// What a resolution task reports back.
enum Outcome {
    Eligible(DisplayItem),
    Ineligible(ItemId),
    Failed(ItemId),
}

/// Fetches pages of top stories through a shared cache.
pub struct TopStories {
    resolver: Arc<dyn ItemResolver>,
    cache: StoryCache,
    config: FetchConfig,
}

impl TopStories {
    pub fn new(resolver: Arc<dyn ItemResolver>, cache: StoryCache, config: FetchConfig) -> Self {
        Self {
            resolver,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &StoryCache {
        &self.cache
    }

    pub fn source_name(&self) -> &str {
        self.resolver.name()
    }

    /// Produce a page of at most `requested` eligible stories.
    ///
    /// Fails only when the ranked id list cannot be loaded (or the settings
    /// are invalid).  Items that fail, time out, or are not story links just
    /// make the page shorter.
    pub async fn fetch(&self, requested: usize) -> Result<StoryPage, FetchError> {
        self.config.validate()?;
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.config.request_deadline;

        let ids = self.resolver.top_ids().await.map_err(|e| {
            warn!(source = self.resolver.name(), error = %e, "top id list failed");
            FetchError::TopIds(e)
        })?;
        let window = self.config.window(requested, ids.len());
        debug!(available = ids.len(), window, requested, "loaded top ids");

        let mut stats = FetchStats::default();
        let mut stories: Vec<DisplayItem> = Vec::with_capacity(requested.min(window));
        let mut seen = HashSet::with_capacity(window);

        // Every task sends exactly one outcome, so a channel sized to the
        // window never blocks a sender.
        let (tx, mut rx) = mpsc::channel(window.max(1));
        let permits = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut tasks = JoinSet::new();
        let mut misses = Vec::new();

        for &id in &ids[..window] {
            if !seen.insert(id) {
                continue;
            }
            stats.candidates += 1;

            if let Some(item) = self.cache.lookup(id) {
                trace!(id, "cache hit");
                stats.cache_hits += 1;
                if stories.len() < requested {
                    stories.push(item);
                } else {
                    stats.dropped += 1;
                }
                continue;
            }

            trace!(id, "cache miss");
            misses.push(id);
        }

        if stories.len() >= requested {
            // Hits filled the page; nothing a miss resolves could be kept.
            stats.dropped += misses.len();
            misses.clear();
        }
        for id in misses {
            tasks.spawn(resolve(
                Arc::clone(&self.resolver),
                id,
                Arc::clone(&permits),
                self.config.item_timeout,
                tx.clone(),
            ));
        }
        // The channel closes once the last task has reported.
        drop(tx);

        loop {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(Outcome::Eligible(item))) => {
                    stats.resolved += 1;
                    if stories.len() < requested {
                        self.cache.insert(item.clone());
                        stories.push(item);
                    } else {
                        trace!(id = item.id(), "page full, dropping");
                        stats.dropped += 1;
                    }
                }
                Ok(Some(Outcome::Ineligible(id))) => {
                    trace!(id, "not a story link");
                    stats.resolved += 1;
                    stats.ineligible += 1;
                }
                Ok(Some(Outcome::Failed(id))) => {
                    trace!(id, "contributes nothing");
                    stats.failed += 1;
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        deadline_ms = self.config.request_deadline.as_millis() as u64,
                        outstanding = tasks.len(),
                        "request deadline reached, returning partial page"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    warn!(error = %e, "resolution task panicked");
                }
            }
        }

        stories.sort();
        let elapsed = start.elapsed();
        info!(
            stories = stories.len(),
            requested,
            candidates = stats.candidates,
            resolved = stats.resolved,
            cache_hits = stats.cache_hits,
            failed = stats.failed,
            ineligible = stats.ineligible,
            dropped = stats.dropped,
            elapsed_ms = elapsed.as_millis() as u64,
            "fetched top stories"
        );

        Ok(StoryPage {
            stories,
            elapsed,
            fetched_at: Utc::now(),
            stats,
        })
    }
}

/// Resolve, enrich and classify one id, then report to the collector.
async fn resolve(
    resolver: Arc<dyn ItemResolver>,
    id: ItemId,
    permits: Arc<Semaphore>,
    item_timeout: Duration,
    tx: mpsc::Sender<Outcome>,
) {
    // The semaphore is never closed.
    let Ok(_permit) = permits.acquire_owned().await else {
        return;
    };

    let outcome = match tokio::time::timeout(item_timeout, resolver.item(id)).await {
        Ok(Ok(raw)) if raw.id != id => {
            debug!(id, returned = raw.id, "upstream answered with another id");
            Outcome::Failed(id)
        }
        Ok(Ok(raw)) => {
            let item = DisplayItem::from_raw(raw);
            if item.is_eligible() {
                Outcome::Eligible(item)
            } else {
                Outcome::Ineligible(id)
            }
        }
        Ok(Err(e)) => {
            debug!(id, error = %e, "item failed to resolve");
            Outcome::Failed(id)
        }
        Err(_) => {
            debug!(id, timeout_ms = item_timeout.as_millis() as u64, "item timed out");
            Outcome::Failed(id)
        }
    };

    // The collector may have given up at the deadline.
    let _ = tx.send(outcome).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
