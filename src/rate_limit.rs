use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use prometheus::Gauge;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::debug;

use crate::metrics::RATE_LIMITER_ENTRIES;

/// Source of "now" for the limiter, so tests can move time by hand.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

// Rate limit entry - tracks requests per client identifier
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

/// Outcome of a single rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed {
        /// Requests left in the current window
        remaining: u32,
    },
    Limited {
        /// Time until the current window closes
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Fixed-window counter keyed by client identifier.
///
/// Every call counts against the window, including rejected ones, so a client
/// hammering the endpoint stays blocked until the window rolls over. Windows
/// are not aligned to wall-clock minutes; each one starts at the first request
/// after the previous window expired.
pub struct RateLimiter<C: Clock = SystemClock> {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
    clock: C,
    entries_gauge: Gauge,
}

impl RateLimiter<SystemClock> {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(limit: u32, window: Duration, clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
            clock,
            entries_gauge: RATE_LIMITER_ENTRIES.clone(),
        }
    }

    /// Report tracked identifiers to `gauge` instead of the global one.
    pub fn with_entries_gauge(mut self, gauge: Gauge) -> Self {
        self.entries_gauge = gauge;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn allow(&self, client_id: &str) -> bool {
        self.check(client_id).is_allowed()
    }

    pub fn check(&self, client_id: &str) -> RateLimitResult {
        let now = self.clock.now();

        // the entry guard holds the shard lock, so concurrent hits on one key serialize here
        let mut entry = match self.entries.entry(client_id.to_string()) {
            Entry::Occupied(occupied) => occupied.into_ref(),
            Entry::Vacant(vacant) => {
                self.entries_gauge.inc();
                vacant.insert(RateLimitEntry {
                    count: 0,
                    window_start: now,
                })
            }
        };

        // window expired..? reset it
        if now.duration_since(entry.window_start) > self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count = entry.count.saturating_add(1);

        if entry.count <= self.limit {
            RateLimitResult::Allowed {
                remaining: self.limit - entry.count,
            }
        } else {
            let elapsed = now.duration_since(entry.window_start);
            RateLimitResult::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            }
        }
    }

    /// Drop every entry whose window has already expired.
    ///
    /// A dropped entry would have been reset on its next hit anyway, so this
    /// never changes a decision; it only bounds the size of the map.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) <= self.window);
        let removed = before.saturating_sub(self.entries.len());
        self.entries_gauge.set(self.entries.len() as f64);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Sweeper - purges expired windows once per window length
pub async fn sweeper<C: Clock>(limiter: Arc<RateLimiter<C>>) {
    let mut ticker = interval(limiter.window());

    debug!(window = ?limiter.window(), "Rate limiter sweeper started");

    loop {
        ticker.tick().await;

        let removed = limiter.purge_expired();
        if removed > 0 {
            debug!(removed, remaining = limiter.len(), "Purged expired rate limit entries");
        }
    }
}

pub fn spawn_sweeper<C: Clock>(limiter: Arc<RateLimiter<C>>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(sweeper(limiter))
}
