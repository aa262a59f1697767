//! Query cache with request coalescing.
//!
//! Reads are keyed by [`QueryKey`]. While a fetch for a key is in flight,
//! further reads of the same key await that fetch instead of issuing their
//! own request. Completed results are kept with their fetch time and served
//! until the key's stale time elapses.

mod retry;

pub use retry::RetryPolicy;

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::debug;
use serde_json::Value;

use crate::error::ApiResult;

/// Characters are served from cache for one minute.
pub const CHARACTERS_STALE_TIME: Duration = Duration::from_secs(60);

/// Identity of a cached read: (resource kind, resource id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    CurrentUser,
    Users,
    Characters { server_id: i32 },
}

impl QueryKey {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryKey::CurrentUser => "currentUser",
            QueryKey::Users => "users",
            QueryKey::Characters { .. } => "characters",
        }
    }

    pub fn id(&self) -> Option<i32> {
        match self {
            QueryKey::Characters { server_id } => Some(*server_id),
            _ => None,
        }
    }

    /// How long a fetched value is served without refetching.
    pub fn stale_time(&self) -> Duration {
        match self {
            QueryKey::Characters { .. } => CHARACTERS_STALE_TIME,
            QueryKey::CurrentUser | QueryKey::Users => Duration::ZERO,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}/{id}", self.kind()),
            None => f.write_str(self.kind()),
        }
    }
}

type SharedFetch = Shared<BoxFuture<'static, ApiResult<Value>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    fetched_at: Instant,
}

/// Cached query results plus the table of in-flight fetches.
#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    in_flight: DashMap<QueryKey, SharedFetch>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key` regardless of staleness.
    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Cached value for `key` if younger than its stale time.
    pub fn fresh(&self, key: &QueryKey) -> Option<Value> {
        self.entries
            .get(key)
            .filter(|e| e.fetched_at.elapsed() < key.stale_time())
            .map(|e| e.value.clone())
    }

    /// Store `value` under `key` as freshly fetched.
    pub fn set(&self, key: QueryKey, value: Value) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Rewrite the value under `key` in place.
    ///
    /// `update` receives the current value (if any) and returns the new one.
    pub fn update<F>(&self, key: QueryKey, update: F)
    where
        F: FnOnce(Option<Value>) -> Value,
    {
        let current = self.get(&key);
        self.set(key, update(current));
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Return the fresh cached value for `key`, or join/start a fetch.
    ///
    /// `fetch` is only invoked when no fetch for `key` is already in flight.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> ApiResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<Value>> + Send + 'static,
    {
        if let Some(value) = self.fresh(&key) {
            debug!("query {key}: cache hit");
            return Ok(value);
        }

        let shared = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| {
                debug!("query {key}: fetching");
                fetch().boxed().shared()
            })
            .clone();

        let result = shared.clone().await;

        self.in_flight.remove_if(&key, |_, pending| pending.ptr_eq(&shared));
        if let Ok(value) = &result {
            self.set(key, value.clone());
        }
        result
    }
}
