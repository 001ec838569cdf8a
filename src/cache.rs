//! Namespaced single-flight cache for expensive per-item AI results.
//!
//! Sentiment scores, reply drafts, and predictions are billed remote
//! computations, so a repeat interaction must reuse the stored value
//! instead of re-requesting it. Entries live in scopes keyed by owner
//! (business id); refetching the owner's source list bumps the scope
//! generation and drops its entries, so an index from the old list can
//! never alias a value onto the new one.
//!
//! Single-flight: each entry is a `tokio::sync::OnceCell`, so a second
//! caller arriving while a computation is in flight awaits the first
//! result rather than firing a duplicate request. A failed computation
//! leaves the cell empty; only an explicit re-trigger computes again.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::error::CoreError;

/// One generation of cached entries for one owner.
pub struct CacheScope<K, V> {
    generation: u64,
    entries: DashMap<K, Arc<OnceCell<V>>>,
}

impl<K, V> CacheScope<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new(generation: u64) -> Self {
        Self {
            generation,
            entries: DashMap::new(),
        }
    }

    /// Generation this scope belongs to. Bumped on every refresh of the
    /// owning list.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Look up or compute the value for `key`. At most one computation per
    /// key is ever in flight; concurrent callers share its outcome.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> Result<V, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, CoreError>>,
    {
        // Clone the cell out before awaiting: holding a dashmap guard
        // across an await point can deadlock.
        let cell = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();
        let value = cell.get_or_try_init(compute).await?;
        Ok(value.clone())
    }

    /// Already-computed value for `key`, if any. Never triggers a
    /// computation.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.entries
            .get(key)
            .and_then(|entry| entry.value().get().cloned())
    }

    /// Store a value directly, replacing any existing entry. Used by
    /// explicit regenerate actions that bypass the cached value.
    pub fn insert(&self, key: K, value: V) {
        self.entries
            .insert(key, Arc::new(OnceCell::new_with(Some(value))));
    }

    /// Number of populated entries (in-flight cells do not count).
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-owner scoped cache. Handing out `Arc<CacheScope>` means a refresh
/// never blocks in-flight users of the old generation; their writes land
/// in the orphaned scope and are invisible to everyone who looks up the
/// owner afterwards.
pub struct RequestCache<K, V> {
    scopes: DashMap<String, Arc<CacheScope<K, V>>>,
}

impl<K, V> RequestCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            scopes: DashMap::new(),
        }
    }

    /// Current scope for `owner`, created at generation 0 on first use.
    pub fn scope(&self, owner: &str) -> Arc<CacheScope<K, V>> {
        self.scopes
            .entry(owner.to_string())
            .or_insert_with(|| Arc::new(CacheScope::new(0)))
            .value()
            .clone()
    }

    /// Drop `owner`'s entries and start a fresh generation. Other owners
    /// are untouched. Returns the new scope.
    pub fn refresh(&self, owner: &str) -> Arc<CacheScope<K, V>> {
        let mut replaced = self
            .scopes
            .entry(owner.to_string())
            .or_insert_with(|| Arc::new(CacheScope::new(0)));
        let next = Arc::new(CacheScope::new(replaced.value().generation() + 1));
        *replaced.value_mut() = next.clone();
        log::debug!(
            "Cache scope refreshed for {} (generation {})",
            owner,
            next.generation()
        );
        next
    }
}

impl<K, V> Default for RequestCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
