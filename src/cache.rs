//! Process-wide query cache keyed by topic plus discriminator parameters.
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::graph::Topic;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub topic: Topic,
    pub params: BTreeMap<String, String>,
}

impl CacheKey {
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            params: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    /// Adds the parameter only when a value is present.
    pub fn with_opt<T: ToString>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic.as_str())?;
        if self.params.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

type Pending = Shared<BoxFuture<'static, Option<Value>>>;

struct Entry {
    value: Value,
    stale: bool,
}

/// A load in progress, tagged with the topic generation it started under.
struct InFlight {
    id: u64,
    generation: u64,
    pending: Pending,
}

#[derive(Default)]
struct State {
    entries: HashMap<CacheKey, Entry>,
    in_flight: HashMap<CacheKey, InFlight>,
    generations: HashMap<Topic, u64>,
    next_load: u64,
}

impl State {
    fn generation(&self, topic: Topic) -> u64 {
        self.generations.get(&topic).copied().unwrap_or(0)
    }

    /// Record the outcome of load `id`, started under `started_at`.
    fn settle(&mut self, key: CacheKey, id: u64, started_at: u64, result: &Option<Value>) {
        if matches!(self.in_flight.get(&key), Some(f) if f.id == id) {
            self.in_flight.remove(&key);
        }
        let Some(value) = result else {
            return;
        };
        // Invalidated while loading: keep the data but refetch next time.
        let stale = self.generation(key.topic) != started_at;
        if stale && matches!(self.entries.get(&key), Some(e) if !e.stale) {
            return;
        }
        self.entries.insert(
            key,
            Entry {
                value: value.clone(),
                stale,
            },
        );
    }
}

/// Shared cache of decoded read results. Clones share the same storage.
#[derive(Clone, Default)]
pub struct QueryCache {
    state: Arc<Mutex<State>>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("QueryCache")
            .field("entries", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the fresh cached value for `key`, or run `load` to obtain it.
    ///
    /// Concurrent callers for the same key await a single load, as long as
    /// the topic has not been invalidated since that load started. A load
    /// that yields `None` leaves nothing behind, so the next call retries.
    /// The outcome is recorded by whichever caller drives the load to
    /// completion, so dropping the first caller does not strand the key.
    pub async fn fetch<F>(&self, key: CacheKey, load: F) -> Option<Value>
    where
        F: Future<Output = Option<Value>> + Send + 'static,
    {
        let pending = {
            let mut state = self.state.lock();
            if let Some(entry) = state.entries.get(&key) {
                if !entry.stale {
                    debug!(%key, "cache hit");
                    return Some(entry.value.clone());
                }
            }
            let generation = state.generation(key.topic);
            let joinable = state
                .in_flight
                .get(&key)
                .filter(|flight| flight.generation == generation)
                .map(|flight| flight.pending.clone());
            if let Some(pending) = joinable {
                debug!(%key, "joining in-flight load");
                pending
            } else {
                debug!(%key, "cache miss");
                state.next_load += 1;
                let id = state.next_load;
                let shared = self.state.clone();
                let settle_key = key.clone();
                let pending = async move {
                    let result = load.await;
                    shared.lock().settle(settle_key, id, generation, &result);
                    result
                }
                .boxed()
                .shared();
                state.in_flight.insert(
                    key,
                    InFlight {
                        id,
                        generation,
                        pending: pending.clone(),
                    },
                );
                pending
            }
        };
        pending.await
    }

    /// Mark every cached variant of each topic stale.
    pub fn invalidate(&self, topics: &[Topic]) {
        let mut state = self.state.lock();
        for topic in topics {
            *state.generations.entry(*topic).or_insert(0) += 1;
        }
        let mut marked = 0usize;
        for (key, entry) in state.entries.iter_mut() {
            if topics.contains(&key.topic) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        debug!(?topics, marked, "invalidated topics");
    }

    /// Cached value for `key`, fresh or stale.
    pub fn peek(&self, key: &CacheKey) -> Option<Value> {
        self.state.lock().entries.get(key).map(|e| e.value.clone())
    }

    pub fn is_stale(&self, key: &CacheKey) -> Option<bool> {
        self.state.lock().entries.get(key).map(|e| e.stale)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_load(
        counter: &Arc<AtomicUsize>,
        value: Option<Value>,
    ) -> impl Future<Output = Option<Value>> + Send + 'static {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            value
        }
    }

    #[test]
    fn key_display_is_ordered() {
        let key = CacheKey::new(Topic::Transactions)
            .with("page", 2)
            .with("account", 7)
            .with_opt::<i64>("rule_id", None);
        assert_eq!(key.to_string(), "transactions{account=7,page=2}");
        assert_eq!(CacheKey::new(Topic::Reminders).to_string(), "reminders");
    }

    #[tokio::test]
    async fn second_fetch_is_a_hit() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::new(Topic::Banks);

        let first = cache
            .fetch(key.clone(), counting_load(&calls, Some(json!([1]))))
            .await;
        let second = cache
            .fetch(key.clone(), counting_load(&calls, Some(json!([2]))))
            .await;

        assert_eq!(first, Some(json!([1])));
        assert_eq!(second, Some(json!([1])));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::new(Topic::Notes);

        assert_eq!(cache.fetch(key.clone(), counting_load(&calls, None)).await, None);
        assert!(cache.peek(&key).is_none());
        let again = cache
            .fetch(key.clone(), counting_load(&calls, Some(json!("ok"))))
            .await;
        assert_eq!(again, Some(json!("ok")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_marks_every_variant() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let all = CacheKey::new(Topic::Accounts).with("type", "all");
        let checking = CacheKey::new(Topic::Accounts).with("type", "2");
        let notes = CacheKey::new(Topic::Notes);
        for key in [&all, &checking, &notes] {
            cache
                .fetch(key.clone(), counting_load(&calls, Some(json!(key.to_string()))))
                .await;
        }

        cache.invalidate(&[Topic::Accounts]);

        assert_eq!(cache.is_stale(&all), Some(true));
        assert_eq!(cache.is_stale(&checking), Some(true));
        assert_eq!(cache.is_stale(&notes), Some(false));

        let refreshed = cache
            .fetch(all.clone(), counting_load(&calls, Some(json!("new"))))
            .await;
        assert_eq!(refreshed, Some(json!("new")));
        assert_eq!(cache.is_stale(&all), Some(false));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_load() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::new(Topic::Payees);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let slow = {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let _ = rx.await;
                Some(json!("payees"))
            }
        };
        let first = cache.fetch(key.clone(), slow);
        let second = cache.fetch(key.clone(), counting_load(&calls, Some(json!("other"))));
        let release = async move {
            tokio::task::yield_now().await;
            let _ = tx.send(());
        };

        let (a, b, ()) = tokio::join!(first, second, release);
        assert_eq!(a, Some(json!("payees")));
        assert_eq!(b, Some(json!("payees")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_overtaken_by_invalidation_lands_stale() {
        let cache = QueryCache::new();
        let key = CacheKey::new(Topic::Transactions);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let load = async move {
            let _ = rx.await;
            Some(json!("old"))
        };
        let invalidate = {
            let cache = cache.clone();
            async move {
                tokio::task::yield_now().await;
                cache.invalidate(&[Topic::Transactions]);
                let _ = tx.send(());
            }
        };
        let (value, ()) = tokio::join!(cache.fetch(key.clone(), load), invalidate);

        assert_eq!(value, Some(json!("old")));
        assert_eq!(cache.is_stale(&key), Some(true));
    }

    #[tokio::test]
    async fn read_after_invalidation_does_not_join_older_load() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::new(Topic::Accounts);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let old = async move {
            let _ = rx.await;
            Some(json!("pre-write"))
        };
        let after_write = async {
            tokio::task::yield_now().await;
            cache.invalidate(&[Topic::Accounts]);
            let value = cache
                .fetch(key.clone(), counting_load(&calls, Some(json!("post-write"))))
                .await;
            let _ = tx.send(());
            value
        };
        let (before, after) = tokio::join!(cache.fetch(key.clone(), old), after_write);

        assert_eq!(before, Some(json!("pre-write")));
        assert_eq!(after, Some(json!("post-write")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // The older load landed last but must not clobber the fresh entry.
        assert_eq!(cache.peek(&key), Some(json!("post-write")));
        assert_eq!(cache.is_stale(&key), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_reader_does_not_strand_the_key() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::new(Topic::Banks);

        let slow = {
            let calls = calls.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                calls.fetch_add(1, Ordering::SeqCst);
                Some(json!("v1"))
            }
        };
        let timed_out =
            tokio::time::timeout(Duration::from_millis(5), cache.fetch(key.clone(), slow)).await;
        assert!(timed_out.is_err());

        // The next reader finishes the abandoned load and records it.
        let resumed = cache
            .fetch(key.clone(), counting_load(&calls, Some(json!("unused"))))
            .await;
        assert_eq!(resumed, Some(json!("v1")));
        assert_eq!(cache.is_stale(&key), Some(false));

        for round in 2..=3 {
            cache.invalidate(&[Topic::Banks]);
            let fresh = cache
                .fetch(key.clone(), counting_load(&calls, Some(json!(round))))
                .await;
            assert_eq!(fresh, Some(json!(round)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
