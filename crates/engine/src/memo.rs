//! Memoization cache
//!
//! `Memo` wraps a function of one key (use a tuple or `Vec` for several
//! arguments) and guarantees the function runs at most once per key over the
//! lifetime of the cache. Recursive functions receive the `Memo` itself, so
//! their sub-calls are cached as well:
//!
//! ```rust,ignore
//! let fib = Memo::recursive(|fib: &Memo<u64, u64, Infallible>, &n: &u64| {
//!     if n < 2 { Ok(n) } else { Ok(fib.call(n - 1)? + fib.call(n - 2)?) }
//! });
//! assert_eq!(fib.call(90)?, 2_880_067_194_370_816_120);
//! ```
//!
//! # Concurrency
//!
//! ```text
//!   call(k) ──► entries (RwLock) ── hit ──► clone of stored value
//!                  │ miss
//!                  ▼
//!               gate(k) (Mutex, one per in-flight key)
//!                  │ re-check entries, then compute
//!                  ▼
//!               insert into entries (on success), retire gate(k)
//! ```
//!
//! Concurrent callers for the same uncomputed key serialize on that key's
//! gate, so the function runs once and everyone else reads the stored value.
//! Different keys compute in parallel. A gate is held while the function
//! recurses into smaller keys; for a well-founded recursion the gates are
//! always taken in dependency order, so two threads can never wait on each
//! other. Re-entering a key on the thread already computing it is a cyclic
//! definition and panics rather than deadlocking.
//!
//! # Failures
//!
//! Errors are returned unchanged and nothing is stored: the next call for
//! that key computes again. The gate is retired either way, so keys that only
//! ever fail leave nothing behind. Callers already waiting on a retired gate
//! still take it one at a time and re-check before computing.

use crate::config::EngineConfig;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, trace};

/// Global counter for generating unique thread IDs
/// Starts at 1 because 0 means "gate not owned"
static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THIS_THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

fn current_thread_id() -> u64 {
    THIS_THREAD_ID.with(|&id| id)
}

/// Serializes computation of a single key
#[derive(Default)]
struct Gate {
    /// Thread currently computing the key (0 = none)
    owner: AtomicU64,
    lock: Mutex<()>,
}

/// Clears the gate owner when the computation ends, including by panic
struct OwnerGuard<'a> {
    gate: &'a Gate,
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        self.gate.owner.store(0, Ordering::Release);
    }
}

/// Drops the key's gate from the table when the computation ends, however it
/// ends. Declared before the gate lock so the lock is released first.
struct GateRelease<'a, K: Hash + Eq, V, E> {
    memo: &'a Memo<K, V, E>,
    key: &'a K,
    gate: &'a Arc<Gate>,
}

impl<K: Hash + Eq, V, E> Drop for GateRelease<'_, K, V, E> {
    fn drop(&mut self) {
        let mut gates = self
            .memo
            .inner
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // A later caller may already have installed a fresh gate
        if gates
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, self.gate))
        {
            gates.remove(self.key);
        }
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Calls answered from the cache
    pub hits: u64,
    /// Calls that ran the underlying function
    pub misses: u64,
    /// Runs of the underlying function that returned an error
    pub failures: u64,
}

type MemoFn<K, V, E> = dyn Fn(&Memo<K, V, E>, &K) -> Result<V, E> + Send + Sync;

struct MemoInner<K, V, E> {
    name: String,
    body: Box<MemoFn<K, V, E>>,
    entries: RwLock<HashMap<K, V>>,
    gates: Mutex<HashMap<K, Arc<Gate>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

/// Cloneable handle to a memoized function. Clones share one cache.
pub struct Memo<K, V, E> {
    inner: Arc<MemoInner<K, V, E>>,
}

impl<K, V, E> Clone for Memo<K, V, E> {
    fn clone(&self) -> Self {
        Memo {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Options for building a `Memo`
#[derive(Debug, Clone)]
pub struct MemoBuilder {
    name: String,
    capacity: usize,
}

impl MemoBuilder {
    pub fn new() -> Self {
        MemoBuilder {
            name: "<anonymous>".to_string(),
            capacity: 0,
        }
    }

    /// Name used in log events
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_config(self, config: &EngineConfig) -> Self {
        self.with_capacity(config.memo_initial_capacity)
    }

    /// Memoize a function that does not recurse
    pub fn build<K, V, E, F>(self, f: F) -> Memo<K, V, E>
    where
        K: Hash + Eq + Clone,
        V: Clone,
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        self.recursive(move |_: &Memo<K, V, E>, key: &K| f(key))
    }

    /// Memoize a function that recurses through the cache it is handed
    pub fn recursive<K, V, E, F>(self, f: F) -> Memo<K, V, E>
    where
        K: Hash + Eq + Clone,
        V: Clone,
        F: Fn(&Memo<K, V, E>, &K) -> Result<V, E> + Send + Sync + 'static,
    {
        Memo {
            inner: Arc::new(MemoInner {
                name: self.name,
                body: Box::new(f),
                entries: RwLock::new(HashMap::with_capacity(self.capacity)),
                gates: Mutex::new(HashMap::new()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                failures: AtomicU64::new(0),
            }),
        }
    }
}

impl Default for MemoBuilder {
    fn default() -> Self {
        MemoBuilder::new()
    }
}

impl<K, V, E> Memo<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Memoize a function that does not recurse
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        MemoBuilder::new().build(f)
    }

    /// Memoize a recursive function; recursive calls must go through the
    /// `&Memo` argument to be cached
    pub fn recursive<F>(f: F) -> Self
    where
        F: Fn(&Memo<K, V, E>, &K) -> Result<V, E> + Send + Sync + 'static,
    {
        MemoBuilder::new().recursive(f)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Return the cached value for `key`, computing it first if needed
    ///
    /// # Panics
    ///
    /// Panics if the function re-enters `key` while computing `key` on the
    /// same thread.
    pub fn call(&self, key: K) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            self.record_hit();
            return Ok(value);
        }

        let gate = self.gate_for(&key);
        let me = current_thread_id();
        if gate.owner.load(Ordering::Acquire) == me {
            panic!(
                "memo '{}': key re-entered while it is being computed (cyclic definition)",
                self.inner.name
            );
        }

        let _release = GateRelease {
            memo: self,
            key: &key,
            gate: &gate,
        };
        let _lock = gate.lock.lock().unwrap_or_else(PoisonError::into_inner);
        gate.owner.store(me, Ordering::Release);
        let _owner = OwnerGuard { gate: &gate };

        // Another caller may have stored it while we waited on the gate
        if let Some(value) = self.get(&key) {
            self.record_hit();
            return Ok(value);
        }

        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        trace!(memo = %self.inner.name, "miss, computing");

        match (self.inner.body)(self, &key) {
            Ok(value) => {
                self.inner
                    .entries
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key.clone(), value.clone());
                Ok(value)
            }
            Err(e) => {
                self.inner.failures.fetch_add(1, Ordering::Relaxed);
                debug!(memo = %self.inner.name, "computation failed, nothing cached");
                Err(e)
            }
        }
    }

    /// Cached value for `key`, without computing
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            failures: self.inner.failures.load(Ordering::Relaxed),
        }
    }

    fn record_hit(&self) {
        self.inner.hits.fetch_add(1, Ordering::Relaxed);
        trace!(memo = %self.inner.name, "hit");
    }

    fn gate_for(&self, key: &K) -> Arc<Gate> {
        let mut gates = self
            .inner
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(gates.entry(key.clone()).or_default())
    }
}

impl<K, V, E> std::fmt::Debug for Memo<K, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}
