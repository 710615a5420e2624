//! In-process TTL cache with single-flight computation per key.
//!
//! Used to memoize identity-source lookups (public keys, who-am-I profiles).
//!
//! - The first caller on a cold/expired key installs a shared computation;
//!   concurrent callers for the same key await that same handle.
//! - Each computation is also driven by its own task, so it runs to completion
//!   and settles its slot even when every caller has gone away.
//! - The lock is only held to look up / install / settle a slot, never across `.await`.
//! - Successful values live for exactly `ttl` from the moment they settle.
//! - Failures are handed to every waiter of that attempt and then dropped, so
//!   the next caller starts a fresh computation.
//!
//! Must be used from within a Tokio runtime.
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;
use tracing::{debug, trace};

// Expired slots are swept once the map reaches `sweep_at`, which starts here
// and is reset to twice the surviving size after each sweep.
const MIN_SWEEP_AT: usize = 1024;

type Computation<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

enum Slot<V, E> {
    Pending {
        generation: u64,
        computation: Computation<V, E>,
    },
    Ready {
        value: V,
        expires_at: Instant,
    },
}

enum Lookup<V, E> {
    Hit(V),
    Join(u64, Computation<V, E>),
    Miss,
}

struct Slots<K, V, E> {
    map: HashMap<K, Slot<V, E>>,
    next_generation: u64,
    sweep_at: usize,
    sweeps: u64,
}

struct Inner<K, V, E> {
    name: &'static str,
    ttl: Duration,
    slots: Mutex<Slots<K, V, E>>,
}

pub struct VerificationCache<K, V, E> {
    inner: Arc<Inner<K, V, E>>,
}

impl<K, V, E> std::fmt::Debug for VerificationCache<K, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keys may be bearer tokens: never print them.
        f.debug_struct("VerificationCache")
            .field("name", &self.inner.name)
            .field("ttl", &self.inner.ttl)
            .finish_non_exhaustive()
    }
}

impl<K, V, E> VerificationCache<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                ttl,
                slots: Mutex::new(Slots {
                    map: HashMap::new(),
                    next_generation: 0,
                    sweep_at: MIN_SWEEP_AT,
                    sweeps: 0,
                }),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Return the cached value for `key`, or run `compute` exactly once for
    /// all concurrent callers and cache a successful result.
    ///
    /// `compute` is only invoked by the caller that finds the key cold; it
    /// must produce a `'static` future (own its inputs).
    pub async fn get_or_try_insert_with<F, Fut>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let inner = &self.inner;
        let (generation, computation, started) = {
            let mut slots = inner.lock();
            let now = Instant::now();

            let lookup = match slots.map.get(&key) {
                Some(Slot::Ready { value, expires_at }) if now < *expires_at => {
                    Lookup::Hit(value.clone())
                }
                Some(Slot::Pending {
                    generation,
                    computation,
                }) => Lookup::Join(*generation, computation.clone()),
                _ => Lookup::Miss,
            };

            match lookup {
                Lookup::Hit(value) => {
                    trace!(cache = inner.name, "cache hit");
                    return Ok(value);
                }
                Lookup::Join(generation, computation) => {
                    debug!(cache = inner.name, "joining in-flight computation");
                    (generation, computation, false)
                }
                Lookup::Miss => {
                    if slots.map.len() >= slots.sweep_at {
                        inner.sweep(&mut slots, now);
                    }
                    let generation = slots.next_generation;
                    slots.next_generation += 1;
                    let computation = compute().boxed().shared();
                    slots.map.insert(
                        key.clone(),
                        Slot::Pending {
                            generation,
                            computation: computation.clone(),
                        },
                    );
                    debug!(cache = inner.name, "cache miss, starting computation");
                    (generation, computation, true)
                }
            }
        };

        if started {
            let driver = computation.clone();
            let owner = Arc::clone(inner);
            let driver_key = key.clone();
            tokio::spawn(async move {
                let result = driver.await;
                owner.settle(driver_key, generation, &result);
            });
        }

        let result = computation.await;
        inner.settle(key, generation, &result);
        result
    }

    pub fn invalidate(&self, key: &K) {
        self.inner.lock().map.remove(key);
    }

    /// Number of slots (pending or ready, including not-yet-swept expired ones).
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn sweep_count(&self) -> u64 {
        self.inner.lock().sweeps
    }
}

impl<K, V, E> Inner<K, V, E>
where
    K: Eq + Hash,
    V: Clone,
{
    // The driver task and every waiter call this; only the first one still
    // seeing its own pending slot replaces it.
    fn settle(&self, key: K, generation: u64, result: &Result<V, E>) {
        let mut slots = self.lock();
        let owns_slot = matches!(
            slots.map.get(&key),
            Some(Slot::Pending { generation: g, .. }) if *g == generation
        );
        if !owns_slot {
            return;
        }

        match result {
            Ok(value) => {
                slots.map.insert(
                    key,
                    Slot::Ready {
                        value: value.clone(),
                        expires_at: Instant::now() + self.ttl,
                    },
                );
            }
            Err(_) => {
                debug!(cache = self.name, "computation failed, not caching");
                slots.map.remove(&key);
            }
        }
    }

    fn sweep(&self, slots: &mut Slots<K, V, E>, now: Instant) {
        slots.map.retain(|_, slot| match slot {
            Slot::Pending { .. } => true,
            Slot::Ready { expires_at, .. } => now < *expires_at,
        });
        slots.sweep_at = MIN_SWEEP_AT.max(slots.map.len() * 2);
        slots.sweeps += 1;
        trace!(cache = self.name, remaining = slots.map.len(), "swept expired slots");
    }

    fn lock(&self) -> MutexGuard<'_, Slots<K, V, E>> {
        // Slots are replaced wholesale, so a poisoned map is still consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
