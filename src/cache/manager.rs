//! Single-slot cache for the full employee list
//!
//! Provides an `EmployeeCache` holding the last successfully fetched list
//! together with the time it was stored. Readers get a cheap `Arc` clone of
//! the snapshot; writers replace it wholesale (last write wins).

use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::data::{Employee, Failure};

/// Name of the single cache entry, used in log output
pub const ALL_EMPLOYEES_KEY: &str = "allEmployees";

/// A cached employee list and when it was stored
#[derive(Debug, Clone)]
pub struct CachedData {
    /// The cached list, shared read-only with callers
    pub data: Arc<Vec<Employee>>,
    /// When the list was stored
    pub cached_at: DateTime<Utc>,
}

/// Result of one fill, published to every caller that joined it
pub type FillResult = Result<CachedData, Failure>;

/// Receiver side of the fill currently talking to upstream
type InFlight = watch::Receiver<Option<FillResult>>;

enum Fill {
    Hit(CachedData),
    Lead(watch::Sender<Option<FillResult>>),
    Follow(InFlight),
}

/// Process-wide store for the full employee list
///
/// There is no TTL and no partial invalidation. The slot is absent at
/// startup and overwritten by every successful list fetch.
#[derive(Debug, Default)]
pub struct EmployeeCache {
    slot: RwLock<Option<CachedData>>,
    /// Set while a miss is being filled; callers that miss meanwhile wait on it
    in_flight: Mutex<Option<InFlight>>,
}

/// Clears the in-flight marker if the leading fetch is dropped midway
struct FillGuard<'a> {
    in_flight: &'a Mutex<Option<InFlight>>,
    armed: bool,
}

impl FillGuard<'_> {
    fn release(&mut self) {
        if self.armed {
            *self.in_flight.lock().unwrap_or_else(|e| e.into_inner()) = None;
            self.armed = false;
        }
    }
}

impl Drop for FillGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl EmployeeCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the cached list
    ///
    /// # Returns
    /// * `Some(CachedData)` if a list has been stored
    /// * `None` on a miss
    pub fn get(&self) -> Option<CachedData> {
        // A poisoned lock still holds a whole snapshot; writers only ever swap it.
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.clone()
    }

    /// Stores a list, replacing any previous one
    pub fn put(&self, employees: Vec<Employee>) -> CachedData {
        let entry = CachedData {
            data: Arc::new(employees),
            cached_at: Utc::now(),
        };
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(entry.clone());
        tracing::debug!(
            key = ALL_EMPLOYEES_KEY,
            count = entry.data.len(),
            "Cache filled"
        );
        entry
    }

    /// Empties the slot
    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Returns the cached list, running `fetch` to fill it on a miss
    ///
    /// Callers that miss while a fill is running wait for that fill and get
    /// its result, success or failure, so a burst of misses costs one
    /// upstream call and one timeout at most. A failed fill stores nothing;
    /// the next miss after it starts a new one.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> FillResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Employee>, Failure>>,
    {
        if let Some(hit) = self.get() {
            tracing::debug!(key = ALL_EMPLOYEES_KEY, "Cache hit");
            return Ok(hit);
        }

        loop {
            match self.join_fill() {
                Fill::Hit(hit) => {
                    tracing::debug!(
                        key = ALL_EMPLOYEES_KEY,
                        "Cache filled by concurrent fetch"
                    );
                    return Ok(hit);
                }
                Fill::Follow(mut rx) => {
                    tracing::debug!(key = ALL_EMPLOYEES_KEY, "Waiting on in-flight fetch");
                    if let Ok(shared) = rx.wait_for(Option::is_some).await {
                        if let Some(result) = shared.clone() {
                            return result;
                        }
                    }
                    // The leading caller was dropped before finishing; try again.
                }
                Fill::Lead(tx) => return self.lead(tx, fetch).await,
            }
        }
    }

    /// Decides under the in-flight lock whether this caller fetches or waits
    fn join_fill(&self) -> Fill {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(hit) = self.get() {
            return Fill::Hit(hit);
        }
        if let Some(rx) = in_flight.as_ref() {
            return Fill::Follow(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        *in_flight = Some(rx);
        Fill::Lead(tx)
    }

    async fn lead<F, Fut>(&self, tx: watch::Sender<Option<FillResult>>, fetch: F) -> FillResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Employee>, Failure>>,
    {
        let mut guard = FillGuard {
            in_flight: &self.in_flight,
            armed: true,
        };

        tracing::debug!(key = ALL_EMPLOYEES_KEY, "Cache miss");
        let result = fetch().await.map(|employees| self.put(employees));

        // Unmark before publishing so a failure is seen only by this fill's waiters.
        guard.release();
        tx.send_replace(Some(result.clone()));
        result
    }
}
