use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};

type Slot<T> = Arc<OnceCell<Arc<T>>>;

/// Build-once, read-many cache of immutable per-year values.
///
/// Each year has one slot. Concurrent first requests for a year share a single
/// load; the value is fully constructed before it is published. Invalidation
/// detaches the slot, so a load still in flight finishes for its own callers
/// but never lands in the cache.
pub struct YearCache<T> {
    entries: RwLock<HashMap<i32, Slot<T>>>,
}

impl<T> YearCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, year: i32) -> Option<Arc<T>> {
        self.entries
            .read()
            .await
            .get(&year)
            .and_then(|slot| slot.get().cloned())
    }

    pub async fn get_or_load<F, Fut, E>(&self, year: i32, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(year).await {
            return Ok(hit);
        }

        let slot = self.slot(year).await;
        match slot
            .get_or_try_init(|| async move { load().await.map(Arc::new) })
            .await
        {
            Ok(value) => Ok(value.clone()),
            Err(e) => {
                // Don't keep empty slots around for years that failed to load.
                let mut entries = self.entries.write().await;
                if entries
                    .get(&year)
                    .is_some_and(|s| Arc::ptr_eq(s, &slot) && !s.initialized())
                {
                    entries.remove(&year);
                }
                Err(e)
            }
        }
    }

    async fn slot(&self, year: i32) -> Slot<T> {
        let existing = self.entries.read().await.get(&year).cloned();
        if let Some(slot) = existing {
            return slot;
        }
        self.entries.write().await.entry(year).or_default().clone()
    }

    /// Drops every slot; returns how many held a loaded value.
    pub async fn invalidate(&self) -> usize {
        let mut entries = self.entries.write().await;
        let dropped = entries.values().filter(|slot| slot.initialized()).count();
        entries.clear();
        dropped
    }

    pub async fn invalidate_year(&self, year: i32) -> bool {
        self.entries
            .write()
            .await
            .remove(&year)
            .is_some_and(|slot| slot.initialized())
    }
}

impl<T> Default for YearCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
