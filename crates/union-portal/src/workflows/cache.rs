use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::store::StoreError;
use super::tenancy::UnionId;

/// Per-union list cache. Entries live until a mutation invalidates them.
#[derive(Debug)]
pub struct TenantCache<T> {
    state: Mutex<CacheState<T>>,
}

#[derive(Debug)]
struct CacheState<T> {
    entries: HashMap<UnionId, Vec<T>>,
    /// Bumped by every invalidation. A load that started under an older
    /// generation is returned to its caller but never stored.
    generations: HashMap<UnionId, u64>,
}

impl<T> Default for TenantCache<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                generations: HashMap::new(),
            }),
        }
    }
}

impl<T: Clone> TenantCache<T> {
    /// Cached rows for the union, loading them on a miss. Failed loads and
    /// loads overtaken by an invalidation are not cached.
    pub fn get_or_load(
        &self,
        union_id: &UnionId,
        load: impl FnOnce() -> Result<Vec<T>, StoreError>,
    ) -> Result<Vec<T>, StoreError> {
        let started_at = {
            let state = self.state();
            if let Some(rows) = state.entries.get(union_id) {
                return Ok(rows.clone());
            }
            state.generation(union_id)
        };

        let rows = load()?;

        let mut state = self.state();
        if state.generation(union_id) == started_at {
            state.entries.insert(union_id.clone(), rows.clone());
        }
        Ok(rows)
    }

    pub fn invalidate(&self, union_id: &UnionId) {
        let mut state = self.state();
        state.entries.remove(union_id);
        *state.generations.entry(union_id.clone()).or_default() += 1;
    }

    pub fn is_cached(&self, union_id: &UnionId) -> bool {
        self.state().entries.contains_key(union_id)
    }

    fn state(&self) -> MutexGuard<'_, CacheState<T>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> CacheState<T> {
    fn generation(&self, union_id: &UnionId) -> u64 {
        self.generations.get(union_id).copied().unwrap_or(0)
    }
}
