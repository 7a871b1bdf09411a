use std::sync::Arc;

use super::domain::Ad;
use super::repository::AdRepository;
use crate::workflows::cache::TenantCache;
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

/// Cached ad listing per union, invalidated by the admin service on every
/// write.
pub struct AdCatalog<R> {
    repository: Arc<R>,
    cache: TenantCache<Ad>,
}

impl<R> AdCatalog<R>
where
    R: AdRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            cache: TenantCache::default(),
        }
    }

    pub fn list(&self, union_id: &UnionId) -> Result<Vec<Ad>, StoreError> {
        self.cache.get_or_load(union_id, || self.repository.ads(union_id))
    }

    pub fn invalidate(&self, union_id: &UnionId) {
        self.cache.invalidate(union_id);
    }

    pub fn is_cached(&self, union_id: &UnionId) -> bool {
        self.cache.is_cached(union_id)
    }
}
