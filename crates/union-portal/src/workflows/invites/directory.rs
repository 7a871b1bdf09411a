use std::sync::Arc;

use super::domain::MemberInvite;
use super::repository::InviteRepository;
use crate::workflows::cache::TenantCache;
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

/// Cached invite listing per union. Writers call `invalidate` after every
/// mutation so the next read reloads from the repository.
pub struct InviteDirectory<R> {
    repository: Arc<R>,
    cache: TenantCache<MemberInvite>,
}

impl<R> InviteDirectory<R>
where
    R: InviteRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            cache: TenantCache::default(),
        }
    }

    pub fn list(&self, union_id: &UnionId) -> Result<Vec<MemberInvite>, StoreError> {
        self.cache
            .get_or_load(union_id, || self.repository.invites(union_id))
    }

    pub fn invalidate(&self, union_id: &UnionId) {
        self.cache.invalidate(union_id);
    }

    pub fn is_cached(&self, union_id: &UnionId) -> bool {
        self.cache.is_cached(union_id)
    }
}
