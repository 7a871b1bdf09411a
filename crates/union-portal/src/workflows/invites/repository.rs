use super::domain::{InviteId, InviteStatus, MemberInvite};
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

pub trait InviteRepository: Send + Sync {
    fn invites(&self, union_id: &UnionId) -> Result<Vec<MemberInvite>, StoreError>;
    fn insert(&self, invite: MemberInvite) -> Result<MemberInvite, StoreError>;
    fn set_status(
        &self,
        union_id: &UnionId,
        id: &InviteId,
        status: InviteStatus,
    ) -> Result<(), StoreError>;
}
