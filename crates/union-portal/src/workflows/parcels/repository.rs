use super::domain::{MemberRecord, ParcelClaim, ParcelRecord, Pnu, PropertyUnitClaim};
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

/// Read access to a union's parcel table.
pub trait ParcelDirectory: Send + Sync {
    fn parcels(&self, union_id: &UnionId) -> Result<Vec<ParcelRecord>, StoreError>;
}

/// Member and property-unit tables. The two inserts are separate calls and
/// nothing ties them into one transaction.
pub trait MemberRepository: Send + Sync {
    fn claims_on_parcel(
        &self,
        union_id: &UnionId,
        pnu: &Pnu,
    ) -> Result<Vec<ParcelClaim>, StoreError>;
    fn insert_member(&self, member: MemberRecord) -> Result<MemberRecord, StoreError>;
    fn insert_claim(&self, claim: PropertyUnitClaim) -> Result<(), StoreError>;
    fn members(&self, union_id: &UnionId) -> Result<Vec<MemberRecord>, StoreError>;
}
