use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{OwnerId, PropertyUnitId};
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

/// One row of the property-unit ownership table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub union_id: UnionId,
    pub property_unit_id: PropertyUnitId,
    pub owner_id: OwnerId,
    pub ratio: f64,
    pub updated_at: DateTime<Utc>,
}

/// Storage boundary for confirmed ratios. Writes are keyed by
/// `(union, unit, owner)`; a second write for the same key replaces the first.
pub trait OwnershipRepository: Send + Sync {
    fn shares(
        &self,
        union_id: &UnionId,
        unit: &PropertyUnitId,
    ) -> Result<Vec<OwnershipRecord>, StoreError>;
    fn upsert(&self, record: OwnershipRecord) -> Result<(), StoreError>;
}
