use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::allocation::reallocate;
use super::domain::{Allocation, AllocationRequest, OwnerId, PropertyUnitId, TotalStatus};
use super::repository::{OwnershipRecord, OwnershipRepository};
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

/// Everything needed to persist a split once the operator confirms it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareConfirmation {
    pub union_id: UnionId,
    pub property_unit_id: PropertyUnitId,
    pub existing_owner_id: OwnerId,
    pub new_owner_id: OwnerId,
    pub request: AllocationRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmedAllocation {
    pub allocation: Allocation,
    pub records: Vec<OwnershipRecord>,
}

/// Reallocation facade: pure previews plus the confirmation write path.
pub struct OwnershipService<R> {
    repository: Arc<R>,
}

impl<R> OwnershipService<R>
where
    R: OwnershipRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn preview(&self, request: &AllocationRequest) -> Allocation {
        reallocate(request)
    }

    pub fn shares(
        &self,
        union_id: &UnionId,
        unit: &PropertyUnitId,
    ) -> Result<Vec<OwnershipRecord>, OwnershipError> {
        Ok(self.repository.shares(union_id, unit)?)
    }

    /// Validate the split and write one record per owner.
    ///
    /// Records are written one after another with no rollback: if a write
    /// fails, the earlier ones stay in place.
    pub fn confirm(
        &self,
        confirmation: ShareConfirmation,
    ) -> Result<ConfirmedAllocation, OwnershipError> {
        let ShareConfirmation {
            union_id,
            property_unit_id,
            existing_owner_id,
            new_owner_id,
            request,
        } = confirmation;

        if new_owner_id == existing_owner_id
            || request
                .other_co_owners
                .iter()
                .any(|share| share.owner_id == new_owner_id)
        {
            return Err(OwnershipError::AlreadyCoOwner(new_owner_id));
        }

        let allocation = reallocate(&request);
        if !allocation.status.is_balanced() {
            return Err(OwnershipError::Unbalanced {
                total: allocation.total,
                status: allocation.status,
            });
        }

        let updated_at = Utc::now();
        let mut owners = vec![
            (existing_owner_id, allocation.existing_ratio),
            (new_owner_id, allocation.new_owner_ratio),
        ];
        owners.extend(
            allocation
                .co_owners
                .iter()
                .map(|adjustment| (adjustment.owner_id.clone(), adjustment.ratio)),
        );

        let mut records = Vec::with_capacity(owners.len());
        for (owner_id, ratio) in owners {
            let record = OwnershipRecord {
                union_id: union_id.clone(),
                property_unit_id: property_unit_id.clone(),
                owner_id,
                ratio,
                updated_at,
            };
            if let Err(err) = self.repository.upsert(record.clone()) {
                warn!(
                    union = %union_id,
                    unit = %property_unit_id,
                    written = records.len(),
                    error = %err,
                    "ownership confirmation stopped part way"
                );
                return Err(err.into());
            }
            records.push(record);
        }

        info!(
            union = %union_id,
            unit = %property_unit_id,
            mode = allocation.mode.label(),
            owners = records.len(),
            "ownership ratios confirmed"
        );

        Ok(ConfirmedAllocation {
            allocation,
            records,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    #[error("total of {total:.1}% cannot be confirmed: {}", .status.message())]
    Unbalanced { total: f64, status: TotalStatus },
    #[error("{0} already holds a share of this unit")]
    AlreadyCoOwner(OwnerId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
