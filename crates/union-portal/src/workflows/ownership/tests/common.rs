use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::ownership::domain::{
    AllocationMode, AllocationRequest, CoOwnerShare, ManualOverrides, OwnerId, PropertyUnitId,
};
use crate::workflows::ownership::repository::{OwnershipRecord, OwnershipRepository};
use crate::workflows::ownership::service::{OwnershipService, ShareConfirmation};
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

pub(super) fn union_id() -> UnionId {
    UnionId::new("mokdong-6")
}

pub(super) fn unit_id() -> PropertyUnitId {
    PropertyUnitId("101-1203".to_string())
}

pub(super) fn request(mode: AllocationMode) -> AllocationRequest {
    AllocationRequest {
        mode,
        new_owner_ratio: 20.0,
        other_co_owners: vec![CoOwnerShare {
            owner_id: OwnerId::new("A"),
            original_ratio: 30.0,
        }],
        manual: ManualOverrides::default(),
    }
}

pub(super) fn confirmation(mode: AllocationMode) -> ShareConfirmation {
    ShareConfirmation {
        union_id: union_id(),
        property_unit_id: unit_id(),
        existing_owner_id: OwnerId::new("existing"),
        new_owner_id: OwnerId::new("claimant"),
        request: request(mode),
    }
}

pub(super) fn build_service() -> (OwnershipService<MemoryOwnership>, Arc<MemoryOwnership>) {
    let repository = Arc::new(MemoryOwnership::default());
    let service = OwnershipService::new(repository.clone());
    (service, repository)
}

type ShareKey = (UnionId, PropertyUnitId, OwnerId);

#[derive(Default, Clone)]
pub(super) struct MemoryOwnership {
    records: Arc<Mutex<HashMap<ShareKey, OwnershipRecord>>>,
}

impl MemoryOwnership {
    pub(super) fn ratio_of(&self, owner: &str) -> Option<f64> {
        let guard = self.records.lock().expect("ownership mutex poisoned");
        guard
            .values()
            .find(|record| record.owner_id.0 == owner)
            .map(|record| record.ratio)
    }
}

impl OwnershipRepository for MemoryOwnership {
    fn shares(
        &self,
        union_id: &UnionId,
        unit: &PropertyUnitId,
    ) -> Result<Vec<OwnershipRecord>, StoreError> {
        let guard = self.records.lock().expect("ownership mutex poisoned");
        let mut records: Vec<_> = guard
            .values()
            .filter(|record| &record.union_id == union_id && &record.property_unit_id == unit)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));
        Ok(records)
    }

    fn upsert(&self, record: OwnershipRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("ownership mutex poisoned");
        guard.insert(
            (
                record.union_id.clone(),
                record.property_unit_id.clone(),
                record.owner_id.clone(),
            ),
            record,
        );
        Ok(())
    }
}

/// Accepts the first `remaining` writes, then reports the database offline.
pub(super) struct FlakyOwnership {
    pub(super) remaining: Mutex<usize>,
    pub(super) written: Mutex<Vec<OwnershipRecord>>,
}

impl FlakyOwnership {
    pub(super) fn new(remaining: usize) -> Self {
        Self {
            remaining: Mutex::new(remaining),
            written: Mutex::new(Vec::new()),
        }
    }
}

impl OwnershipRepository for FlakyOwnership {
    fn shares(
        &self,
        _union_id: &UnionId,
        _unit: &PropertyUnitId,
    ) -> Result<Vec<OwnershipRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn upsert(&self, record: OwnershipRecord) -> Result<(), StoreError> {
        let mut remaining = self.remaining.lock().expect("flaky mutex poisoned");
        if *remaining == 0 {
            return Err(StoreError::Unavailable("database offline".to_string()));
        }
        *remaining -= 1;
        self.written
            .lock()
            .expect("flaky mutex poisoned")
            .push(record);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
