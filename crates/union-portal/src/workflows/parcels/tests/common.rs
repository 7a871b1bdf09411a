use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::parcels::domain::{
    MemberMatchRow, MemberRecord, ParcelClaim, ParcelRecord, Pnu, PropertyUnitClaim,
};
use crate::workflows::parcels::repository::{MemberRepository, ParcelDirectory};
use crate::workflows::parcels::service::MemberMatchingService;
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

pub(super) fn union_id() -> UnionId {
    UnionId::new("mokdong-6")
}

pub(super) fn other_union() -> UnionId {
    UnionId::new("sinjeong-2")
}

pub(super) fn parcels() -> Vec<ParcelRecord> {
    vec![
        ParcelRecord {
            pnu: Pnu("1147010100101230004".to_string()),
            lot_address: "서울특별시 양천구 목동 123-4".to_string(),
            road_address: Some("서울특별시 양천구 목동동로 100".to_string()),
        },
        ParcelRecord {
            pnu: Pnu("1147010100109050000".to_string()),
            lot_address: "서울특별시 양천구 목동 905".to_string(),
            road_address: None,
        },
    ]
}

pub(super) fn row(name: &str, address: &str, dong: Option<&str>, ho: Option<&str>) -> MemberMatchRow {
    MemberMatchRow {
        name: name.to_string(),
        property_address: address.to_string(),
        dong: dong.map(str::to_string),
        ho: ho.map(str::to_string),
        phone: Some("010-1111-2222".to_string()),
        birth_date: None,
    }
}

#[derive(Default)]
pub(super) struct MemoryParcels {
    tables: HashMap<UnionId, Vec<ParcelRecord>>,
}

impl MemoryParcels {
    pub(super) fn seeded() -> Self {
        let mut tables = HashMap::new();
        tables.insert(union_id(), parcels());
        Self { tables }
    }
}

impl ParcelDirectory for MemoryParcels {
    fn parcels(&self, union_id: &UnionId) -> Result<Vec<ParcelRecord>, StoreError> {
        Ok(self.tables.get(union_id).cloned().unwrap_or_default())
    }
}

pub(super) struct OfflineParcels;

impl ParcelDirectory for OfflineParcels {
    fn parcels(&self, _union_id: &UnionId) -> Result<Vec<ParcelRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryMembers {
    pub(super) members: Mutex<Vec<MemberRecord>>,
    pub(super) claims: Mutex<Vec<PropertyUnitClaim>>,
    pub(super) fail_claims: bool,
}

impl MemoryMembers {
    pub(super) fn failing_claims() -> Self {
        Self {
            fail_claims: true,
            ..Self::default()
        }
    }

    pub(super) fn set_status(
        &self,
        name: &str,
        status: crate::workflows::parcels::domain::MemberStatus,
    ) {
        let mut guard = self.members.lock().expect("member mutex poisoned");
        for member in guard.iter_mut().filter(|member| member.name == name) {
            member.status = status;
        }
    }
}

impl MemberRepository for MemoryMembers {
    fn claims_on_parcel(
        &self,
        union_id: &UnionId,
        pnu: &Pnu,
    ) -> Result<Vec<ParcelClaim>, StoreError> {
        let members = self.members.lock().expect("member mutex poisoned");
        let claims = self.claims.lock().expect("claim mutex poisoned");
        Ok(claims
            .iter()
            .filter(|claim| &claim.union_id == union_id && claim.pnu.as_ref() == Some(pnu))
            .filter_map(|claim| {
                members
                    .iter()
                    .find(|member| member.id == claim.member_id)
                    .map(|member| ParcelClaim {
                        claim: claim.clone(),
                        holder_name: member.name.clone(),
                        holder_status: member.status,
                    })
            })
            .collect())
    }

    fn insert_member(&self, member: MemberRecord) -> Result<MemberRecord, StoreError> {
        self.members
            .lock()
            .expect("member mutex poisoned")
            .push(member.clone());
        Ok(member)
    }

    fn insert_claim(&self, claim: PropertyUnitClaim) -> Result<(), StoreError> {
        if self.fail_claims {
            return Err(StoreError::Unavailable("property units offline".to_string()));
        }
        self.claims
            .lock()
            .expect("claim mutex poisoned")
            .push(claim);
        Ok(())
    }

    fn members(&self, union_id: &UnionId) -> Result<Vec<MemberRecord>, StoreError> {
        Ok(self
            .members
            .lock()
            .expect("member mutex poisoned")
            .iter()
            .filter(|member| &member.union_id == union_id)
            .cloned()
            .collect())
    }
}

pub(super) fn build_service(
    batch_size: usize,
) -> (
    MemberMatchingService<MemoryParcels, MemoryMembers>,
    Arc<MemoryMembers>,
) {
    let members = Arc::new(MemoryMembers::default());
    let service =
        MemberMatchingService::new(Arc::new(MemoryParcels::seeded()), members.clone(), batch_size);
    (service, members)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
