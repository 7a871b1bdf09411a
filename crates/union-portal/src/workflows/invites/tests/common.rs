use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::invites::domain::{InviteId, InviteRecipient, InviteStatus, MemberInvite};
use crate::workflows::invites::repository::InviteRepository;
use crate::workflows::invites::service::InviteService;
use crate::workflows::notifications::{
    BulkDispatcher, NotificationError, NotificationRequest, NotificationSender, SendReport,
};
use crate::workflows::parcels::domain::{
    MemberId, MemberRecord, MemberStatus, ParcelClaim, Pnu, PropertyUnitClaim,
};
use crate::workflows::parcels::repository::MemberRepository;
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

pub(super) type TestService = InviteService<MemoryInvites, MemoryMembers, ScriptedSender>;

pub(super) fn union_id() -> UnionId {
    UnionId::new("mokdong-6")
}

pub(super) fn recipient(name: &str, phone: &str) -> InviteRecipient {
    InviteRecipient {
        name: name.to_string(),
        phone: phone.to_string(),
    }
}

pub(super) fn recipients(count: usize) -> Vec<InviteRecipient> {
    (0..count)
        .map(|idx| recipient(&format!("조합원{idx}"), &format!("010-2000-{idx:04}")))
        .collect()
}

#[derive(Default)]
pub(super) struct MemoryInvites {
    pub(super) rows: Mutex<Vec<MemberInvite>>,
    pub(super) loads: AtomicUsize,
}

impl MemoryInvites {
    pub(super) fn statuses(&self) -> Vec<InviteStatus> {
        self.rows
            .lock()
            .expect("invite mutex poisoned")
            .iter()
            .map(|invite| invite.status)
            .collect()
    }

    pub(super) fn seed(&self, name: &str, phone: &str, status: InviteStatus) {
        self.rows
            .lock()
            .expect("invite mutex poisoned")
            .push(MemberInvite {
                id: InviteId(format!("seed-{name}")),
                union_id: union_id(),
                name: name.to_string(),
                phone: phone.to_string(),
                status,
                created_at: Utc::now(),
            });
    }
}

impl InviteRepository for MemoryInvites {
    fn invites(&self, union_id: &UnionId) -> Result<Vec<MemberInvite>, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .expect("invite mutex poisoned")
            .iter()
            .filter(|invite| &invite.union_id == union_id)
            .cloned()
            .collect())
    }

    fn insert(&self, invite: MemberInvite) -> Result<MemberInvite, StoreError> {
        self.rows
            .lock()
            .expect("invite mutex poisoned")
            .push(invite.clone());
        Ok(invite)
    }

    fn set_status(
        &self,
        union_id: &UnionId,
        id: &InviteId,
        status: InviteStatus,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().expect("invite mutex poisoned");
        let invite = rows
            .iter_mut()
            .find(|invite| &invite.union_id == union_id && &invite.id == id)
            .ok_or(StoreError::NotFound)?;
        invite.status = status;
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryMembers {
    rows: Mutex<Vec<MemberRecord>>,
}

impl MemoryMembers {
    pub(super) fn add(&self, name: &str, phone: &str, status: MemberStatus) {
        let mut rows = self.rows.lock().expect("member mutex poisoned");
        let id = MemberId(format!("member-{}", rows.len() + 1));
        rows.push(MemberRecord {
            id,
            union_id: union_id(),
            name: name.to_string(),
            phone: Some(phone.to_string()),
            birth_date: None,
            status,
            created_at: Utc::now(),
        });
    }
}

impl MemberRepository for MemoryMembers {
    fn claims_on_parcel(
        &self,
        _union_id: &UnionId,
        _pnu: &Pnu,
    ) -> Result<Vec<ParcelClaim>, StoreError> {
        Ok(Vec::new())
    }

    fn insert_member(&self, member: MemberRecord) -> Result<MemberRecord, StoreError> {
        self.rows
            .lock()
            .expect("member mutex poisoned")
            .push(member.clone());
        Ok(member)
    }

    fn insert_claim(&self, _claim: PropertyUnitClaim) -> Result<(), StoreError> {
        Ok(())
    }

    fn members(&self, union_id: &UnionId) -> Result<Vec<MemberRecord>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("member mutex poisoned")
            .iter()
            .filter(|member| &member.union_id == union_id)
            .cloned()
            .collect())
    }
}

/// Succeeds through the primary channel unless the call index is listed in
/// `fail_calls`.
#[derive(Default)]
pub(super) struct ScriptedSender {
    pub(super) calls: AtomicUsize,
    pub(super) fail_calls: Vec<usize>,
}

impl NotificationSender for ScriptedSender {
    fn send(&self, request: &NotificationRequest) -> Result<SendReport, NotificationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_calls.contains(&call) {
            return Err(NotificationError::Transport("provider rejected batch".to_string()));
        }
        Ok(SendReport {
            succeeded: request.recipients.len(),
            failed: 0,
            primary: request.recipients.len(),
            fallback: 0,
        })
    }
}

pub(super) struct Fixture {
    pub(super) service: TestService,
    pub(super) invites: Arc<MemoryInvites>,
    pub(super) members: Arc<MemoryMembers>,
    pub(super) sender: Arc<ScriptedSender>,
}

pub(super) fn build_service(batch_size: usize, fail_calls: Vec<usize>) -> Fixture {
    let invites = Arc::new(MemoryInvites::default());
    let members = Arc::new(MemoryMembers::default());
    let sender = Arc::new(ScriptedSender {
        fail_calls,
        ..ScriptedSender::default()
    });
    let service = InviteService::new(
        invites.clone(),
        members.clone(),
        BulkDispatcher::new(sender.clone(), batch_size),
    );
    Fixture {
        service,
        invites,
        members,
        sender,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
