use metrics_exporter_prometheus::PrometheusHandle;
use mime::Mime;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;
use union_portal::workflows::ads::{Ad, AdId, AdRepository, MediaStore};
use union_portal::workflows::invites::{InviteId, InviteRepository, InviteStatus, MemberInvite};
use union_portal::workflows::notifications::{
    NotificationError, NotificationRequest, NotificationSender, SendReport,
};
use union_portal::workflows::ownership::{
    AllocationMode, OwnershipRecord, OwnershipRepository, PropertyUnitId,
};
use union_portal::workflows::parcels::{
    MemberRecord, MemberRepository, ParcelClaim, ParcelDirectory, ParcelRecord, Pnu,
    PropertyUnitClaim,
};
use union_portal::workflows::store::StoreError;
use union_portal::workflows::tenancy::UnionId;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryOwnershipRepository {
    records: Arc<Mutex<HashMap<(UnionId, PropertyUnitId), Vec<OwnershipRecord>>>>,
}

impl OwnershipRepository for InMemoryOwnershipRepository {
    fn shares(
        &self,
        union_id: &UnionId,
        unit: &PropertyUnitId,
    ) -> Result<Vec<OwnershipRecord>, StoreError> {
        let guard = self.records.lock().expect("ownership mutex poisoned");
        Ok(guard
            .get(&(union_id.clone(), unit.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn upsert(&self, record: OwnershipRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("ownership mutex poisoned");
        let shares = guard
            .entry((record.union_id.clone(), record.property_unit_id.clone()))
            .or_default();
        match shares
            .iter_mut()
            .find(|existing| existing.owner_id == record.owner_id)
        {
            Some(existing) => *existing = record,
            None => shares.push(record),
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryParcelDirectory {
    parcels: Arc<Mutex<HashMap<UnionId, Vec<ParcelRecord>>>>,
}

impl InMemoryParcelDirectory {
    pub(crate) fn load(&self, union_id: UnionId, parcels: Vec<ParcelRecord>) -> usize {
        let count = parcels.len();
        let mut guard = self.parcels.lock().expect("parcel mutex poisoned");
        guard.entry(union_id).or_default().extend(parcels);
        count
    }
}

impl ParcelDirectory for InMemoryParcelDirectory {
    fn parcels(&self, union_id: &UnionId) -> Result<Vec<ParcelRecord>, StoreError> {
        let guard = self.parcels.lock().expect("parcel mutex poisoned");
        Ok(guard.get(union_id).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMemberRepository {
    members: Arc<Mutex<Vec<MemberRecord>>>,
    claims: Arc<Mutex<Vec<PropertyUnitClaim>>>,
}

impl MemberRepository for InMemoryMemberRepository {
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
                let holder = members.iter().find(|member| member.id == claim.member_id)?;
                Some(ParcelClaim {
                    claim: claim.clone(),
                    holder_name: holder.name.clone(),
                    holder_status: holder.status,
                })
            })
            .collect())
    }

    fn insert_member(&self, member: MemberRecord) -> Result<MemberRecord, StoreError> {
        let mut guard = self.members.lock().expect("member mutex poisoned");
        if guard.iter().any(|existing| existing.id == member.id) {
            return Err(StoreError::Conflict);
        }
        guard.push(member.clone());
        Ok(member)
    }

    fn insert_claim(&self, claim: PropertyUnitClaim) -> Result<(), StoreError> {
        self.claims
            .lock()
            .expect("claim mutex poisoned")
            .push(claim);
        Ok(())
    }

    fn members(&self, union_id: &UnionId) -> Result<Vec<MemberRecord>, StoreError> {
        let guard = self.members.lock().expect("member mutex poisoned");
        Ok(guard
            .iter()
            .filter(|member| &member.union_id == union_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryInviteRepository {
    invites: Arc<Mutex<Vec<MemberInvite>>>,
}

impl InviteRepository for InMemoryInviteRepository {
    fn invites(&self, union_id: &UnionId) -> Result<Vec<MemberInvite>, StoreError> {
        let guard = self.invites.lock().expect("invite mutex poisoned");
        Ok(guard
            .iter()
            .filter(|invite| &invite.union_id == union_id)
            .cloned()
            .collect())
    }

    fn insert(&self, invite: MemberInvite) -> Result<MemberInvite, StoreError> {
        self.invites
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
        let mut guard = self.invites.lock().expect("invite mutex poisoned");
        let invite = guard
            .iter_mut()
            .find(|invite| &invite.union_id == union_id && &invite.id == id)
            .ok_or(StoreError::NotFound)?;
        invite.status = status;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAdRepository {
    ads: Arc<Mutex<Vec<Ad>>>,
}

impl AdRepository for InMemoryAdRepository {
    fn ads(&self, union_id: &UnionId) -> Result<Vec<Ad>, StoreError> {
        let guard = self.ads.lock().expect("ad mutex poisoned");
        Ok(guard
            .iter()
            .filter(|ad| &ad.union_id == union_id)
            .cloned()
            .collect())
    }

    fn insert(&self, ad: Ad) -> Result<Ad, StoreError> {
        self.ads.lock().expect("ad mutex poisoned").push(ad.clone());
        Ok(ad)
    }

    fn update(&self, ad: Ad) -> Result<Ad, StoreError> {
        let mut guard = self.ads.lock().expect("ad mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.union_id == ad.union_id && existing.id == ad.id)
            .ok_or(StoreError::NotFound)?;
        *slot = ad.clone();
        Ok(ad)
    }

    fn delete(&self, union_id: &UnionId, id: &AdId) -> Result<(), StoreError> {
        let mut guard = self.ads.lock().expect("ad mutex poisoned");
        let position = guard
            .iter()
            .position(|ad| &ad.union_id == union_id && &ad.id == id)
            .ok_or(StoreError::NotFound)?;
        guard.remove(position);
        Ok(())
    }
}

/// Records outgoing batches in the log instead of calling a messaging
/// provider. Numbers that are not mobile (`01x`) go out as SMS fallback.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotificationSender {
    sent: Arc<Mutex<Vec<NotificationRequest>>>,
}

#[cfg(test)]
impl LoggingNotificationSender {
    pub(crate) fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationSender for LoggingNotificationSender {
    fn send(&self, request: &NotificationRequest) -> Result<SendReport, NotificationError> {
        let fallback = request
            .recipients
            .iter()
            .filter(|recipient| !recipient.phone.trim_start().starts_with("01"))
            .count();
        info!(
            template = %request.template,
            recipients = request.recipients.len(),
            fallback,
            "notification batch accepted"
        );
        self.sent
            .lock()
            .expect("notification mutex poisoned")
            .push(request.clone());

        Ok(SendReport {
            succeeded: request.recipients.len(),
            failed: 0,
            primary: request.recipients.len() - fallback,
            fallback,
        })
    }
}

/// Keeps uploaded objects in memory and hands out `memory://` URLs.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMediaStore {
    objects: Arc<Mutex<HashMap<String, (String, usize)>>>,
}

#[cfg(test)]
impl InMemoryMediaStore {
    pub(crate) fn object(&self, key: &str) -> Option<(String, usize)> {
        self.objects
            .lock()
            .expect("media mutex poisoned")
            .get(key)
            .cloned()
    }
}

impl MediaStore for InMemoryMediaStore {
    fn put(
        &self,
        union_id: &UnionId,
        file_name: &str,
        content_type: &Mime,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let key = format!("{union_id}/{}", object_name(file_name, content_type));
        self.objects
            .lock()
            .expect("media mutex poisoned")
            .insert(key.clone(), (content_type.essence_str().to_string(), bytes.len()));
        Ok(format!("memory://{key}"))
    }
}

/// Keep the uploaded name when its extension agrees with the content type,
/// otherwise append the canonical extension for that type.
pub(crate) fn object_name(file_name: &str, content_type: &Mime) -> String {
    let guessed_matches = mime_guess::from_path(file_name)
        .iter()
        .any(|guess| guess.essence_str() == content_type.essence_str());
    if guessed_matches {
        return file_name.to_string();
    }

    match mime_guess::get_mime_extensions(content_type).and_then(|exts| exts.first()) {
        Some(ext) => format!("{file_name}.{ext}"),
        None => file_name.to_string(),
    }
}

pub(crate) fn parse_mode(raw: &str) -> Result<AllocationMode, String> {
    AllocationMode::parse(raw)
        .ok_or_else(|| format!("unknown mode '{raw}', expected proportional, equal or manual"))
}

/// `ID=RATIO`, e.g. `A=30` or `kim=12.5`.
pub(crate) fn parse_owner_ratio(raw: &str) -> Result<(String, f64), String> {
    let (id, ratio) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=RATIO, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing owner id in '{raw}'"));
    }
    let ratio = ratio
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid ratio in '{raw}' ({err})"))?;
    Ok((id.to_string(), ratio))
}
