use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::directory::InviteDirectory;
use super::domain::{normalize_phone, InviteId, InviteRecipient, InviteStatus, MemberInvite};
use super::repository::InviteRepository;
use crate::workflows::notifications::{
    BulkDispatcher, NotificationError, NotificationRequest, NotificationSender, Recipient,
    SendReport, TemplateCode,
};
use crate::workflows::parcels::MemberRepository;
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

pub const INVITE_TEMPLATE: &str = "MEMBER_INVITE";

static INVITE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_invite_id() -> InviteId {
    let id = INVITE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InviteId(format!("invite-{id:06}"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InviteSummary {
    pub created: usize,
    /// Recipients that already hold an open or accepted invite.
    pub skipped: usize,
    pub sent: usize,
    pub failed: usize,
    pub delivery: SendReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub checked: usize,
    pub accepted: usize,
}

pub struct InviteService<R, M, S> {
    invites: Arc<R>,
    members: Arc<M>,
    dispatcher: BulkDispatcher<S>,
    directory: InviteDirectory<R>,
}

impl<R, M, S> InviteService<R, M, S>
where
    R: InviteRepository + 'static,
    M: MemberRepository + 'static,
    S: NotificationSender + 'static,
{
    pub fn new(invites: Arc<R>, members: Arc<M>, dispatcher: BulkDispatcher<S>) -> Self {
        Self {
            directory: InviteDirectory::new(invites.clone()),
            invites,
            members,
            dispatcher,
        }
    }

    pub fn directory(&self) -> &InviteDirectory<R> {
        &self.directory
    }

    pub fn list(&self, union_id: &UnionId) -> Result<Vec<MemberInvite>, InviteError> {
        Ok(self.directory.list(union_id)?)
    }

    /// Create invites for new recipients and send the invite template in
    /// batches. Each invite ends up `sent` or `failed` with its batch.
    pub fn bulk_invite(
        &self,
        union_id: &UnionId,
        union_name: &str,
        recipients: Vec<InviteRecipient>,
    ) -> Result<InviteSummary, InviteError> {
        if recipients.is_empty() {
            return Err(InviteError::NoRecipients);
        }
        for recipient in &recipients {
            if recipient.name.trim().is_empty() {
                return Err(InviteError::MissingField("name"));
            }
            if normalize_phone(&recipient.phone).is_empty() {
                return Err(InviteError::MissingField("phone"));
            }
        }

        let mut known: HashSet<String> = self
            .invites
            .invites(union_id)?
            .into_iter()
            .filter(|invite| invite.status != InviteStatus::Failed)
            .map(|invite| normalize_phone(&invite.phone))
            .collect();

        let mut summary = InviteSummary::default();
        let mut created = Vec::new();
        for recipient in recipients {
            if !known.insert(normalize_phone(&recipient.phone)) {
                summary.skipped += 1;
                continue;
            }
            let invite = self.invites.insert(MemberInvite {
                id: next_invite_id(),
                union_id: union_id.clone(),
                name: recipient.name.trim().to_string(),
                phone: recipient.phone.trim().to_string(),
                status: InviteStatus::Pending,
                created_at: Utc::now(),
            });
            match invite {
                Ok(invite) => created.push(invite),
                Err(err) => {
                    self.directory.invalidate(union_id);
                    return Err(err.into());
                }
            }
        }
        summary.created = created.len();
        self.directory.invalidate(union_id);

        if created.is_empty() {
            return Ok(summary);
        }

        let request = NotificationRequest::new(
            TemplateCode::new(INVITE_TEMPLATE),
            created
                .iter()
                .map(|invite| Recipient {
                    name: invite.name.clone(),
                    phone: invite.phone.clone(),
                })
                .collect(),
        )
        .with_variable("union_name", union_name);

        let report = self.dispatcher.dispatch(&request, |progress| {
            info!(
                union = %union_id,
                batch = progress.batch,
                batches = progress.batches,
                "invite batch sent"
            );
        })?;

        for batch in &report.batches {
            let status = if batch.delivered() {
                InviteStatus::Sent
            } else {
                InviteStatus::Failed
            };
            for invite in created.iter().skip(batch.start).take(batch.size) {
                if let Err(err) = self.invites.set_status(union_id, &invite.id, status) {
                    warn!(union = %union_id, invite = %invite.id, error = %err, "invite status not saved");
                }
            }
            match status {
                InviteStatus::Sent => summary.sent += batch.size,
                _ => summary.failed += batch.size,
            }
        }
        summary.delivery = report.totals;
        self.directory.invalidate(union_id);

        info!(
            union = %union_id,
            created = summary.created,
            skipped = summary.skipped,
            sent = summary.sent,
            failed = summary.failed,
            "bulk invite finished"
        );

        Ok(summary)
    }

    /// Accept every open invite whose phone number belongs to a registered,
    /// non-excluded member of the union.
    pub fn sync(&self, union_id: &UnionId) -> Result<SyncSummary, InviteError> {
        let member_phones: HashSet<String> = self
            .members
            .members(union_id)?
            .into_iter()
            .filter(|member| !member.status.is_excluded())
            .filter_map(|member| member.phone.as_deref().map(normalize_phone))
            .filter(|phone| !phone.is_empty())
            .collect();

        let open: Vec<MemberInvite> = self
            .invites
            .invites(union_id)?
            .into_iter()
            .filter(|invite| invite.status.is_open())
            .collect();

        let mut summary = SyncSummary {
            checked: open.len(),
            accepted: 0,
        };
        let result = open
            .iter()
            .filter(|invite| member_phones.contains(&normalize_phone(&invite.phone)))
            .try_for_each(|invite| {
                self.invites
                    .set_status(union_id, &invite.id, InviteStatus::Accepted)?;
                summary.accepted += 1;
                Ok::<_, StoreError>(())
            });
        self.directory.invalidate(union_id);
        result?;

        info!(union = %union_id, accepted = summary.accepted, "invites synced");
        Ok(summary)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error("no invite recipients supplied")]
    NoRecipients,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
