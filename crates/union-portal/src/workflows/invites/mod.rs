//! Member invitations: bulk send through the notification dispatcher and
//! reconciliation against registered members.

pub mod directory;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use directory::InviteDirectory;
pub use domain::{normalize_phone, InviteId, InviteRecipient, InviteStatus, MemberInvite};
pub use repository::InviteRepository;
pub use router::invite_router;
pub use service::{InviteError, InviteService, InviteSummary, SyncSummary, INVITE_TEMPLATE};
