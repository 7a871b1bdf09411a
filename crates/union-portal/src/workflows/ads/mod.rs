//! Advertisement sales: placements per ad type, contracts and billing, and
//! creative uploads.

pub mod catalog;
pub mod domain;
pub mod media;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::AdCatalog;
pub use domain::{Ad, AdContract, AdDraft, AdId, AdKind, AdPlacement, BillingSummary};
pub use media::{validate_content_type, MediaKind, MediaStore, MediaUpload};
pub use repository::AdRepository;
pub use router::ad_router;
pub use service::{AdAdminService, AdError};
