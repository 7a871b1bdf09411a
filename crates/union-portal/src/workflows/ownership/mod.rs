//! Co-owner share reallocation: previews while the operator edits, and the
//! confirmation write once the ratios add up to a whole unit.

pub mod allocation;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use allocation::{reallocate, total_status};
pub use domain::{
    format_ratio, Allocation, AllocationMode, AllocationRequest, CoOwnerAdjustment, CoOwnerShare,
    ManualOverrides, OwnerId, PropertyUnitId, TotalStatus,
};
pub use repository::{OwnershipRecord, OwnershipRepository};
pub use router::{ownership_router, ConfirmSharesRequest};
pub use service::{ConfirmedAllocation, OwnershipError, OwnershipService, ShareConfirmation};
