//! Address-to-parcel matching and member pre-registration from uploaded
//! spreadsheets.

pub mod domain;
pub mod matcher;
pub mod normalizer;
pub mod parser;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    describe_unit, AddressMatch, MatchKind, MemberId, MemberMatchRow, MemberRecord, MemberStatus,
    ParcelClaim, ParcelRecord, Pnu, PropertyUnitClaim,
};
pub use matcher::AddressMatcher;
pub use parser::{parse_member_rows, parse_parcel_rows};
pub use repository::{MemberRepository, ParcelDirectory};
pub use router::member_router;
pub use service::{
    ImportProgress, ImportReport, MatchingError, MemberMatchingService, RegistrationOutcome,
    RowRejection,
};
