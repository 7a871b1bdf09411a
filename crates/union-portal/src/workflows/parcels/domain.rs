use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::tenancy::UnionId;

/// Parcel number unique identifier of a land lot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pnu(pub String);

impl fmt::Display for Pnu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row of a union's parcel table. Both address columns are searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelRecord {
    pub pnu: Pnu,
    pub lot_address: String,
    #[serde(default)]
    pub road_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The whole normalized address was found in a stored address.
    Exact,
    /// Only the lot number was found.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMatch {
    pub pnu: Pnu,
    pub matched_address: String,
    pub kind: MatchKind,
}

/// One line of an uploaded member spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberMatchRow {
    pub name: String,
    pub property_address: String,
    #[serde(default)]
    pub dong: Option<String>,
    #[serde(default)]
    pub ho: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    PreRegistered,
    PendingApproval,
    Approved,
    Rejected,
    Withdrawn,
}

impl MemberStatus {
    /// Rejected and withdrawn members no longer hold their units.
    pub const fn is_excluded(self) -> bool {
        matches!(self, Self::Rejected | Self::Withdrawn)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PreRegistered => "pre_registered",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: MemberId,
    pub union_id: UnionId,
    pub name: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
}

/// Property-unit row tying a member to a parcel, or to nothing yet when the
/// address could not be matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyUnitClaim {
    pub union_id: UnionId,
    pub member_id: MemberId,
    pub pnu: Option<Pnu>,
    pub property_address: String,
    pub dong: Option<String>,
    pub ho: Option<String>,
    pub matched: bool,
}

/// A claim on a parcel together with the member holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelClaim {
    pub claim: PropertyUnitClaim,
    pub holder_name: String,
    pub holder_status: MemberStatus,
}

/// `101동 1203호` style label used in operator-facing messages.
pub fn describe_unit(dong: Option<&str>, ho: Option<&str>) -> String {
    let parts: Vec<String> = [(dong, "동"), (ho, "호")]
        .into_iter()
        .filter_map(|(value, suffix)| {
            let value = value?.trim();
            if value.is_empty() {
                None
            } else if value.ends_with(suffix) {
                Some(value.to_string())
            } else {
                Some(format!("{value}{suffix}"))
            }
        })
        .collect();

    if parts.is_empty() {
        "whole parcel".to_string()
    } else {
        parts.join(" ")
    }
}
