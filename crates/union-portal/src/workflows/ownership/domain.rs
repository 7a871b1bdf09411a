use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ratios are percentages of a whole property unit.
pub const FULL_SHARE: f64 = 100.0;

/// Identifier of a person holding (or claiming) a share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the property unit whose ownership is being split.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyUnitId(pub String);

impl fmt::Display for PropertyUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Policy used to carve the new owner's share out of the existing holders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    #[default]
    Proportional,
    Equal,
    Manual,
}

impl AllocationMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::Equal => "equal",
            Self::Manual => "manual",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "proportional" | "ratio" => Some(Self::Proportional),
            "equal" | "even" => Some(Self::Equal),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Co-owner other than the existing owner, with the ratio held before the split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoOwnerShare {
    pub owner_id: OwnerId,
    pub original_ratio: f64,
}

/// Values typed in by the operator when the mode is manual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualOverrides {
    #[serde(default)]
    pub existing_ratio: Option<f64>,
    #[serde(default)]
    pub co_owner_ratios: BTreeMap<OwnerId, f64>,
}

/// Input for one recomputation. Built fresh on every edit and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    #[serde(default)]
    pub mode: AllocationMode,
    pub new_owner_ratio: f64,
    #[serde(default)]
    pub other_co_owners: Vec<CoOwnerShare>,
    #[serde(default)]
    pub manual: ManualOverrides,
}

impl AllocationRequest {
    /// Whatever the other co-owners do not hold belongs to the existing owner.
    pub fn existing_owner_original_ratio(&self) -> f64 {
        let others: f64 = self
            .other_co_owners
            .iter()
            .map(|share| clamp_ratio(share.original_ratio))
            .sum();
        (FULL_SHARE - others).max(0.0)
    }
}

/// Ratio of one co-owner after the split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoOwnerAdjustment {
    pub owner_id: OwnerId,
    pub original_ratio: f64,
    pub ratio: f64,
}

/// How the displayed total compares to a whole unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TotalStatus {
    Balanced,
    Exceeds { excess: f64 },
    Under { shortfall: f64 },
}

impl TotalStatus {
    pub fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }

    pub fn message(&self) -> String {
        match self {
            Self::Balanced => "ratios total 100%".to_string(),
            Self::Exceeds { excess } => {
                format!("ratios exceed 100% by {}", format_ratio(*excess))
            }
            Self::Under { shortfall } => {
                format!("ratios fall short of 100% by {}", format_ratio(*shortfall))
            }
        }
    }
}

/// Result of a recomputation, ready to display or confirm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub mode: AllocationMode,
    pub existing_original_ratio: f64,
    pub existing_ratio: f64,
    pub new_owner_ratio: f64,
    pub co_owners: Vec<CoOwnerAdjustment>,
    pub total: f64,
    pub status: TotalStatus,
}

impl Allocation {
    pub fn summary_line(&self) -> String {
        let others = self
            .co_owners
            .iter()
            .map(|adjustment| {
                format!(
                    "{} {} -> {}",
                    adjustment.owner_id,
                    format_ratio(adjustment.original_ratio),
                    format_ratio(adjustment.ratio)
                )
            })
            .collect::<Vec<_>>();

        let mut line = format!(
            "[{}] existing {} -> {}, new owner {}",
            self.mode.label(),
            format_ratio(self.existing_original_ratio),
            format_ratio(self.existing_ratio),
            format_ratio(self.new_owner_ratio)
        );
        if !others.is_empty() {
            line.push_str(", ");
            line.push_str(&others.join(", "));
        }
        line.push_str(&format!(" | total {}", format_ratio(self.total)));
        line
    }
}

/// Out-of-range input is pinned to the valid range rather than rejected.
pub fn clamp_ratio(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, FULL_SHARE)
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn format_ratio(value: f64) -> String {
    format!("{:.1}%", round_one_decimal(value))
}
