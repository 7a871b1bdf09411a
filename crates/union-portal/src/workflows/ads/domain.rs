use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::tenancy::UnionId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdId(pub String);

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdKind {
    Main,
    Sub,
    Board,
}

/// Where and how an ad is shown. Each ad type carries only the fields its
/// slot uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdPlacement {
    /// Rotating banner on the union home page.
    Main {
        image_url: String,
        #[serde(default)]
        link_url: Option<String>,
        #[serde(default)]
        display_order: u32,
    },
    Sub {
        image_url: String,
        #[serde(default)]
        link_url: Option<String>,
        title: String,
    },
    /// Text listing on the partner board.
    Board {
        title: String,
        body: String,
        category: String,
        #[serde(default)]
        contact_phone: Option<String>,
    },
}

impl AdPlacement {
    pub const fn kind(&self) -> AdKind {
        match self {
            Self::Main { .. } => AdKind::Main,
            Self::Sub { .. } => AdKind::Sub,
            Self::Board { .. } => AdKind::Board,
        }
    }

    /// First field that makes the placement unusable, with the reason.
    pub fn invalid_field(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Main {
                image_url,
                link_url,
                ..
            } => blank("image_url", image_url).or_else(|| bad_link(link_url.as_deref())),
            Self::Sub {
                image_url,
                link_url,
                title,
            } => blank("image_url", image_url)
                .or_else(|| blank("title", title))
                .or_else(|| bad_link(link_url.as_deref())),
            Self::Board {
                title,
                body,
                category,
                ..
            } => blank("title", title)
                .or_else(|| blank("body", body))
                .or_else(|| blank("category", category)),
        }
    }
}

fn blank(field: &'static str, value: &str) -> Option<(&'static str, &'static str)> {
    value.trim().is_empty().then_some((field, "must not be empty"))
}

fn bad_link(link: Option<&str>) -> Option<(&'static str, &'static str)> {
    let link = link?.trim();
    if link.starts_with("https://") || link.starts_with("http://") {
        None
    } else {
        Some(("link_url", "must be an http(s) URL"))
    }
}

/// Sales contract backing an ad. Amounts are whole won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdContract {
    pub amount: u64,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub paid: bool,
}

impl AdContract {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.starts_on <= date && date <= self.ends_on
    }
}

/// Admin form input for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdDraft {
    pub advertiser: String,
    pub placement: AdPlacement,
    #[serde(default)]
    pub contract: Option<AdContract>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub union_id: UnionId,
    pub advertiser: String,
    pub placement: AdPlacement,
    pub contract: Option<AdContract>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Ad {
    /// Active and under a contract that runs on `date`. Ads without a
    /// contract are never shown.
    pub fn is_live_on(&self, date: NaiveDate) -> bool {
        self.active
            && self
                .contract
                .as_ref()
                .is_some_and(|contract| contract.covers(date))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BillingSummary {
    pub contracts: usize,
    pub contracted: u64,
    pub paid: u64,
    pub outstanding: u64,
}

impl BillingSummary {
    pub fn from_ads<'a>(ads: impl IntoIterator<Item = &'a Ad>) -> Self {
        ads.into_iter()
            .filter_map(|ad| ad.contract.as_ref())
            .fold(Self::default(), |mut summary, contract| {
                summary.contracts += 1;
                summary.contracted += contract.amount;
                if contract.paid {
                    summary.paid += contract.amount;
                } else {
                    summary.outstanding += contract.amount;
                }
                summary
            })
    }
}
