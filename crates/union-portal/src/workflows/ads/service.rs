use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::catalog::AdCatalog;
use super::domain::{Ad, AdDraft, AdId, AdPlacement, BillingSummary};
use super::media::{validate_content_type, MediaKind, MediaStore, MediaUpload};
use super::repository::AdRepository;
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

static AD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_ad_id() -> AdId {
    let id = AD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AdId(format!("ad-{id:06}"))
}

/// Admin operations on a union's ads. Every write invalidates the catalog.
pub struct AdAdminService<R, S> {
    ads: Arc<R>,
    media: Arc<S>,
    catalog: AdCatalog<R>,
}

impl<R, S> AdAdminService<R, S>
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    pub fn new(ads: Arc<R>, media: Arc<S>) -> Self {
        Self {
            catalog: AdCatalog::new(ads.clone()),
            ads,
            media,
        }
    }

    pub fn catalog(&self) -> &AdCatalog<R> {
        &self.catalog
    }

    pub fn list(&self, union_id: &UnionId) -> Result<Vec<Ad>, AdError> {
        Ok(self.catalog.list(union_id)?)
    }

    pub fn create(&self, union_id: &UnionId, draft: AdDraft) -> Result<Ad, AdError> {
        validate(&draft)?;

        let ad = self.ads.insert(Ad {
            id: next_ad_id(),
            union_id: union_id.clone(),
            advertiser: draft.advertiser.trim().to_string(),
            placement: draft.placement,
            contract: draft.contract,
            active: draft.active,
            created_at: Utc::now(),
        });
        self.catalog.invalidate(union_id);
        let ad = ad?;

        info!(union = %union_id, ad = %ad.id, kind = ?ad.placement.kind(), "ad created");
        Ok(ad)
    }

    /// Replace an ad's editable fields. Id, union and creation time stay.
    pub fn update(&self, union_id: &UnionId, id: &AdId, draft: AdDraft) -> Result<Ad, AdError> {
        validate(&draft)?;

        let current = self
            .catalog
            .list(union_id)?
            .into_iter()
            .find(|ad| &ad.id == id)
            .ok_or_else(|| AdError::NotFound(id.clone()))?;

        let updated = self.ads.update(Ad {
            advertiser: draft.advertiser.trim().to_string(),
            placement: draft.placement,
            contract: draft.contract,
            active: draft.active,
            ..current
        });
        self.catalog.invalidate(union_id);

        let ad = updated.map_err(|err| not_found_as(err, id))?;
        info!(union = %union_id, ad = %ad.id, "ad updated");
        Ok(ad)
    }

    pub fn delete(&self, union_id: &UnionId, id: &AdId) -> Result<(), AdError> {
        let deleted = self.ads.delete(union_id, id);
        self.catalog.invalidate(union_id);
        deleted.map_err(|err| not_found_as(err, id))?;

        info!(union = %union_id, ad = %id, "ad deleted");
        Ok(())
    }

    /// Ads to show on `date`, MAIN banners first in display order.
    pub fn live_on(&self, union_id: &UnionId, date: NaiveDate) -> Result<Vec<Ad>, AdError> {
        let mut live: Vec<Ad> = self
            .catalog
            .list(union_id)?
            .into_iter()
            .filter(|ad| ad.is_live_on(date))
            .collect();
        live.sort_by_key(|ad| match &ad.placement {
            AdPlacement::Main { display_order, .. } => (0, *display_order),
            AdPlacement::Sub { .. } => (1, 0),
            AdPlacement::Board { .. } => (2, 0),
        });
        Ok(live)
    }

    pub fn billing(&self, union_id: &UnionId) -> Result<BillingSummary, AdError> {
        let ads = self.catalog.list(union_id)?;
        Ok(BillingSummary::from_ads(&ads))
    }

    pub fn upload_media(
        &self,
        union_id: &UnionId,
        kind: MediaKind,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<MediaUpload, AdError> {
        if bytes.is_empty() {
            return Err(AdError::EmptyUpload);
        }
        if file_name.trim().is_empty() {
            return Err(AdError::Invalid {
                field: "file_name",
                reason: "must not be empty",
            });
        }
        let mime = validate_content_type(kind, content_type).ok_or_else(|| {
            AdError::UnsupportedMedia {
                content_type: content_type.to_string(),
                expected: kind.expected(),
            }
        })?;

        let url = self.media.put(union_id, file_name.trim(), &mime, bytes)?;
        info!(union = %union_id, kind = ?kind, size = bytes.len(), "media uploaded");
        Ok(MediaUpload {
            url,
            content_type: mime.essence_str().to_string(),
            size: bytes.len(),
        })
    }
}

fn validate(draft: &AdDraft) -> Result<(), AdError> {
    if draft.advertiser.trim().is_empty() {
        return Err(AdError::Invalid {
            field: "advertiser",
            reason: "must not be empty",
        });
    }
    if let Some((field, reason)) = draft.placement.invalid_field() {
        return Err(AdError::Invalid { field, reason });
    }
    if let Some(contract) = &draft.contract {
        if contract.ends_on < contract.starts_on {
            return Err(AdError::Invalid {
                field: "contract.ends_on",
                reason: "must not be before starts_on",
            });
        }
    }
    Ok(())
}

fn not_found_as(err: StoreError, id: &AdId) -> AdError {
    match err {
        StoreError::NotFound => AdError::NotFound(id.clone()),
        other => AdError::Store(other),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdError {
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[error("ad {0} not found")]
    NotFound(AdId),
    #[error("unsupported content type '{content_type}', expected {expected}")]
    UnsupportedMedia {
        content_type: String,
        expected: &'static str,
    },
    #[error("uploaded file is empty")]
    EmptyUpload,
    #[error(transparent)]
    Store(#[from] StoreError),
}
