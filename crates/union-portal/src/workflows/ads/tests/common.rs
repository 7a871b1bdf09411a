use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use mime::Mime;
use serde_json::Value;

use crate::workflows::ads::domain::{Ad, AdContract, AdDraft, AdId, AdPlacement};
use crate::workflows::ads::media::MediaStore;
use crate::workflows::ads::repository::AdRepository;
use crate::workflows::ads::service::AdAdminService;
use crate::workflows::store::StoreError;
use crate::workflows::tenancy::UnionId;

pub(super) type TestService = AdAdminService<MemoryAds, MemoryMedia>;

pub(super) fn union_id() -> UnionId {
    UnionId::new("mokdong-6")
}

pub(super) fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

pub(super) fn contract(amount: u64, starts_on: &str, ends_on: &str, paid: bool) -> AdContract {
    AdContract {
        amount,
        starts_on: date(starts_on),
        ends_on: date(ends_on),
        document_url: None,
        paid,
    }
}

pub(super) fn main_banner(order: u32, contract: Option<AdContract>) -> AdDraft {
    AdDraft {
        advertiser: "목동공인중개사".to_string(),
        placement: AdPlacement::Main {
            image_url: "https://cdn.example/banner.png".to_string(),
            link_url: Some("https://mokdong-realty.example".to_string()),
            display_order: order,
        },
        contract,
        active: true,
    }
}

pub(super) fn board_post(contract: Option<AdContract>) -> AdDraft {
    AdDraft {
        advertiser: "양천이사".to_string(),
        placement: AdPlacement::Board {
            title: "조합원 이사 할인".to_string(),
            body: "포장이사 10% 할인".to_string(),
            category: "moving".to_string(),
            contact_phone: Some("02-555-0101".to_string()),
        },
        contract,
        active: true,
    }
}

#[derive(Default)]
pub(super) struct MemoryAds {
    rows: Mutex<Vec<Ad>>,
    pub(super) loads: AtomicUsize,
}

impl AdRepository for MemoryAds {
    fn ads(&self, union_id: &UnionId) -> Result<Vec<Ad>, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .expect("ad mutex poisoned")
            .iter()
            .filter(|ad| &ad.union_id == union_id)
            .cloned()
            .collect())
    }

    fn insert(&self, ad: Ad) -> Result<Ad, StoreError> {
        self.rows.lock().expect("ad mutex poisoned").push(ad.clone());
        Ok(ad)
    }

    fn update(&self, ad: Ad) -> Result<Ad, StoreError> {
        let mut rows = self.rows.lock().expect("ad mutex poisoned");
        let slot = rows
            .iter_mut()
            .find(|row| row.union_id == ad.union_id && row.id == ad.id)
            .ok_or(StoreError::NotFound)?;
        *slot = ad.clone();
        Ok(ad)
    }

    fn delete(&self, union_id: &UnionId, id: &AdId) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().expect("ad mutex poisoned");
        let before = rows.len();
        rows.retain(|row| !(&row.union_id == union_id && &row.id == id));
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryMedia {
    pub(super) stored: Mutex<Vec<(String, String, usize)>>,
}

impl MediaStore for MemoryMedia {
    fn put(
        &self,
        union_id: &UnionId,
        file_name: &str,
        content_type: &Mime,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let key = format!("{union_id}/{file_name}");
        self.stored.lock().expect("media mutex poisoned").push((
            key.clone(),
            content_type.to_string(),
            bytes.len(),
        ));
        Ok(format!("https://storage.example/{key}"))
    }
}

pub(super) fn build_service() -> (TestService, Arc<MemoryAds>, Arc<MemoryMedia>) {
    let ads = Arc::new(MemoryAds::default());
    let media = Arc::new(MemoryMedia::default());
    let service = AdAdminService::new(ads.clone(), media.clone());
    (service, ads, media)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
