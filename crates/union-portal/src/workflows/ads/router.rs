use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AdDraft, AdId};
use super::media::{MediaKind, MediaStore};
use super::repository::AdRepository;
use super::service::{AdAdminService, AdError};
use crate::response;
use crate::workflows::tenancy::UnionId;

#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    /// Defaults to today (UTC).
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

pub fn ad_router<R, S>(service: Arc<AdAdminService<R, S>>) -> Router
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/unions/:union_id/ads",
            get(list_handler::<R, S>).post(create_handler::<R, S>),
        )
        .route(
            "/api/v1/unions/:union_id/ads/billing",
            get(billing_handler::<R, S>),
        )
        .route(
            "/api/v1/unions/:union_id/ads/live",
            get(live_handler::<R, S>),
        )
        .route(
            "/api/v1/unions/:union_id/ads/:ad_id",
            put(update_handler::<R, S>).delete(delete_handler::<R, S>),
        )
        .route(
            "/api/v1/unions/:union_id/ads/media/:kind/:file_name",
            put(upload_handler::<R, S>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<R, S>(
    State(service): State<Arc<AdAdminService<R, S>>>,
    Path(union_id): Path<String>,
) -> Response
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    match service.list(&UnionId(union_id)) {
        Ok(ads) => response::items(ads),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<R, S>(
    State(service): State<Arc<AdAdminService<R, S>>>,
    Path(union_id): Path<String>,
    Json(draft): Json<AdDraft>,
) -> Response
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    match service.create(&UnionId(union_id), draft) {
        Ok(ad) => response::data(StatusCode::CREATED, ad),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<R, S>(
    State(service): State<Arc<AdAdminService<R, S>>>,
    Path((union_id, ad_id)): Path<(String, String)>,
    Json(draft): Json<AdDraft>,
) -> Response
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    match service.update(&UnionId(union_id), &AdId(ad_id), draft) {
        Ok(ad) => response::data(StatusCode::OK, ad),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<R, S>(
    State(service): State<Arc<AdAdminService<R, S>>>,
    Path((union_id, ad_id)): Path<(String, String)>,
) -> Response
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    let id = AdId(ad_id);
    match service.delete(&UnionId(union_id), &id) {
        Ok(()) => response::data(StatusCode::OK, json!({ "deleted": id })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn billing_handler<R, S>(
    State(service): State<Arc<AdAdminService<R, S>>>,
    Path(union_id): Path<String>,
) -> Response
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    match service.billing(&UnionId(union_id)) {
        Ok(summary) => response::data(StatusCode::OK, summary),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn live_handler<R, S>(
    State(service): State<Arc<AdAdminService<R, S>>>,
    Path(union_id): Path<String>,
    Query(query): Query<LiveQuery>,
) -> Response
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    match service.live_on(&UnionId(union_id), date) {
        Ok(ads) => response::items(ads),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn upload_handler<R, S>(
    State(service): State<Arc<AdAdminService<R, S>>>,
    Path((union_id, kind, file_name)): Path<(String, MediaKind, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: AdRepository + 'static,
    S: MediaStore + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match service.upload_media(&UnionId(union_id), kind, &file_name, content_type, &body) {
        Ok(upload) => response::data(StatusCode::CREATED, upload),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AdError) -> Response {
    let message = err.to_string();
    match err {
        AdError::Invalid { .. } | AdError::EmptyUpload => response::error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            message,
        ),
        AdError::NotFound(_) => response::error(StatusCode::NOT_FOUND, "not_found", message),
        AdError::UnsupportedMedia { .. } => response::error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media",
            message,
        ),
        AdError::Store(_) => response::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            message,
        ),
    }
}
