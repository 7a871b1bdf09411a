use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use super::domain::{AllocationRequest, OwnerId, PropertyUnitId};
use super::repository::OwnershipRepository;
use super::service::{OwnershipError, OwnershipService, ShareConfirmation};
use crate::response;
use crate::workflows::tenancy::UnionId;

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmSharesRequest {
    pub existing_owner_id: OwnerId,
    pub new_owner_id: OwnerId,
    pub allocation: AllocationRequest,
}

/// Router exposing previews, confirmation and the current split of a unit.
pub fn ownership_router<R>(service: Arc<OwnershipService<R>>) -> Router
where
    R: OwnershipRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/unions/:union_id/ownership/preview",
            post(preview_handler::<R>),
        )
        .route(
            "/api/v1/unions/:union_id/units/:unit_id/ownership",
            get(shares_handler::<R>),
        )
        .route(
            "/api/v1/unions/:union_id/units/:unit_id/ownership/confirm",
            post(confirm_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn preview_handler<R>(
    State(service): State<Arc<OwnershipService<R>>>,
    Path(union_id): Path<String>,
    Json(request): Json<AllocationRequest>,
) -> Response
where
    R: OwnershipRepository + 'static,
{
    let allocation = service.preview(&request);
    debug!(union = %union_id, status = ?allocation.status, "ownership preview");
    response::data(StatusCode::OK, allocation)
}

pub(crate) async fn shares_handler<R>(
    State(service): State<Arc<OwnershipService<R>>>,
    Path((union_id, unit_id)): Path<(String, String)>,
) -> Response
where
    R: OwnershipRepository + 'static,
{
    match service.shares(&UnionId(union_id), &PropertyUnitId(unit_id)) {
        Ok(records) => response::items(records),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn confirm_handler<R>(
    State(service): State<Arc<OwnershipService<R>>>,
    Path((union_id, unit_id)): Path<(String, String)>,
    Json(payload): Json<ConfirmSharesRequest>,
) -> Response
where
    R: OwnershipRepository + 'static,
{
    let confirmation = ShareConfirmation {
        union_id: UnionId(union_id),
        property_unit_id: PropertyUnitId(unit_id),
        existing_owner_id: payload.existing_owner_id,
        new_owner_id: payload.new_owner_id,
        request: payload.allocation,
    };

    match service.confirm(confirmation) {
        Ok(confirmed) => response::data(StatusCode::CREATED, confirmed),
        Err(err) => error_response(err),
    }
}

fn error_response(err: OwnershipError) -> Response {
    match err {
        OwnershipError::Unbalanced { .. } | OwnershipError::AlreadyCoOwner(_) => {
            response::error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                err.to_string(),
            )
        }
        OwnershipError::Store(store) => response::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            store.to_string(),
        ),
    }
}
