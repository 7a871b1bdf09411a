use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use super::domain::MemberMatchRow;
use super::parser::parse_member_rows;
use super::repository::{MemberRepository, ParcelDirectory};
use super::service::{MatchingError, MemberMatchingService};
use crate::response;
use crate::workflows::tenancy::UnionId;

#[derive(Debug, Deserialize)]
pub struct MatchAddressRequest {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportMembersRequest {
    pub csv: String,
}

/// Router exposing address lookup, single registration and spreadsheet import.
pub fn member_router<P, M>(service: Arc<MemberMatchingService<P, M>>) -> Router
where
    P: ParcelDirectory + 'static,
    M: MemberRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/unions/:union_id/members/match",
            post(match_handler::<P, M>),
        )
        .route(
            "/api/v1/unions/:union_id/members/register",
            post(register_handler::<P, M>),
        )
        .route(
            "/api/v1/unions/:union_id/members/import",
            post(import_handler::<P, M>),
        )
        .with_state(service)
}

pub(crate) async fn match_handler<P, M>(
    State(service): State<Arc<MemberMatchingService<P, M>>>,
    Path(union_id): Path<String>,
    Json(payload): Json<MatchAddressRequest>,
) -> Response
where
    P: ParcelDirectory + 'static,
    M: MemberRepository + 'static,
{
    match service.match_address(&UnionId(union_id), &payload.address) {
        Ok(found) => response::data(StatusCode::OK, found),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn register_handler<P, M>(
    State(service): State<Arc<MemberMatchingService<P, M>>>,
    Path(union_id): Path<String>,
    Json(row): Json<MemberMatchRow>,
) -> Response
where
    P: ParcelDirectory + 'static,
    M: MemberRepository + 'static,
{
    match service.register(&UnionId(union_id), row) {
        Ok(outcome) => response::data(StatusCode::CREATED, outcome),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn import_handler<P, M>(
    State(service): State<Arc<MemberMatchingService<P, M>>>,
    Path(union_id): Path<String>,
    Json(payload): Json<ImportMembersRequest>,
) -> Response
where
    P: ParcelDirectory + 'static,
    M: MemberRepository + 'static,
{
    let rows = match parse_member_rows(Cursor::new(payload.csv.into_bytes())) {
        Ok(rows) => rows,
        Err(err) => {
            return response::error(
                StatusCode::BAD_REQUEST,
                "invalid_spreadsheet",
                err.to_string(),
            )
        }
    };

    let union_id = UnionId(union_id);
    let report = service.import(&union_id, rows, |progress| {
        debug!(
            union = %union_id,
            processed = progress.processed,
            total = progress.total,
            "member import progress"
        );
    });
    response::data(StatusCode::OK, report)
}

fn error_response(err: MatchingError) -> Response {
    match err {
        MatchingError::MissingField(_) => response::error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            err.to_string(),
        ),
        MatchingError::DuplicateClaim { .. } => {
            response::error(StatusCode::CONFLICT, "duplicate_claim", err.to_string())
        }
        MatchingError::Store(store) => response::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            store.to_string(),
        ),
    }
}
