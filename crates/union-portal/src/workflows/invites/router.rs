use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::InviteRecipient;
use super::repository::InviteRepository;
use super::service::{InviteError, InviteService};
use crate::response;
use crate::workflows::notifications::{NotificationError, NotificationSender};
use crate::workflows::parcels::MemberRepository;
use crate::workflows::tenancy::UnionId;

#[derive(Debug, Deserialize)]
pub struct BulkInviteRequest {
    /// Shown in the invite message; defaults to the union id.
    #[serde(default)]
    pub union_name: Option<String>,
    pub recipients: Vec<InviteRecipient>,
}

pub fn invite_router<R, M, S>(service: Arc<InviteService<R, M, S>>) -> Router
where
    R: InviteRepository + 'static,
    M: MemberRepository + 'static,
    S: NotificationSender + 'static,
{
    Router::new()
        .route(
            "/api/v1/unions/:union_id/invites",
            get(list_handler::<R, M, S>).post(bulk_invite_handler::<R, M, S>),
        )
        .route(
            "/api/v1/unions/:union_id/invites/sync",
            post(sync_handler::<R, M, S>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<R, M, S>(
    State(service): State<Arc<InviteService<R, M, S>>>,
    Path(union_id): Path<String>,
) -> Response
where
    R: InviteRepository + 'static,
    M: MemberRepository + 'static,
    S: NotificationSender + 'static,
{
    match service.list(&UnionId(union_id)) {
        Ok(invites) => response::items(invites),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_invite_handler<R, M, S>(
    State(service): State<Arc<InviteService<R, M, S>>>,
    Path(union_id): Path<String>,
    Json(payload): Json<BulkInviteRequest>,
) -> Response
where
    R: InviteRepository + 'static,
    M: MemberRepository + 'static,
    S: NotificationSender + 'static,
{
    let union_name = payload.union_name.unwrap_or_else(|| union_id.clone());
    match service.bulk_invite(&UnionId(union_id), &union_name, payload.recipients) {
        Ok(summary) => response::data(StatusCode::CREATED, summary),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sync_handler<R, M, S>(
    State(service): State<Arc<InviteService<R, M, S>>>,
    Path(union_id): Path<String>,
) -> Response
where
    R: InviteRepository + 'static,
    M: MemberRepository + 'static,
    S: NotificationSender + 'static,
{
    match service.sync(&UnionId(union_id)) {
        Ok(summary) => response::data(StatusCode::OK, summary),
        Err(err) => error_response(err),
    }
}

fn error_response(err: InviteError) -> Response {
    let message = err.to_string();
    match err {
        InviteError::NoRecipients | InviteError::MissingField(_) => response::error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            message,
        ),
        InviteError::Notification(NotificationError::MissingTemplate) => response::error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            message,
        ),
        InviteError::Notification(NotificationError::Transport(_)) => {
            response::error(StatusCode::BAD_GATEWAY, "notification_error", message)
        }
        InviteError::Store(_) => response::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            message,
        ),
    }
}
