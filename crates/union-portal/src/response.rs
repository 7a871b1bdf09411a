//! JSON envelopes shared by every route: `success` plus `data`, `items`, or `error`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ItemsEnvelope<T> {
    pub success: bool,
    pub items: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

pub fn data<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(DataEnvelope {
            success: true,
            data,
        }),
    )
        .into_response()
}

pub fn items<T: Serialize>(items: Vec<T>) -> Response {
    (
        StatusCode::OK,
        Json(ItemsEnvelope {
            success: true,
            items,
        }),
    )
        .into_response()
}

pub fn error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
            },
        }),
    )
        .into_response()
}
