//! Success envelope shared by every API handler.
//!
//! All responses use `{ "data": ..., "code": ..., "message": ... }`. Use
//! [`ApiResponse::ok`] / [`ApiResponse::created`] instead of ad-hoc
//! `serde_json::json!` bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub code: &'static str,
    pub message: &'static str,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `code: "OK"`.
    pub fn ok(data: T) -> Self {
        Self {
            data,
            code: "OK",
            message: "Success",
            status: StatusCode::OK,
        }
    }

    /// 201 with `code: "CREATED"`.
    pub fn created(data: T) -> Self {
        Self {
            data,
            code: "CREATED",
            message: "Created",
            status: StatusCode::CREATED,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
