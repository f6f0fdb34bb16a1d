//! Response envelope helpers shared by every handler.
//!
//! Success bodies carry `{"success": true, ...}`; list endpoints attach
//! the pagination block alongside the data.

use crate::services::Pagination;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

/// 200 with `{"success": true, "data": ...}`.
pub fn success_data<T: Serialize>(data: T) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": data,
    }))
}

/// 200 with a data payload and a human-readable message.
pub fn success_with_message<T: Serialize>(data: T, message: &str) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": data,
        "message": message,
    }))
}

/// 200 with only a message, for deletes.
pub fn success_message(message: &str) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": message,
    }))
}

/// 201 with the created resource and a message.
pub fn created_response<T: Serialize>(data: T, message: &str) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": message,
            "data": data,
        })),
    )
}

/// 200 list body with the documented pagination block.
pub fn list_response<T: Serialize>(data: Vec<T>, pagination: Pagination) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": data,
        "pagination": pagination,
    }))
}
