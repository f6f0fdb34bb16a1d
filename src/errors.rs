use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde_json::json;

/// Error type shared by all services.
///
/// `status_code()` / `response_body()` are the single source of truth for
/// mapping errors onto the HTTP surface: validation and uniqueness
/// conflicts surface as 400 with the business message, missing resources
/// as 404, and anything infrastructural as a 500 that hides nothing but
/// wraps the raw error under a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    /// Unique-constraint violations (order number, sku, email, category
    /// name). Reported as 400 with the specific message, matching the
    /// documented wire contract.
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the JSON error body. Infrastructure failures keep the
    /// generic message and attach the underlying error separately.
    pub fn response_body(&self) -> serde_json::Value {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => json!({
                "success": false,
                "message": "Internal server error",
                "error": self.to_string(),
            }),
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        }
    }

    /// Maps a database error to a uniqueness conflict when it is one,
    /// otherwise wraps it as a database error.
    pub fn from_db_err(err: DbErr, conflict_message: &str) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict(conflict_message.to_string())
            }
            _ => Self::DatabaseError(err),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(first_validation_message(&err))
    }
}

/// Extracts a single human-readable message from validator output; the
/// validation contract is fail-fast, so only one message is reported.
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for field '{}'", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Validation failed".to_string())
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.response_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_bad_request() {
        let err = ServiceError::ValidationError("Order must have at least one item".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.response_body();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Order must have at least one item");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ServiceError::NotFound("Order not found".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.response_body()["message"], "Order not found");
    }

    #[test]
    fn conflict_maps_to_bad_request_with_specific_message() {
        let err = ServiceError::Conflict("SKU already exists".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.response_body()["message"], "SKU already exists");
    }

    #[test]
    fn database_error_hides_behind_generic_message() {
        let err = ServiceError::DatabaseError(DbErr::Custom("connection reset".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.response_body();
        assert_eq!(body["message"], "Internal server error");
        assert!(body["error"].as_str().unwrap().contains("connection reset"));
    }
}
