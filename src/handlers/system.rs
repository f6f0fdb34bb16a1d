use super::common::success_data;
use crate::{errors::ServiceError, handlers::AppState};
use axum::{extract::State, response::IntoResponse, routing::get, Router};

async fn total_doc_overview(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let overview = state.services.reports.total_doc_overview().await?;
    Ok(success_data(overview))
}

async fn overview(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let overview = state.services.reports.overview().await?;
    Ok(success_data(overview))
}

async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.reports.health().await?;
    Ok(success_data(report))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/totaldoc", get(total_doc_overview))
        .route("/overview", get(overview))
        .route("/health", get(health))
}
