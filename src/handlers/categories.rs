use super::common::{created_response, success_data, success_message, success_with_message};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::categories::{CreateCategoryRequest, UpdateCategoryRequest},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListQuery {
    pub include_inactive: Option<bool>,
}

async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state
        .services
        .categories
        .list_categories(query.include_inactive.unwrap_or(false))
        .await?;
    Ok(success_data(categories))
}

async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.categories.create_category(payload).await?;
    Ok(created_response(category, "Category created successfully"))
}

async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.categories.get_category(category_id).await?;
    Ok(success_data(category))
}

async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state
        .services
        .categories
        .update_category(category_id, payload)
        .await?;
    Ok(success_with_message(
        category,
        "Category updated successfully",
    ))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.categories.delete_category(category_id).await?;
    Ok(success_message("Category deleted successfully"))
}

async fn list_parent_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let parents = state.services.categories.list_parent_categories().await?;
    let message = format!("Found {} parent categories", parents.len());
    Ok(success_with_message(parents, &message))
}

async fn list_subcategories(
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let subcategories = state
        .services
        .categories
        .list_subcategories(parent_id)
        .await?;
    let message = format!("Found {} subcategories", subcategories.subcategories.len());
    Ok(success_with_message(subcategories, &message))
}

async fn get_category_analytics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let analytics = state.services.categories.get_analytics().await?;
    Ok(success_with_message(
        analytics,
        "Category analytics retrieved successfully",
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(get_category_analytics))
        .route("/parents", get(list_parent_categories))
        .route("/", get(list_categories).post(create_category))
        .route("/:id/subcategories", get(list_subcategories))
        .route(
            "/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}
