use super::common::{
    created_response, list_response, success_data, success_message, success_with_message,
};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::products::{CreateProductRequest, ProductListFilter, UpdateProductRequest},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductListFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let (products, pagination) = state.services.products.list_products(filter).await?;
    Ok(list_response(products, pagination))
}

async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.create_product(payload).await?;
    Ok(created_response(product, "Product created successfully"))
}

async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.get_product(product_id).await?;
    Ok(success_data(product))
}

async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .products
        .update_product(product_id, payload)
        .await?;
    Ok(success_with_message(product, "Product updated successfully"))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete_product(product_id).await?;
    Ok(success_message("Product deleted successfully"))
}

async fn list_low_stock(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.list_low_stock().await?;
    let message = format!("Found {} low stock products", products.len());
    Ok(success_with_message(products, &message))
}

async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.list_by_category(category_id).await?;
    Ok(success_data(products))
}

async fn get_product_analytics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let analytics = state.services.products.get_analytics().await?;
    Ok(success_with_message(
        analytics,
        "Product analytics retrieved successfully",
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(get_product_analytics))
        .route("/low-stock", get(list_low_stock))
        .route("/category/:category_id", get(list_by_category))
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}
