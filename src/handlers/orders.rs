use super::common::{
    created_response, list_response, success_data, success_message, success_with_message,
};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::orders::{CreateOrderRequest, OrderListFilter, UpdateOrderRequest},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: Option<String>,
}

async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderListFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let (orders, pagination) = state.services.orders.list_orders(filter).await?;
    Ok(list_response(orders, pagination))
}

async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.create_order(payload).await?;
    Ok(created_response(order, "Order created successfully"))
}

async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get_order(order_id).await?;
    Ok(success_data(order))
}

async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.update_order(order_id, payload).await?;
    Ok(success_with_message(order, "Order updated successfully"))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete_order(order_id).await?;
    Ok(success_message("Order deleted successfully"))
}

async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .update_order_status(order_id, payload.status)
        .await?;
    Ok(success_with_message(
        order,
        "Order status updated successfully",
    ))
}

async fn get_order_analytics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let analytics = state.services.orders.get_analytics().await?;
    Ok(success_with_message(
        analytics,
        "Order analytics retrieved successfully",
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(get_order_analytics))
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
        .route("/:id/status", put(update_order_status))
}
