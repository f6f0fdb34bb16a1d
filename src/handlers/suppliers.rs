use super::common::{
    created_response, list_response, success_data, success_message, success_with_message,
};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::suppliers::{CreateSupplierRequest, SupplierListFilter, UpdateSupplierRequest},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

async fn list_suppliers(
    State(state): State<AppState>,
    Query(filter): Query<SupplierListFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let (suppliers, pagination) = state.services.suppliers.list_suppliers(filter).await?;
    Ok(list_response(suppliers, pagination))
}

async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.suppliers.create_supplier(payload).await?;
    Ok(created_response(supplier, "Supplier created successfully"))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.suppliers.get_supplier(supplier_id).await?;
    Ok(success_data(supplier))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state
        .services
        .suppliers
        .update_supplier(supplier_id, payload)
        .await?;
    Ok(success_with_message(
        supplier,
        "Supplier updated successfully",
    ))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.delete_supplier(supplier_id).await?;
    Ok(success_message("Supplier deleted successfully"))
}

async fn get_supplier_analytics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let analytics = state.services.suppliers.get_analytics().await?;
    Ok(success_with_message(
        analytics,
        "Supplier analytics retrieved successfully",
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(get_supplier_analytics))
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier)
                .put(update_supplier)
                .delete(delete_supplier),
        )
}
