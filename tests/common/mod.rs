#![allow(dead_code)]

use garment_inventory_api::{
    db::{self, DbConfig, DbPool},
    handlers::AppServices,
    services::categories::{CategoryResponse, CreateCategoryRequest},
    services::orders::{CreateOrderRequest, CustomerInput, OrderItemInput},
    services::products::{CreateProductRequest, ProductResponse},
    services::suppliers::{AddressInput, ContactPersonInput, CreateSupplierRequest, SupplierResponse},
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Test harness backed by an in-memory SQLite database.
///
/// The pool is pinned to a single connection: `sqlite::memory:` databases
/// are per-connection, so a larger pool would split the schema across
/// independent databases.
pub struct TestCtx {
    pub db: DbPool,
    pub services: AppServices,
}

pub async fn setup() -> TestCtx {
    let pool = db::establish_connection_with_config(DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..DbConfig::default()
    })
    .await
    .expect("failed to open in-memory database");
    db::run_migrations(&pool).await.expect("migrations failed");

    TestCtx {
        services: AppServices::new(pool.clone()),
        db: pool,
    }
}

pub async fn seed_supplier(services: &AppServices) -> SupplierResponse {
    services
        .suppliers
        .create_supplier(CreateSupplierRequest {
            name: Some("Mills & Co".into()),
            email: Some(format!("{}@mills.example", Uuid::new_v4())),
            phone: Some("+1 555 010 2030".into()),
            address: Some(AddressInput {
                street: Some("1 Loom Street".into()),
                city: Some("Springfield".into()),
                state: Some("IL".into()),
                zip_code: Some("62701".into()),
                country: Some("USA".into()),
            }),
            contact_person: Some(ContactPersonInput {
                name: Some("Ada Weaver".into()),
                designation: None,
                phone: None,
                email: None,
            }),
            business_license: Some("BL-0001".into()),
            tax_id: None,
            payment_terms: None,
            rating: None,
            is_active: None,
            notes: None,
        })
        .await
        .expect("seed supplier")
}

pub async fn seed_category(services: &AppServices, name: &str) -> CategoryResponse {
    services
        .categories
        .create_category(CreateCategoryRequest {
            name: Some(name.to_string()),
            description: None,
            parent_category: None,
            is_active: None,
            image: None,
        })
        .await
        .expect("seed category")
}

pub async fn seed_product(
    services: &AppServices,
    category_id: Uuid,
    supplier_id: Uuid,
    quantity: i32,
    price: Decimal,
) -> ProductResponse {
    services
        .products
        .create_product(CreateProductRequest {
            name: Some("Denim Jacket".into()),
            description: Some("Classic denim jacket".into()),
            category: Some(category_id),
            supplier: Some(supplier_id),
            sku: Some(format!("SKU-{}", Uuid::new_v4())),
            price: Some(price),
            cost_price: Some(price / Decimal::from(2)),
            quantity: Some(quantity),
            min_stock_level: None,
            size: Some("M".into()),
            color: Some("Blue".into()),
            material: Some("Denim".into()),
            images: None,
            is_active: None,
            tags: None,
        })
        .await
        .expect("seed product")
}

pub fn order_items(product_id: Uuid, quantity: i32, unit_price: Decimal) -> Vec<OrderItemInput> {
    vec![OrderItemInput {
        product: Some(product_id),
        quantity: Some(quantity),
        unit_price: Some(unit_price),
    }]
}

pub fn sale_request(items: Vec<OrderItemInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        order_type: Some("sale".into()),
        supplier: None,
        customer: Some(CustomerInput {
            name: Some("Jamie Buyer".into()),
            email: None,
            phone: None,
            address: None,
        }),
        items: Some(items),
        tax: None,
        discount: None,
        payment_status: None,
        payment_method: None,
        expected_delivery_date: None,
        notes: None,
    }
}

pub fn purchase_request(supplier_id: Uuid, items: Vec<OrderItemInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        order_type: Some("purchase".into()),
        supplier: Some(supplier_id),
        customer: None,
        items: Some(items),
        tax: None,
        discount: None,
        payment_status: None,
        payment_method: None,
        expected_delivery_date: None,
        notes: None,
    }
}
