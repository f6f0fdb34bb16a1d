mod common;

use common::*;
use garment_inventory_api::errors::ServiceError;
use garment_inventory_api::services::categories::{CreateCategoryRequest, UpdateCategoryRequest};
use garment_inventory_api::services::products::CreateProductRequest;
use garment_inventory_api::services::suppliers::{CreateSupplierRequest, SupplierListFilter};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn validation_message(err: ServiceError) -> String {
    match err {
        ServiceError::ValidationError(m) => m,
        other => panic!("expected validation error, got {other:?}"),
    }
}

fn conflict_message(err: ServiceError) -> String {
    match err {
        ServiceError::Conflict(m) => m,
        other => panic!("expected conflict error, got {other:?}"),
    }
}

#[tokio::test]
async fn product_create_validation_messages() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;

    let err = ctx
        .services
        .products
        .create_product(CreateProductRequest::default())
        .await
        .unwrap_err();
    assert_eq!(validation_message(err), "Name and SKU are required");

    let base = |quantity| CreateProductRequest {
        name: Some("Wool Coat".into()),
        sku: Some(format!("SKU-{}", Uuid::new_v4())),
        price: Some(dec!(120)),
        cost_price: Some(dec!(60)),
        quantity: Some(quantity),
        category: Some(category.id),
        supplier: Some(supplier.id),
        size: Some("L".into()),
        color: Some("Grey".into()),
        material: Some("Wool".into()),
        description: Some("Heavy winter coat".into()),
        ..Default::default()
    };

    let mut request = base(5);
    request.price = Some(dec!(0));
    let err = ctx.services.products.create_product(request).await.unwrap_err();
    assert_eq!(validation_message(err), "Price must be greater than 0");

    let mut request = base(5);
    request.quantity = Some(-1);
    let err = ctx.services.products.create_product(request).await.unwrap_err();
    assert_eq!(validation_message(err), "Quantity cannot be negative");

    let mut request = base(5);
    request.category = None;
    let err = ctx.services.products.create_product(request).await.unwrap_err();
    assert_eq!(validation_message(err), "Category is required");

    let mut request = base(5);
    request.size = Some("XXS".into());
    let err = ctx.services.products.create_product(request).await.unwrap_err();
    assert!(validation_message(err).starts_with("Invalid size. Must be one of:"));

    let mut request = base(5);
    request.images = Some(vec!["front.jpg".into(), "back.bmp".into()]);
    let err = ctx.services.products.create_product(request).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Invalid image format. Only jpg, jpeg, png, gif are allowed"
    );

    let created = ctx.services.products.create_product(base(5)).await.unwrap();
    assert_eq!(created.quantity, 5);
    assert_eq!(created.min_stock_level, 10);
    assert!(created.is_low_stock);
    assert_eq!(created.category.as_ref().map(|c| c.id), Some(category.id));
}

#[tokio::test]
async fn duplicate_sku_is_rejected() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;

    let request = || CreateProductRequest {
        name: Some("Wool Coat".into()),
        sku: Some("SKU-FIXED".into()),
        price: Some(dec!(120)),
        cost_price: Some(dec!(60)),
        quantity: Some(5),
        category: Some(category.id),
        supplier: Some(supplier.id),
        size: Some("L".into()),
        color: Some("Grey".into()),
        material: Some("Wool".into()),
        description: Some("Heavy winter coat".into()),
        ..Default::default()
    };

    ctx.services.products.create_product(request()).await.unwrap();
    let err = ctx.services.products.create_product(request()).await.unwrap_err();
    assert_eq!(conflict_message(err), "SKU already exists");
}

#[tokio::test]
async fn low_stock_listing_is_ordered_by_quantity() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;

    // Default minimum stock level is 10.
    seed_product(&ctx.services, category.id, supplier.id, 7, dec!(40)).await;
    seed_product(&ctx.services, category.id, supplier.id, 3, dec!(40)).await;
    seed_product(&ctx.services, category.id, supplier.id, 50, dec!(40)).await;

    let low = ctx.services.products.list_low_stock().await.unwrap();
    assert_eq!(low.len(), 2);
    assert_eq!(low[0].quantity, 3);
    assert_eq!(low[1].quantity, 7);
    assert!(low.iter().all(|p| p.is_low_stock));
}

#[tokio::test]
async fn product_analytics_counts_stock_buckets() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;

    seed_product(&ctx.services, category.id, supplier.id, 0, dec!(40)).await;
    seed_product(&ctx.services, category.id, supplier.id, 4, dec!(40)).await;
    seed_product(&ctx.services, category.id, supplier.id, 30, dec!(40)).await;

    let analytics = ctx.services.products.get_analytics().await.unwrap();
    assert_eq!(analytics.total_products, 3);
    assert_eq!(analytics.out_of_stock_products, 1);
    assert_eq!(analytics.low_stock_products, 2);
    assert_eq!(analytics.in_stock_products, 2);
    assert_eq!(analytics.total_stock, 34);
}

#[tokio::test]
async fn category_hierarchy_is_limited_to_two_levels() {
    let ctx = setup().await;
    let parent = seed_category(&ctx.services, "Clothing").await;

    let sub = ctx
        .services
        .categories
        .create_category(CreateCategoryRequest {
            name: Some("Jackets".into()),
            parent_category: Some(parent.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(sub.parent_category.as_ref().map(|p| p.id), Some(parent.id));

    let err = ctx
        .services
        .categories
        .create_category(CreateCategoryRequest {
            name: Some("Denim Jackets".into()),
            parent_category: Some(sub.id),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(
        validation_message(err),
        "Cannot create subcategory under another subcategory. Maximum 2-level hierarchy allowed"
    );

    let listed = ctx
        .services
        .categories
        .list_subcategories(parent.id)
        .await
        .unwrap();
    assert_eq!(listed.parent_category.id, parent.id);
    assert_eq!(listed.subcategories.len(), 1);
    assert_eq!(listed.subcategories[0].name, "Jackets");

    let parents = ctx.services.categories.list_parent_categories().await.unwrap();
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0].name, "Clothing");
}

#[tokio::test]
async fn duplicate_category_name_is_rejected() {
    let ctx = setup().await;
    seed_category(&ctx.services, "Clothing").await;

    let err = ctx
        .services
        .categories
        .create_category(CreateCategoryRequest {
            name: Some("Clothing".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(conflict_message(err), "Category name already exists");
}

#[tokio::test]
async fn category_cannot_be_its_own_parent() {
    let ctx = setup().await;
    let category = seed_category(&ctx.services, "Clothing").await;

    let err = ctx
        .services
        .categories
        .update_category(
            category.id,
            UpdateCategoryRequest {
                parent_category: Some(Some(category.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(validation_message(err), "Category cannot be its own parent");
}

#[tokio::test]
async fn category_delete_is_blocked_by_children_and_products() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let parent = seed_category(&ctx.services, "Clothing").await;
    let sub = ctx
        .services
        .categories
        .create_category(CreateCategoryRequest {
            name: Some("Jackets".into()),
            parent_category: Some(parent.id),
            ..Default::default()
        })
        .await
        .unwrap();

    let err = ctx.services.categories.delete_category(parent.id).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Cannot delete category that has subcategories. Delete subcategories first."
    );

    seed_product(&ctx.services, sub.id, supplier.id, 5, dec!(40)).await;
    let err = ctx.services.categories.delete_category(sub.id).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Cannot delete category that has 1 products. Move or delete products first."
    );

    // An empty leaf deletes cleanly.
    let leaf = seed_category(&ctx.services, "Accessories").await;
    ctx.services.categories.delete_category(leaf.id).await.unwrap();
    let err = ctx.services.categories.get_category(leaf.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn supplier_validation_and_duplicate_email() {
    let ctx = setup().await;

    let err = ctx
        .services
        .suppliers
        .create_supplier(CreateSupplierRequest::default())
        .await
        .unwrap_err();
    assert_eq!(validation_message(err), "Supplier name is required");

    let first = seed_supplier(&ctx.services).await;
    let err = ctx
        .services
        .suppliers
        .create_supplier(CreateSupplierRequest {
            name: Some("Copycat Mills".into()),
            email: Some(first.email.clone()),
            phone: Some("+1 555 010 9999".into()),
            business_license: Some("BL-0002".into()),
            address: Some(garment_inventory_api::services::suppliers::AddressInput {
                street: Some("2 Loom Street".into()),
                city: Some("Springfield".into()),
                state: Some("IL".into()),
                zip_code: Some("62701".into()),
                country: Some("USA".into()),
            }),
            contact_person: Some(garment_inventory_api::services::suppliers::ContactPersonInput {
                name: Some("Bo Spinner".into()),
                designation: None,
                phone: None,
                email: None,
            }),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(conflict_message(err), "Email already exists");
}

#[tokio::test]
async fn supplier_list_defaults_to_active_only() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    ctx.services
        .suppliers
        .update_supplier(
            supplier.id,
            garment_inventory_api::services::suppliers::UpdateSupplierRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (active, _) = ctx
        .services
        .suppliers
        .list_suppliers(SupplierListFilter::default())
        .await
        .unwrap();
    assert!(active.is_empty());

    let (inactive, pagination) = ctx
        .services
        .suppliers
        .list_suppliers(SupplierListFilter {
            is_active: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(pagination.total, 1);
}

#[tokio::test]
async fn system_reports_reflect_seeded_data() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 20, dec!(50)).await;

    let order = ctx
        .services
        .orders
        .create_order(sale_request(order_items(product.id, 2, dec!(50))))
        .await
        .unwrap();

    let totals = ctx.services.reports.total_doc_overview().await.unwrap();
    assert_eq!(totals.products, 1);
    assert_eq!(totals.categories, 1);
    assert_eq!(totals.suppliers, 1);
    assert_eq!(totals.orders, 1);

    // Revenue only counts delivered sale orders.
    let overview = ctx.services.reports.overview().await.unwrap();
    assert_eq!(overview.orders.pending, 1);
    assert_eq!(overview.revenue.total, dec!(0));

    ctx.services
        .orders
        .update_order_status(order.id, Some("delivered".into()))
        .await
        .unwrap();

    let overview = ctx.services.reports.overview().await.unwrap();
    assert_eq!(overview.orders.delivered, 1);
    assert_eq!(overview.orders.sale, 1);
    assert_eq!(overview.revenue.total, dec!(100));
    assert_eq!(overview.revenue.this_month, dec!(100));

    let health = ctx.services.reports.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.database, "connected");
}
