mod common;

use common::*;
use garment_inventory_api::errors::ServiceError;
use garment_inventory_api::services::orders::OrderListFilter;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn validation_message(err: ServiceError) -> String {
    match err {
        ServiceError::ValidationError(m) => m,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn purchase_order_increments_stock() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 5, dec!(60)).await;

    let order = ctx
        .services
        .orders
        .create_order(purchase_request(
            supplier.id,
            order_items(product.id, 7, dec!(30)),
        ))
        .await
        .expect("purchase order");

    assert!(order.order_number.starts_with("PO-"));
    assert_eq!(order.status, "pending");
    assert_eq!(order.subtotal, dec!(210));
    assert_eq!(order.total, dec!(210));
    assert_eq!(order.supplier.as_ref().map(|s| s.id), Some(supplier.id));

    let reloaded = ctx.services.products.get_product(product.id).await.unwrap();
    assert_eq!(reloaded.quantity, 12);
}

#[tokio::test]
async fn sale_order_decrements_stock_and_derives_totals() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 10, dec!(50)).await;

    let mut request = sale_request(order_items(product.id, 2, dec!(50)));
    request.tax = Some(dec!(5.50));
    request.discount = Some(dec!(0.50));

    let order = ctx.services.orders.create_order(request).await.unwrap();

    assert!(order.order_number.starts_with("SO-"));
    assert_eq!(order.subtotal, dec!(100));
    assert_eq!(order.total, dec!(105.00));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].total_price, dec!(100));
    assert_eq!(
        order.items[0].product.as_ref().map(|p| p.id),
        Some(product.id)
    );

    let reloaded = ctx.services.products.get_product(product.id).await.unwrap();
    assert_eq!(reloaded.quantity, 8);
}

#[tokio::test]
async fn insufficient_stock_rejects_and_leaves_no_trace() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 5, dec!(50)).await;

    let err = ctx
        .services
        .orders
        .create_order(sale_request(order_items(product.id, 8, dec!(50))))
        .await
        .unwrap_err();
    assert_eq!(
        validation_message(err),
        "Insufficient stock for product: Denim Jacket. Available: 5, Required: 8"
    );

    // Nothing persisted, stock untouched.
    let reloaded = ctx.services.products.get_product(product.id).await.unwrap();
    assert_eq!(reloaded.quantity, 5);
    let (orders, pagination) = ctx
        .services
        .orders
        .list_orders(OrderListFilter::default())
        .await
        .unwrap();
    assert!(orders.is_empty());
    assert_eq!(pagination.total, 0);
}

#[tokio::test]
async fn create_order_validation_sequence() {
    let ctx = setup().await;

    let mut request = sale_request(vec![]);
    request.order_type = None;
    let err = ctx.services.orders.create_order(request).await.unwrap_err();
    assert_eq!(validation_message(err), "Order type is required");

    let mut request = sale_request(vec![]);
    request.order_type = Some("refund".into());
    let err = ctx.services.orders.create_order(request).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Order type must be either purchase or sale"
    );

    let err = ctx
        .services
        .orders
        .create_order(sale_request(vec![]))
        .await
        .unwrap_err();
    assert_eq!(validation_message(err), "Order must have at least one item");

    let missing = Uuid::new_v4();
    let err = ctx
        .services
        .orders
        .create_order(sale_request(order_items(missing, 1, dec!(10))))
        .await
        .unwrap_err();
    assert_eq!(
        validation_message(err),
        format!("Product not found: {missing}")
    );
}

#[tokio::test]
async fn purchase_order_requires_supplier() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 5, dec!(50)).await;

    let mut request = purchase_request(supplier.id, order_items(product.id, 1, dec!(10)));
    request.supplier = None;
    let err = ctx.services.orders.create_order(request).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Supplier is required for purchase orders"
    );
}

#[tokio::test]
async fn sale_order_requires_customer_name() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 5, dec!(50)).await;

    let mut request = sale_request(order_items(product.id, 1, dec!(10)));
    request.customer = None;
    let err = ctx.services.orders.create_order(request).await.unwrap_err();
    assert_eq!(
        validation_message(err),
        "Customer name is required for sale orders"
    );
}

#[tokio::test]
async fn status_update_validates_enum_and_existence() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 5, dec!(50)).await;

    let order = ctx
        .services
        .orders
        .create_order(sale_request(order_items(product.id, 1, dec!(10))))
        .await
        .unwrap();

    let err = ctx
        .services
        .orders
        .update_order_status(order.id, None)
        .await
        .unwrap_err();
    assert_eq!(validation_message(err), "Status is required");

    let err = ctx
        .services
        .orders
        .update_order_status(order.id, Some("archived".into()))
        .await
        .unwrap_err();
    assert_eq!(
        validation_message(err),
        "Invalid status. Must be one of: pending, confirmed, processing, shipped, delivered, cancelled"
    );

    let updated = ctx
        .services
        .orders
        .update_order_status(order.id, Some("shipped".into()))
        .await
        .unwrap();
    assert_eq!(updated.status, "shipped");

    // Statuses may be overwritten freely, including leaving terminal ones.
    let updated = ctx
        .services
        .orders
        .update_order_status(order.id, Some("cancelled".into()))
        .await
        .unwrap();
    assert_eq!(updated.status, "cancelled");

    let err = ctx
        .services
        .orders
        .update_order_status(Uuid::new_v4(), Some("pending".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn update_recomputes_total_from_stored_subtotal() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 10, dec!(50)).await;

    let order = ctx
        .services
        .orders
        .create_order(sale_request(order_items(product.id, 2, dec!(50))))
        .await
        .unwrap();
    assert_eq!(order.total, dec!(100));

    let updated = ctx
        .services
        .orders
        .update_order(
            order.id,
            garment_inventory_api::services::orders::UpdateOrderRequest {
                tax: Some(dec!(10)),
                discount: Some(dec!(2.50)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.subtotal, dec!(100));
    assert_eq!(updated.total, dec!(107.50));
}

#[tokio::test]
async fn delete_order_does_not_restore_stock() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 10, dec!(50)).await;

    let order = ctx
        .services
        .orders
        .create_order(sale_request(order_items(product.id, 4, dec!(50))))
        .await
        .unwrap();

    ctx.services.orders.delete_order(order.id).await.unwrap();

    let err = ctx.services.orders.get_order(order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let reloaded = ctx.services.products.get_product(product.id).await.unwrap();
    assert_eq!(reloaded.quantity, 6);
}

#[tokio::test]
async fn list_orders_filters_and_paginates() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 100, dec!(50)).await;

    for _ in 0..2 {
        ctx.services
            .orders
            .create_order(sale_request(order_items(product.id, 1, dec!(50))))
            .await
            .unwrap();
    }
    ctx.services
        .orders
        .create_order(purchase_request(
            supplier.id,
            order_items(product.id, 5, dec!(20)),
        ))
        .await
        .unwrap();

    let (sales, pagination) = ctx
        .services
        .orders
        .list_orders(OrderListFilter {
            order_type: Some("sale".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(pagination.total, 2);
    assert!(sales.iter().all(|o| o.order_type == "sale"));

    let (page, pagination) = ctx
        .services
        .orders
        .list_orders(OrderListFilter {
            page: Some(1),
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(pagination.total, 3);
    assert_eq!(pagination.pages, 2);
}

#[tokio::test]
async fn analytics_reflect_orders() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 50, dec!(50)).await;

    ctx.services
        .orders
        .create_order(sale_request(order_items(product.id, 2, dec!(50))))
        .await
        .unwrap();
    ctx.services
        .orders
        .create_order(purchase_request(
            supplier.id,
            order_items(product.id, 2, dec!(20)),
        ))
        .await
        .unwrap();

    let analytics = ctx.services.orders.get_analytics().await.unwrap();
    assert_eq!(analytics.total_orders, 2);
    assert_eq!(analytics.total_sales, 1);
    assert_eq!(analytics.total_purchases, 1);
    assert_eq!(analytics.total_sales_revenue, dec!(100.00));
    assert_eq!(analytics.total_purchase_cost, dec!(40.00));
    assert_eq!(analytics.total_profit, dec!(60.00));
    assert_eq!(analytics.profit_margin, 60);
    assert_eq!(analytics.sales_vs_purchases_ratio, dec!(1.00));
}

#[tokio::test]
async fn rapid_order_creation_never_collides_on_order_number() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 500, dec!(20)).await;

    // A burst of creates lands many orders in the same millisecond; each
    // must still succeed with a distinct order number.
    let mut numbers = std::collections::HashSet::new();
    for _ in 0..50 {
        let order = ctx
            .services
            .orders
            .create_order(purchase_request(
                supplier.id,
                order_items(product.id, 1, dec!(5)),
            ))
            .await
            .expect("burst create");
        assert!(order.order_number.starts_with("PO-"));
        assert!(numbers.insert(order.order_number));
    }

    let (_, pagination) = ctx
        .services
        .orders
        .list_orders(OrderListFilter::default())
        .await
        .unwrap();
    assert_eq!(pagination.total, 50);
}

#[tokio::test]
async fn concurrent_sales_never_oversell() {
    let ctx = setup().await;
    let supplier = seed_supplier(&ctx.services).await;
    let category = seed_category(&ctx.services, "Outerwear").await;
    let product = seed_product(&ctx.services, category.id, supplier.id, 10, dec!(50)).await;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let orders = ctx.services.orders.clone();
        let product_id = product.id;
        tasks.push(tokio::spawn(async move {
            orders
                .create_order(sale_request(order_items(product_id, 1, dec!(50))))
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 10);
    let reloaded = ctx.services.products.get_product(product.id).await.unwrap();
    assert_eq!(reloaded.quantity, 0);

    let (_, pagination) = ctx
        .services
        .orders
        .list_orders(OrderListFilter::default())
        .await
        .unwrap();
    assert_eq!(pagination.total, 10);
}
