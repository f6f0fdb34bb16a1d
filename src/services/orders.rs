use crate::{
    db::DbPool,
    entities::{order, order_item, product, supplier},
    errors::ServiceError,
    models::{variants_list, OrderStatus, OrderType, PaymentMethod, PaymentStatus},
    services::Pagination,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// One line item as submitted by the client. Every field is optional so
/// the service can report the documented message for whichever piece is
/// missing instead of a generic deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub supplier: Option<Uuid>,
    pub customer: Option<CustomerInput>,
    pub items: Option<Vec<OrderItemInput>>,
    pub tax: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Updatable order fields. Type and line items are immutable after
/// creation because their stock adjustments have already been applied.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub supplier: Option<Uuid>,
    pub customer: Option<CustomerInput>,
    pub tax: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListFilter {
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
}

#[derive(Debug, Serialize)]
pub struct SupplierRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    /// Resolved product reference; `None` when the product has since been
    /// deleted.
    pub product: Option<ProductRef>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub supplier: Option<SupplierRef>,
    pub customer: Option<CustomerInput>,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub order_date: DateTime<Utc>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Aggregated order metrics. Monetary figures are rounded to two decimal
/// places; `profit_margin` is an integer percentage.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalytics {
    pub total_orders: u64,
    pub total_sales: u64,
    pub total_purchases: u64,
    pub total_sales_revenue: Decimal,
    pub total_purchase_cost: Decimal,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub total_earnings_in_sales: Decimal,
    pub total_earnings_in_purchase: Decimal,
    pub profit_margin: i64,
    pub sales_vs_purchases_ratio: Decimal,
}

/// A line item that has passed validation, with its derived total.
#[derive(Debug, Clone, PartialEq)]
struct ValidatedItem {
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

/// Validates the create request in the documented fail-fast sequence and
/// derives per-item totals. Pure so the sequence is unit-testable.
fn validate_create_request(
    request: &CreateOrderRequest,
) -> Result<(OrderType, Vec<ValidatedItem>), ServiceError> {
    let type_str = request
        .order_type
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::ValidationError("Order type is required".into()))?;

    let order_type = OrderType::from_str(type_str).map_err(|_| {
        ServiceError::ValidationError("Order type must be either purchase or sale".into())
    })?;

    let items = request
        .items
        .as_deref()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ServiceError::ValidationError("Order must have at least one item".into()))?;

    let mut validated = Vec::with_capacity(items.len());
    for item in items {
        let (product_id, quantity, unit_price) = match (
            item.product,
            item.quantity.filter(|q| *q != 0),
            item.unit_price.filter(|p| !p.is_zero()),
        ) {
            (Some(p), Some(q), Some(u)) => (p, q, u),
            _ => {
                return Err(ServiceError::ValidationError(
                    "Each item must have product, quantity, and unit price".into(),
                ))
            }
        };

        if quantity < 0 {
            return Err(ServiceError::ValidationError(
                "Item quantity must be greater than 0".into(),
            ));
        }
        if unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Item unit price must be greater than 0".into(),
            ));
        }

        validated.push(ValidatedItem {
            product_id,
            quantity,
            unit_price,
            total_price: Decimal::from(quantity) * unit_price,
        });
    }

    Ok((order_type, validated))
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Generates an order number: `PO-`/`SO-`, the creation timestamp in
/// milliseconds, and a slice of the order id so two orders created within
/// the same millisecond never collide on the unique key.
fn generate_order_number(order_type: OrderType, now: DateTime<Utc>, order_id: Uuid) -> String {
    let salt = order_id.simple().to_string();
    format!(
        "{}-{}-{}",
        order_type.order_number_prefix(),
        now.timestamp_millis(),
        &salt[..6]
    )
}

/// Folds order rows into the analytics report.
fn summarize_orders(orders: &[order::Model]) -> OrderAnalytics {
    let mut total_sales = 0u64;
    let mut total_purchases = 0u64;
    let mut sales_revenue = Decimal::ZERO;
    let mut purchase_cost = Decimal::ZERO;

    for o in orders {
        match o.order_type.as_str() {
            "sale" => {
                total_sales += 1;
                sales_revenue += o.total;
            }
            "purchase" => {
                total_purchases += 1;
                purchase_cost += o.total;
            }
            _ => {}
        }
    }

    let profit = sales_revenue - purchase_cost;
    let profit_margin = if sales_revenue > Decimal::ZERO {
        ((profit / sales_revenue) * Decimal::from(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0)
    } else {
        0
    };
    let sales_vs_purchases_ratio = if total_purchases > 0 {
        round2(Decimal::from(total_sales) / Decimal::from(total_purchases))
    } else {
        Decimal::from(total_sales)
    };

    OrderAnalytics {
        total_orders: orders.len() as u64,
        total_sales,
        total_purchases,
        total_sales_revenue: round2(sales_revenue),
        total_purchase_cost: round2(purchase_cost),
        total_revenue: round2(sales_revenue),
        total_cost: round2(purchase_cost),
        total_profit: round2(profit),
        total_earnings_in_sales: round2(sales_revenue),
        total_earnings_in_purchase: round2(purchase_cost),
        profit_margin,
        sales_vs_purchases_ratio,
    }
}

/// Service owning the purchase/sale order workflow, including the stock
/// adjustments that accompany order creation.
#[derive(Clone)]
pub struct OrderService {
    db: DbPool,
}

impl OrderService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Creates an order and applies its stock adjustment inside one
    /// transaction. Sale decrements are conditional (`quantity >= needed`),
    /// so concurrent sales cannot drive stock negative; a failed adjustment
    /// rolls the whole order back.
    #[instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let (order_type, items) = validate_create_request(&request)?;

        // Stock pre-check for sales, for the user-facing messages. The
        // conditional update below is the enforcement point.
        if order_type == OrderType::Sale {
            for item in &items {
                let found = product::Entity::find_by_id(item.product_id)
                    .one(self.db.as_ref())
                    .await?;
                let found = found.ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "Product not found: {}",
                        item.product_id
                    ))
                })?;
                if found.quantity < item.quantity {
                    return Err(ServiceError::ValidationError(format!(
                        "Insufficient stock for product: {}. Available: {}, Required: {}",
                        found.name, found.quantity, item.quantity
                    )));
                }
            }
        }

        let tax = request.tax.unwrap_or(Decimal::ZERO);
        let discount = request.discount.unwrap_or(Decimal::ZERO);
        if tax < Decimal::ZERO {
            return Err(ServiceError::ValidationError("Tax cannot be negative".into()));
        }
        if discount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Discount cannot be negative".into(),
            ));
        }

        if order_type == OrderType::Purchase && request.supplier.is_none() {
            return Err(ServiceError::ValidationError(
                "Supplier is required for purchase orders".into(),
            ));
        }
        let customer = request.customer.clone().unwrap_or_default();
        if order_type == OrderType::Sale
            && customer.name.as_deref().map_or(true, |n| n.trim().is_empty())
        {
            return Err(ServiceError::ValidationError(
                "Customer name is required for sale orders".into(),
            ));
        }

        let payment_status = match request.payment_status.as_deref() {
            None => PaymentStatus::Pending,
            Some(s) => PaymentStatus::from_str(s).map_err(|_| {
                ServiceError::ValidationError(format!(
                    "Invalid payment status. Must be one of: {}",
                    variants_list::<PaymentStatus>()
                ))
            })?,
        };
        let payment_method = match request.payment_method.as_deref() {
            None => None,
            Some(s) => Some(PaymentMethod::from_str(s).map_err(|_| {
                ServiceError::ValidationError(format!(
                    "Invalid payment method. Must be one of: {}",
                    variants_list::<PaymentMethod>()
                ))
            })?),
        };
        if payment_status == PaymentStatus::Paid && payment_method.is_none() {
            return Err(ServiceError::ValidationError(
                "Payment method is required when payment status is paid".into(),
            ));
        }

        let subtotal: Decimal = items.iter().map(|i| i.total_price).sum();
        let total = subtotal + tax - discount;
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order_number = generate_order_number(order_type, now, order_id);

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start order creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        let order_model = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number),
            order_type: Set(order_type.to_string()),
            supplier_id: Set(request.supplier),
            customer_name: Set(customer.name.clone()),
            customer_email: Set(customer.email.clone()),
            customer_phone: Set(customer.phone.clone()),
            customer_address: Set(customer.address.clone()),
            subtotal: Set(subtotal),
            tax: Set(tax),
            discount: Set(discount),
            total: Set(total),
            status: Set(OrderStatus::Pending.to_string()),
            payment_status: Set(payment_status.to_string()),
            payment_method: Set(payment_method.map(|m| m.to_string())),
            order_date: Set(now),
            expected_delivery_date: Set(request.expected_delivery_date),
            actual_delivery_date: Set(None),
            notes: Set(request.notes.clone()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::from_db_err(e, "Order number already exists"))?;

        let item_models: Vec<order_item::ActiveModel> = items
            .iter()
            .map(|item| order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                total_price: Set(item.total_price),
            })
            .collect();
        order_item::Entity::insert_many(item_models).exec(&txn).await?;

        // Apply stock adjustments. Dropping the transaction on error rolls
        // back both the order and any adjustments already applied.
        for item in &items {
            let adjustment = match order_type {
                OrderType::Purchase => {
                    product::Entity::update_many()
                        .col_expr(
                            product::Column::Quantity,
                            Expr::col(product::Column::Quantity).add(item.quantity),
                        )
                        .col_expr(product::Column::UpdatedAt, Expr::value(now))
                        .filter(product::Column::Id.eq(item.product_id))
                        .exec(&txn)
                        .await?
                }
                OrderType::Sale => {
                    product::Entity::update_many()
                        .col_expr(
                            product::Column::Quantity,
                            Expr::col(product::Column::Quantity).sub(item.quantity),
                        )
                        .col_expr(product::Column::UpdatedAt, Expr::value(now))
                        .filter(product::Column::Id.eq(item.product_id))
                        .filter(product::Column::Quantity.gte(item.quantity))
                        .exec(&txn)
                        .await?
                }
            };

            if adjustment.rows_affected == 0 {
                let existing = product::Entity::find_by_id(item.product_id)
                    .one(&txn)
                    .await?;
                let message = match existing {
                    Some(p) => {
                        warn!(
                            product_id = %item.product_id,
                            available = p.quantity,
                            required = item.quantity,
                            "Stock adjustment rejected, rolling back order"
                        );
                        format!(
                            "Insufficient stock for product: {}. Available: {}, Required: {}",
                            p.name, p.quantity, item.quantity
                        )
                    }
                    None => format!("Product not found: {}", item.product_id),
                };
                return Err(ServiceError::ValidationError(message));
            }
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, order_type = %order_type, "Order created");
        self.get_order(order_model.id).await
    }

    /// Fetches one order with resolved supplier and product references.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = order::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".into()))?;

        let mut responses = self.assemble_responses(vec![order]).await?;
        Ok(responses.remove(0))
    }

    /// Lists orders newest-first with optional type/status filters.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderListFilter,
    ) -> Result<(Vec<OrderResponse>, Pagination), ServiceError> {
        let page = filter.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = filter.limit.filter(|l| *l >= 1).unwrap_or(10);

        let mut query = order::Entity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(t) = filter.order_type.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(order::Column::OrderType.eq(t));
        }
        if let Some(s) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(order::Column::Status.eq(s));
        }

        let paginator = query.paginate(self.db.as_ref(), limit);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;

        let responses = self.assemble_responses(orders).await?;
        Ok((responses, Pagination::new(page, limit, total)))
    }

    /// Updates mutable order fields; monetary totals are recomputed when
    /// tax or discount change.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let status = match request.status.as_deref() {
            None => None,
            Some(s) => Some(OrderStatus::from_str(s).map_err(|_| {
                ServiceError::ValidationError(format!(
                    "Invalid status. Must be one of: {}",
                    variants_list::<OrderStatus>()
                ))
            })?),
        };
        let payment_status = match request.payment_status.as_deref() {
            None => None,
            Some(s) => Some(PaymentStatus::from_str(s).map_err(|_| {
                ServiceError::ValidationError(format!(
                    "Invalid payment status. Must be one of: {}",
                    variants_list::<PaymentStatus>()
                ))
            })?),
        };
        let payment_method = match request.payment_method.as_deref() {
            None => None,
            Some(s) => Some(PaymentMethod::from_str(s).map_err(|_| {
                ServiceError::ValidationError(format!(
                    "Invalid payment method. Must be one of: {}",
                    variants_list::<PaymentMethod>()
                ))
            })?),
        };
        if let Some(tax) = request.tax {
            if tax < Decimal::ZERO {
                return Err(ServiceError::ValidationError("Tax cannot be negative".into()));
            }
        }
        if let Some(discount) = request.discount {
            if discount < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Discount cannot be negative".into(),
                ));
            }
        }

        let existing = order::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".into()))?;

        let subtotal = existing.subtotal;
        let tax = request.tax.unwrap_or(existing.tax);
        let discount = request.discount.unwrap_or(existing.discount);

        let mut active: order::ActiveModel = existing.into();
        if let Some(supplier_id) = request.supplier {
            active.supplier_id = Set(Some(supplier_id));
        }
        if let Some(customer) = request.customer {
            if customer.name.is_some() {
                active.customer_name = Set(customer.name);
            }
            if customer.email.is_some() {
                active.customer_email = Set(customer.email);
            }
            if customer.phone.is_some() {
                active.customer_phone = Set(customer.phone);
            }
            if customer.address.is_some() {
                active.customer_address = Set(customer.address);
            }
        }
        active.tax = Set(tax);
        active.discount = Set(discount);
        active.total = Set(subtotal + tax - discount);
        if let Some(status) = status {
            active.status = Set(status.to_string());
        }
        if let Some(ps) = payment_status {
            active.payment_status = Set(ps.to_string());
        }
        if let Some(pm) = payment_method {
            active.payment_method = Set(Some(pm.to_string()));
        }
        if request.expected_delivery_date.is_some() {
            active.expected_delivery_date = Set(request.expected_delivery_date);
        }
        if request.actual_delivery_date.is_some() {
            active.actual_delivery_date = Set(request.actual_delivery_date);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(self.db.as_ref()).await?;
        info!(order_id = %order_id, "Order updated");
        self.get_order(updated.id).await
    }

    /// Deletes an order and its line items. Stock adjustments applied at
    /// creation are intentionally left in place.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let existing = order::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".into()))?;

        let txn = self.db.begin().await?;
        order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        order::Entity::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;

        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    /// Overwrites the order status. Any status may replace any other; only
    /// enum membership is enforced.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        status: Option<String>,
    ) -> Result<OrderResponse, ServiceError> {
        let status = status
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Status is required".into()))?;
        let status = OrderStatus::from_str(&status).map_err(|_| {
            ServiceError::ValidationError(format!(
                "Invalid status. Must be one of: {}",
                variants_list::<OrderStatus>()
            ))
        })?;

        let existing = order::Entity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".into()))?;

        let old_status = existing.status.clone();
        let mut active: order::ActiveModel = existing.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.db.as_ref()).await?;

        info!(order_id = %order_id, old_status = %old_status, new_status = %status, "Order status updated");
        self.get_order(updated.id).await
    }

    /// Aggregated metrics over every order.
    #[instrument(skip(self))]
    pub async fn get_analytics(&self) -> Result<OrderAnalytics, ServiceError> {
        let orders = order::Entity::find().all(self.db.as_ref()).await?;
        Ok(summarize_orders(&orders))
    }

    /// Builds responses for a batch of orders, resolving supplier names
    /// and per-item product name/sku in two batched lookups.
    async fn assemble_responses(
        &self,
        orders: Vec<order::Model>,
    ) -> Result<Vec<OrderResponse>, ServiceError> {
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = if order_ids.is_empty() {
            Vec::new()
        } else {
            order_item::Entity::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .all(self.db.as_ref())
                .await?
        };

        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, product::Model> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            product::Entity::find()
                .filter(product::Column::Id.is_in(product_ids))
                .all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        let supplier_ids: Vec<Uuid> = orders.iter().filter_map(|o| o.supplier_id).collect();
        let suppliers: HashMap<Uuid, supplier::Model> = if supplier_ids.is_empty() {
            HashMap::new()
        } else {
            supplier::Entity::find()
                .filter(supplier::Column::Id.is_in(supplier_ids))
                .all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect()
        };

        let mut items_by_order: HashMap<Uuid, Vec<order_item::Model>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|o| {
                let item_responses = items_by_order
                    .remove(&o.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|i| OrderItemResponse {
                        product: products.get(&i.product_id).map(|p| ProductRef {
                            id: p.id,
                            name: p.name.clone(),
                            sku: p.sku.clone(),
                        }),
                        quantity: i.quantity,
                        unit_price: i.unit_price,
                        total_price: i.total_price,
                    })
                    .collect();
                let supplier = o
                    .supplier_id
                    .and_then(|id| suppliers.get(&id))
                    .map(|s| SupplierRef {
                        id: s.id,
                        name: s.name.clone(),
                    });
                let customer = if o.customer_name.is_some()
                    || o.customer_email.is_some()
                    || o.customer_phone.is_some()
                    || o.customer_address.is_some()
                {
                    Some(CustomerInput {
                        name: o.customer_name,
                        email: o.customer_email,
                        phone: o.customer_phone,
                        address: o.customer_address,
                    })
                } else {
                    None
                };

                OrderResponse {
                    id: o.id,
                    order_number: o.order_number,
                    order_type: o.order_type,
                    supplier,
                    customer,
                    items: item_responses,
                    subtotal: o.subtotal,
                    tax: o.tax,
                    discount: o.discount,
                    total: o.total,
                    status: o.status,
                    payment_status: o.payment_status,
                    payment_method: o.payment_method,
                    order_date: o.order_date,
                    expected_delivery_date: o.expected_delivery_date,
                    actual_delivery_date: o.actual_delivery_date,
                    notes: o.notes,
                    created_at: o.created_at,
                    updated_at: o.updated_at,
                }
            })
            .collect())
    }
}
