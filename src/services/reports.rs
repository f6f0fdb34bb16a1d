use crate::{
    db::DbPool,
    entities::{category, order, product, supplier},
    errors::ServiceError,
};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;

/// Bare document counts across the four aggregates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalDocOverview {
    pub products: u64,
    pub categories: u64,
    pub suppliers: u64,
    pub orders: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub low_stock: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCounts {
    pub total: u64,
    pub pending: u64,
    pub delivered: u64,
    pub sale: u64,
    pub purchase: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total: Decimal,
    pub this_month: Decimal,
}

/// Dashboard overview: per-aggregate count breakdowns plus revenue from
/// delivered sale orders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemOverview {
    pub products: ProductCounts,
    pub categories: ActiveCounts,
    pub suppliers: ActiveCounts,
    pub orders: OrderCounts,
    pub revenue: RevenueSummary,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub generated_at: DateTime<Utc>,
}

/// First instant of the month containing `now`.
fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Read-only reporting across all aggregates.
#[derive(Clone)]
pub struct ReportService {
    db: DbPool,
}

impl ReportService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn total_doc_overview(&self) -> Result<TotalDocOverview, ServiceError> {
        let db = self.db.as_ref();
        Ok(TotalDocOverview {
            products: product::Entity::find().count(db).await?,
            categories: category::Entity::find().count(db).await?,
            suppliers: supplier::Entity::find().count(db).await?,
            orders: order::Entity::find().count(db).await?,
            generated_at: Utc::now(),
        })
    }

    #[instrument(skip(self))]
    pub async fn overview(&self) -> Result<SystemOverview, ServiceError> {
        let db = self.db.as_ref();
        let now = Utc::now();

        let total_products = product::Entity::find().count(db).await?;
        let active_products = product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .count(db)
            .await?;
        let low_stock_products = product::Entity::find()
            .filter(
                Expr::col(product::Column::Quantity)
                    .lte(Expr::col(product::Column::MinStockLevel)),
            )
            .count(db)
            .await?;

        let total_categories = category::Entity::find().count(db).await?;
        let active_categories = category::Entity::find()
            .filter(category::Column::IsActive.eq(true))
            .count(db)
            .await?;

        let total_suppliers = supplier::Entity::find().count(db).await?;
        let active_suppliers = supplier::Entity::find()
            .filter(supplier::Column::IsActive.eq(true))
            .count(db)
            .await?;

        let total_orders = order::Entity::find().count(db).await?;
        let pending_orders = order::Entity::find()
            .filter(order::Column::Status.eq("pending"))
            .count(db)
            .await?;
        let delivered_orders = order::Entity::find()
            .filter(order::Column::Status.eq("delivered"))
            .count(db)
            .await?;
        let sale_orders = order::Entity::find()
            .filter(order::Column::OrderType.eq("sale"))
            .count(db)
            .await?;
        let purchase_orders = order::Entity::find()
            .filter(order::Column::OrderType.eq("purchase"))
            .count(db)
            .await?;

        // Revenue counts only delivered sale orders.
        let delivered_sales = order::Entity::find()
            .filter(order::Column::OrderType.eq("sale"))
            .filter(order::Column::Status.eq("delivered"))
            .all(db)
            .await?;
        let total_revenue: Decimal = delivered_sales.iter().map(|o| o.total).sum();
        let month_start = start_of_month(now);
        let this_month_revenue: Decimal = delivered_sales
            .iter()
            .filter(|o| o.created_at >= month_start)
            .map(|o| o.total)
            .sum();

        Ok(SystemOverview {
            products: ProductCounts {
                total: total_products,
                active: active_products,
                inactive: total_products - active_products,
                low_stock: low_stock_products,
            },
            categories: ActiveCounts {
                total: total_categories,
                active: active_categories,
                inactive: total_categories - active_categories,
            },
            suppliers: ActiveCounts {
                total: total_suppliers,
                active: active_suppliers,
                inactive: total_suppliers - active_suppliers,
            },
            orders: OrderCounts {
                total: total_orders,
                pending: pending_orders,
                delivered: delivered_orders,
                sale: sale_orders,
                purchase: purchase_orders,
            },
            revenue: RevenueSummary {
                total: total_revenue,
                this_month: this_month_revenue,
            },
            generated_at: now,
        })
    }

    /// Database reachability check.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthReport, ServiceError> {
        self.db.ping().await?;
        Ok(HealthReport {
            status: "ok",
            database: "connected",
            generated_at: Utc::now(),
        })
    }
}
