use crate::{
    db::DbPool,
    entities::{category, product, supplier},
    errors::ServiceError,
    models::{variants_list, GarmentSize},
    services::{PageParams, Pagination},
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{info, instrument};
use uuid::Uuid;

static IMAGE_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif)$").expect("image extension pattern"));

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;
const DEFAULT_MIN_STOCK_LEVEL: i32 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    pub supplier: Option<Uuid>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    pub supplier: Option<Uuid>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub min_stock_level: Option<i32>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListFilter {
    pub category: Option<Uuid>,
    pub supplier: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Option<NamedRef>,
    pub supplier: Option<NamedRef>,
    pub sku: String,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub quantity: i32,
    pub min_stock_level: i32,
    pub size: String,
    pub color: String,
    pub material: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub is_low_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalytics {
    pub total_products: u64,
    pub active_products: u64,
    pub inactive_products: u64,
    pub in_stock_products: u64,
    pub low_stock_products: u64,
    pub out_of_stock_products: u64,
    pub total_stock: i64,
    pub average_stock_level: Decimal,
    pub total_inventory_value: Decimal,
    pub total_inventory_cost: Decimal,
    pub potential_profit: Decimal,
    pub active_products_percentage: i64,
    pub low_stock_percentage: i64,
    pub out_of_stock_percentage: i64,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn percentage(part: u64, whole: u64) -> i64 {
    if whole == 0 {
        return 0;
    }
    (Decimal::from(part) / Decimal::from(whole) * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Folds product rows into the catalog analytics report.
fn summarize_products(products: &[product::Model]) -> ProductAnalytics {
    let total = products.len() as u64;
    let active = products.iter().filter(|p| p.is_active).count() as u64;
    let low_stock = products.iter().filter(|p| p.is_low_stock()).count() as u64;
    let out_of_stock = products.iter().filter(|p| p.quantity == 0).count() as u64;
    let total_stock: i64 = products.iter().map(|p| i64::from(p.quantity)).sum();
    let value: Decimal = products
        .iter()
        .map(|p| Decimal::from(p.quantity) * p.price)
        .sum();
    let cost: Decimal = products
        .iter()
        .map(|p| Decimal::from(p.quantity) * p.cost_price)
        .sum();
    let average = if total > 0 {
        round2(Decimal::from(total_stock) / Decimal::from(total))
    } else {
        Decimal::ZERO
    };

    ProductAnalytics {
        total_products: total,
        active_products: active,
        inactive_products: total - active,
        in_stock_products: total - out_of_stock,
        low_stock_products: low_stock,
        out_of_stock_products: out_of_stock,
        total_stock,
        average_stock_level: average,
        total_inventory_value: round2(value),
        total_inventory_cost: round2(cost),
        potential_profit: round2(value - cost),
        active_products_percentage: percentage(active, total),
        low_stock_percentage: percentage(low_stock, total),
        out_of_stock_percentage: percentage(out_of_stock, total),
    }
}

fn validate_images(images: &[String]) -> Result<(), ServiceError> {
    if images.iter().any(|i| !IMAGE_EXT.is_match(i)) {
        return Err(ServiceError::ValidationError(
            "Invalid image format. Only jpg, jpeg, png, gif are allowed".into(),
        ));
    }
    Ok(())
}

fn parse_size(size: &str) -> Result<GarmentSize, ServiceError> {
    GarmentSize::from_str(size).map_err(|_| {
        ServiceError::ValidationError(format!(
            "Invalid size. Must be one of: {}",
            variants_list::<GarmentSize>()
        ))
    })
}

fn string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Garment catalog service. Stock quantities are mutated exclusively by
/// the order workflow; this service only sets the initial quantity.
#[derive(Clone)]
pub struct ProductService {
    db: DbPool,
}

impl ProductService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        let name = request.name.as_deref().map(str::trim).unwrap_or_default();
        let sku = request.sku.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || sku.is_empty() {
            return Err(ServiceError::ValidationError(
                "Name and SKU are required".into(),
            ));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(ServiceError::ValidationError(
                "Product name cannot exceed 100 characters".into(),
            ));
        }

        let price = request.price.filter(|p| *p > Decimal::ZERO).ok_or_else(|| {
            ServiceError::ValidationError("Price must be greater than 0".into())
        })?;
        let cost_price = request
            .cost_price
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| {
                ServiceError::ValidationError("Cost price must be greater than 0".into())
            })?;
        let quantity = request.quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(ServiceError::ValidationError(
                "Quantity cannot be negative".into(),
            ));
        }
        let min_stock_level = request.min_stock_level.unwrap_or(DEFAULT_MIN_STOCK_LEVEL);
        if min_stock_level < 0 {
            return Err(ServiceError::ValidationError(
                "Minimum stock level cannot be negative".into(),
            ));
        }

        let category_id = request
            .category
            .ok_or_else(|| ServiceError::ValidationError("Category is required".into()))?;
        let supplier_id = request
            .supplier
            .ok_or_else(|| ServiceError::ValidationError("Supplier is required".into()))?;

        let size = request
            .size
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Size is required".into()))?;
        let size = parse_size(size)?;
        let color = request
            .color
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Color is required".into()))?;
        let material = request
            .material
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Material is required".into()))?;

        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Description is required".into()))?;
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(ServiceError::ValidationError(
                "Description cannot exceed 500 characters".into(),
            ));
        }

        let images = request.images.unwrap_or_default();
        validate_images(&images)?;
        let tags = request.tags.unwrap_or_default();

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            category_id: Set(category_id),
            supplier_id: Set(supplier_id),
            sku: Set(sku.to_string()),
            price: Set(price),
            cost_price: Set(cost_price),
            quantity: Set(quantity),
            min_stock_level: Set(min_stock_level),
            size: Set(size.to_string()),
            color: Set(color.to_string()),
            material: Set(material.to_string()),
            images: Set(serde_json::json!(images)),
            is_active: Set(request.is_active.unwrap_or(true)),
            tags: Set(serde_json::json!(tags)),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| ServiceError::from_db_err(e, "SKU already exists"))?;

        info!(product_id = %model.id, sku = %model.sku, "Product created");
        self.get_product(model.id).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductResponse, ServiceError> {
        let model = product::Entity::find_by_id(product_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;
        let mut responses = self.assemble_responses(vec![model]).await?;
        Ok(responses.remove(0))
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductListFilter,
    ) -> Result<(Vec<ProductResponse>, Pagination), ServiceError> {
        let (page, limit) = PageParams {
            page: filter.page,
            limit: filter.limit,
        }
        .resolve();

        let mut query = product::Entity::find().order_by_desc(product::Column::CreatedAt);
        if let Some(category_id) = filter.category {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(supplier_id) = filter.supplier {
            query = query.filter(product::Column::SupplierId.eq(supplier_id));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(product::Column::Name.contains(search));
        }

        let paginator = query.paginate(self.db.as_ref(), limit);
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;

        let responses = self.assemble_responses(products).await?;
        Ok((responses, Pagination::new(page, limit, total)))
    }

    /// Products in a single category, unpaginated.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn list_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .order_by_desc(product::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        self.assemble_responses(products).await
    }

    /// Products at or below their minimum stock level, lowest quantity
    /// first.
    #[instrument(skip(self))]
    pub async fn list_low_stock(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let products = product::Entity::find()
            .filter(
                Expr::col(product::Column::Quantity)
                    .lte(Expr::col(product::Column::MinStockLevel)),
            )
            .order_by_asc(product::Column::Quantity)
            .all(self.db.as_ref())
            .await?;
        self.assemble_responses(products).await
    }

    #[instrument(skip(self, request), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        if let Some(price) = request.price {
            if price <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price must be greater than 0".into(),
                ));
            }
        }
        if let Some(cost_price) = request.cost_price {
            if cost_price <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Cost price must be greater than 0".into(),
                ));
            }
        }
        if let Some(quantity) = request.quantity {
            if quantity < 0 {
                return Err(ServiceError::ValidationError(
                    "Quantity cannot be negative".into(),
                ));
            }
        }
        if let Some(min_stock_level) = request.min_stock_level {
            if min_stock_level < 0 {
                return Err(ServiceError::ValidationError(
                    "Minimum stock level cannot be negative".into(),
                ));
            }
        }
        let size = match request.size.as_deref() {
            None => None,
            Some(s) => Some(parse_size(s)?),
        };
        if let Some(images) = &request.images {
            validate_images(images)?;
        }
        if let Some(name) = request.name.as_deref() {
            if name.len() > MAX_NAME_LEN {
                return Err(ServiceError::ValidationError(
                    "Product name cannot exceed 100 characters".into(),
                ));
            }
        }
        if let Some(description) = request.description.as_deref() {
            if description.len() > MAX_DESCRIPTION_LEN {
                return Err(ServiceError::ValidationError(
                    "Description cannot exceed 500 characters".into(),
                ));
            }
        }

        let existing = product::Entity::find_by_id(product_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(category_id) = request.category {
            active.category_id = Set(category_id);
        }
        if let Some(supplier_id) = request.supplier {
            active.supplier_id = Set(supplier_id);
        }
        if let Some(sku) = request.sku {
            active.sku = Set(sku);
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(cost_price) = request.cost_price {
            active.cost_price = Set(cost_price);
        }
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(min_stock_level) = request.min_stock_level {
            active.min_stock_level = Set(min_stock_level);
        }
        if let Some(size) = size {
            active.size = Set(size.to_string());
        }
        if let Some(color) = request.color {
            active.color = Set(color);
        }
        if let Some(material) = request.material {
            active.material = Set(material);
        }
        if let Some(images) = request.images {
            active.images = Set(serde_json::json!(images));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(tags) = request.tags {
            active.tags = Set(serde_json::json!(tags));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::from_db_err(e, "SKU already exists"))?;

        info!(product_id = %product_id, "Product updated");
        self.get_product(updated.id).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let result = product::Entity::delete_by_id(product_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Product not found".into()));
        }
        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_analytics(&self) -> Result<ProductAnalytics, ServiceError> {
        let products = product::Entity::find().all(self.db.as_ref()).await?;
        Ok(summarize_products(&products))
    }

    async fn assemble_responses(
        &self,
        products: Vec<product::Model>,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        let category_ids: Vec<Uuid> = products.iter().map(|p| p.category_id).collect();
        let categories: HashMap<Uuid, String> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            category::Entity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };
        let supplier_ids: Vec<Uuid> = products.iter().map(|p| p.supplier_id).collect();
        let suppliers: HashMap<Uuid, String> = if supplier_ids.is_empty() {
            HashMap::new()
        } else {
            supplier::Entity::find()
                .filter(supplier::Column::Id.is_in(supplier_ids))
                .all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect()
        };

        Ok(products
            .into_iter()
            .map(|p| {
                let is_low_stock = p.is_low_stock();
                ProductResponse {
                    id: p.id,
                    category: categories.get(&p.category_id).map(|name| NamedRef {
                        id: p.category_id,
                        name: name.clone(),
                    }),
                    supplier: suppliers.get(&p.supplier_id).map(|name| NamedRef {
                        id: p.supplier_id,
                        name: name.clone(),
                    }),
                    name: p.name,
                    description: p.description,
                    sku: p.sku,
                    price: p.price,
                    cost_price: p.cost_price,
                    quantity: p.quantity,
                    min_stock_level: p.min_stock_level,
                    size: p.size,
                    color: p.color,
                    material: p.material,
                    images: string_list(&p.images),
                    is_active: p.is_active,
                    tags: string_list(&p.tags),
                    is_low_stock,
                    created_at: p.created_at,
                    updated_at: p.updated_at,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product_row(quantity: i32, min_stock: i32, active: bool, price: Decimal) -> product::Model {
        let now = Utc::now();
        product::Model {
            id: Uuid::new_v4(),
            name: "Denim Jacket".into(),
            description: "Classic denim".into(),
            category_id: Uuid::new_v4(),
            supplier_id: Uuid::new_v4(),
            sku: format!("SKU-{}", Uuid::new_v4()),
            price,
            cost_price: price / Decimal::from(2),
            quantity,
            min_stock_level: min_stock,
            size: "M".into(),
            color: "Blue".into(),
            material: "Denim".into(),
            images: serde_json::json!([]),
            is_active: active,
            tags: serde_json::json!([]),
            created_at: now,
            updated_at: Some(now),
        }
    }

    #[test]
    fn analytics_zero_state() {
        let analytics = summarize_products(&[]);
        assert_eq!(analytics.total_products, 0);
        assert_eq!(analytics.average_stock_level, Decimal::ZERO);
        assert_eq!(analytics.active_products_percentage, 0);
        assert_eq!(analytics.out_of_stock_percentage, 0);
    }

    #[test]
    fn analytics_counts_and_money() {
        let rows = vec![
            product_row(0, 10, true, dec!(40)),
            product_row(5, 10, true, dec!(20)),
            product_row(30, 10, false, dec!(10)),
        ];
        let analytics = summarize_products(&rows);
        assert_eq!(analytics.total_products, 3);
        assert_eq!(analytics.active_products, 2);
        assert_eq!(analytics.inactive_products, 1);
        assert_eq!(analytics.out_of_stock_products, 1);
        assert_eq!(analytics.in_stock_products, 2);
        // quantity <= min_stock_level for the first two rows
        assert_eq!(analytics.low_stock_products, 2);
        assert_eq!(analytics.total_stock, 35);
        // (0 + 5 + 30) / 3 = 11.67
        assert_eq!(analytics.average_stock_level, dec!(11.67));
        // 0*40 + 5*20 + 30*10 = 400
        assert_eq!(analytics.total_inventory_value, dec!(400.00));
        assert_eq!(analytics.total_inventory_cost, dec!(200.00));
        assert_eq!(analytics.potential_profit, dec!(200.00));
        // 2/3 -> 66.67% -> 67
        assert_eq!(analytics.active_products_percentage, 67);
        assert_eq!(analytics.low_stock_percentage, 67);
        assert_eq!(analytics.out_of_stock_percentage, 33);
    }

    #[test]
    fn image_validation_accepts_known_extensions() {
        assert!(validate_images(&["a.jpg".into(), "b.PNG".into(), "c.jpeg".into()]).is_ok());
        assert!(validate_images(&["archive.zip".into()]).is_err());
        assert!(validate_images(&[]).is_ok());
    }

    #[test]
    fn size_parse_reports_allowed_values() {
        assert_eq!(parse_size("XL").unwrap(), GarmentSize::ExtraLarge);
        let err = parse_size("huge").unwrap_err();
        match err {
            ServiceError::ValidationError(m) => {
                assert!(m.starts_with("Invalid size. Must be one of: XS, S, M"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
