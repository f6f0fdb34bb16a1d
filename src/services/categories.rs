use crate::{
    db::DbPool,
    entities::{category, product},
    errors::ServiceError,
    services::products::NamedRef,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};
use uuid::Uuid;

static IMAGE_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif)$").expect("image extension pattern"));

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_category: Option<Uuid>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the parent, promoting the category back to the
    /// top level.
    #[serde(default, with = "double_option")]
    pub parent_category: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_category: Option<NamedRef>,
    pub is_active: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoriesResponse {
    pub parent_category: NamedRef,
    pub subcategories: Vec<CategoryResponse>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalytics {
    pub total_categories: u64,
    pub active_categories: u64,
    pub inactive_categories: u64,
    pub parent_categories: u64,
    pub subcategories: u64,
    pub active_categories_percentage: i64,
    pub inactive_categories_percentage: i64,
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

fn summarize_categories(categories: &[category::Model]) -> CategoryAnalytics {
    let total = categories.len() as u64;
    let active = categories.iter().filter(|c| c.is_active).count() as u64;
    let parents = categories.iter().filter(|c| c.parent_id.is_none()).count() as u64;

    CategoryAnalytics {
        total_categories: total,
        active_categories: active,
        inactive_categories: total - active,
        parent_categories: parents,
        subcategories: total - parents,
        active_categories_percentage: percentage(active, total),
        inactive_categories_percentage: percentage(total - active, total),
    }
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().len() < MIN_NAME_LEN {
        return Err(ServiceError::ValidationError(
            "Category name must be at least 2 characters".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ServiceError::ValidationError(
            "Category name cannot exceed 50 characters".into(),
        ));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), ServiceError> {
    if description.is_some_and(|d| d.len() > MAX_DESCRIPTION_LEN) {
        return Err(ServiceError::ValidationError(
            "Description cannot exceed 200 characters".into(),
        ));
    }
    Ok(())
}

fn validate_image(image: Option<&str>) -> Result<(), ServiceError> {
    if image.is_some_and(|i| !IMAGE_EXT.is_match(i)) {
        return Err(ServiceError::ValidationError(
            "Invalid image format. Only jpg, jpeg, png, gif are allowed".into(),
        ));
    }
    Ok(())
}

/// Category service enforcing the two-level hierarchy: a subcategory can
/// never itself become a parent.
#[derive(Clone)]
pub struct CategoryService {
    db: DbPool,
}

impl CategoryService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<CategoryResponse, ServiceError> {
        let name = request
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Category name is required".into()))?;
        validate_name(name)?;
        validate_description(request.description.as_deref())?;

        let existing = category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("Category name already exists".into()));
        }

        if let Some(parent_id) = request.parent_category {
            self.check_parent(parent_id, true).await?;
        }
        validate_image(request.image.as_deref())?;

        let now = Utc::now();
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(request.description.clone()),
            parent_id: Set(request.parent_category),
            is_active: Set(request.is_active.unwrap_or(true)),
            image: Set(request.image.clone()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| ServiceError::from_db_err(e, "Category name already exists"))?;

        info!(category_id = %model.id, name = %model.name, "Category created");
        self.assemble_response(model).await
    }

    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_category(&self, category_id: Uuid) -> Result<CategoryResponse, ServiceError> {
        let model = category::Entity::find_by_id(category_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".into()))?;
        self.assemble_response(model).await
    }

    /// All categories sorted by name; inactive ones are included only on
    /// request.
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<CategoryResponse>, ServiceError> {
        let mut query = category::Entity::find().order_by_asc(category::Column::Name);
        if !include_inactive {
            query = query.filter(category::Column::IsActive.eq(true));
        }
        let categories = query.all(self.db.as_ref()).await?;
        self.assemble_responses(categories).await
    }

    /// Top-level categories only.
    #[instrument(skip(self))]
    pub async fn list_parent_categories(&self) -> Result<Vec<CategoryResponse>, ServiceError> {
        let categories = category::Entity::find()
            .filter(category::Column::ParentId.is_null())
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await?;
        self.assemble_responses(categories).await
    }

    #[instrument(skip(self), fields(parent_id = %parent_id))]
    pub async fn list_subcategories(
        &self,
        parent_id: Uuid,
    ) -> Result<SubcategoriesResponse, ServiceError> {
        let parent = category::Entity::find_by_id(parent_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Parent category not found".into()))?;

        let subcategories = category::Entity::find()
            .filter(category::Column::ParentId.eq(parent_id))
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await?;

        Ok(SubcategoriesResponse {
            parent_category: NamedRef {
                id: parent.id,
                name: parent.name,
            },
            subcategories: self.assemble_responses(subcategories).await?,
        })
    }

    #[instrument(skip(self, request), fields(category_id = %category_id))]
    pub async fn update_category(
        &self,
        category_id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<CategoryResponse, ServiceError> {
        let existing = category::Entity::find_by_id(category_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".into()))?;

        if let Some(name) = request.name.as_deref() {
            validate_name(name)?;
            if name != existing.name {
                let clash = category::Entity::find()
                    .filter(category::Column::Name.eq(name))
                    .filter(category::Column::Id.ne(category_id))
                    .one(self.db.as_ref())
                    .await?;
                if clash.is_some() {
                    return Err(ServiceError::Conflict("Category name already exists".into()));
                }
            }
        }
        validate_description(request.description.as_deref())?;
        validate_image(request.image.as_deref())?;

        if let Some(Some(parent_id)) = request.parent_category {
            if parent_id == category_id {
                return Err(ServiceError::ValidationError(
                    "Category cannot be its own parent".into(),
                ));
            }
            self.check_parent(parent_id, false).await?;

            let child_count = category::Entity::find()
                .filter(category::Column::ParentId.eq(category_id))
                .count(self.db.as_ref())
                .await?;
            if child_count > 0 {
                return Err(ServiceError::ValidationError(
                    "Cannot make a parent category into a subcategory when it has existing subcategories"
                        .into(),
                ));
            }
        }

        let mut active: category::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(parent) = request.parent_category {
            active.parent_id = Set(parent);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(image) = request.image {
            active.image = Set(Some(image));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::from_db_err(e, "Category name already exists"))?;

        info!(category_id = %category_id, "Category updated");
        self.assemble_response(updated).await
    }

    /// Deleting is refused while subcategories or products still reference
    /// the category.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn delete_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        let existing = category::Entity::find_by_id(category_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".into()))?;

        let child_count = category::Entity::find()
            .filter(category::Column::ParentId.eq(category_id))
            .count(self.db.as_ref())
            .await?;
        if child_count > 0 {
            return Err(ServiceError::ValidationError(
                "Cannot delete category that has subcategories. Delete subcategories first.".into(),
            ));
        }

        let product_count = product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(self.db.as_ref())
            .await?;
        if product_count > 0 {
            return Err(ServiceError::ValidationError(format!(
                "Cannot delete category that has {} products. Move or delete products first.",
                product_count
            )));
        }

        category::Entity::delete_by_id(existing.id)
            .exec(self.db.as_ref())
            .await?;
        info!(category_id = %category_id, "Category deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_analytics(&self) -> Result<CategoryAnalytics, ServiceError> {
        let categories = category::Entity::find().all(self.db.as_ref()).await?;
        Ok(summarize_categories(&categories))
    }

    /// Validates a prospective parent: it must exist, be active, and be a
    /// top-level category.
    async fn check_parent(&self, parent_id: Uuid, creating: bool) -> Result<(), ServiceError> {
        let parent = category::Entity::find_by_id(parent_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::ValidationError("Parent category not found".into()))?;

        if !parent.is_active {
            let message = if creating {
                "Cannot create subcategory under inactive parent category"
            } else {
                "Cannot set inactive category as parent"
            };
            return Err(ServiceError::ValidationError(message.into()));
        }
        if parent.parent_id.is_some() {
            return Err(ServiceError::ValidationError(
                "Cannot create subcategory under another subcategory. Maximum 2-level hierarchy allowed"
                    .into(),
            ));
        }
        Ok(())
    }

    async fn assemble_response(
        &self,
        model: category::Model,
    ) -> Result<CategoryResponse, ServiceError> {
        let mut responses = self.assemble_responses(vec![model]).await?;
        Ok(responses.remove(0))
    }

    async fn assemble_responses(
        &self,
        categories: Vec<category::Model>,
    ) -> Result<Vec<CategoryResponse>, ServiceError> {
        let parent_ids: Vec<Uuid> = categories.iter().filter_map(|c| c.parent_id).collect();
        let parents: HashMap<Uuid, String> = if parent_ids.is_empty() {
            HashMap::new()
        } else {
            category::Entity::find()
                .filter(category::Column::Id.is_in(parent_ids))
                .all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };

        Ok(categories
            .into_iter()
            .map(|c| CategoryResponse {
                id: c.id,
                name: c.name,
                description: c.description,
                parent_category: c.parent_id.and_then(|id| {
                    parents.get(&id).map(|name| NamedRef {
                        id,
                        name: name.clone(),
                    })
                }),
                is_active: c.is_active,
                image: c.image,
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect())
    }
}
