use crate::{
    db::DbPool,
    entities::supplier,
    errors::ServiceError,
    models::PaymentTerms,
    services::{PageParams, Pagination},
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{info, instrument};
use uuid::Uuid;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-\(\)]{10,}$").expect("phone pattern"));

const DEFAULT_RATING: f32 = 3.0;
const MAX_NAME_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPersonInput {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<AddressInput>,
    pub contact_person: Option<ContactPersonInput>,
    pub business_license: Option<String>,
    pub tax_id: Option<String>,
    pub payment_terms: Option<String>,
    pub rating: Option<f32>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<AddressInput>,
    pub contact_person: Option<ContactPersonInput>,
    pub business_license: Option<String>,
    pub tax_id: Option<String>,
    pub payment_terms: Option<String>,
    pub rating: Option<f32>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierListFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPersonResponse {
    pub name: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: AddressResponse,
    pub contact_person: ContactPersonResponse,
    pub business_license: String,
    pub tax_id: Option<String>,
    pub payment_terms: String,
    pub rating: f32,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierAnalytics {
    pub total_suppliers: u64,
    pub active_suppliers: u64,
    pub inactive_suppliers: u64,
    pub total_countries: u64,
    pub average_rating: Decimal,
    pub active_percentage: i64,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn summarize_suppliers(suppliers: &[supplier::Model]) -> SupplierAnalytics {
    let total = suppliers.len() as u64;
    let active = suppliers.iter().filter(|s| s.is_active).count() as u64;
    let countries: HashSet<&str> = suppliers.iter().map(|s| s.country.as_str()).collect();
    let average_rating = if total > 0 {
        let sum: f64 = suppliers.iter().map(|s| f64::from(s.rating)).sum();
        round2(Decimal::from_f64(sum / total as f64).unwrap_or(Decimal::ZERO))
    } else {
        Decimal::ZERO
    };
    let active_percentage = if total > 0 {
        ((active as f64 / total as f64) * 100.0).round() as i64
    } else {
        0
    };

    SupplierAnalytics {
        total_suppliers: total,
        active_suppliers: active,
        inactive_suppliers: total - active,
        total_countries: countries.len() as u64,
        average_rating,
        active_percentage,
    }
}

fn validate_email(email: &str) -> Result<(), ServiceError> {
    if !EMAIL.is_match(email) {
        return Err(ServiceError::ValidationError("Invalid email format".into()));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ServiceError> {
    if !PHONE.is_match(phone) {
        return Err(ServiceError::ValidationError(
            "Invalid phone number format".into(),
        ));
    }
    Ok(())
}

fn parse_payment_terms(terms: &str) -> Result<PaymentTerms, ServiceError> {
    PaymentTerms::from_str(terms)
        .map_err(|_| ServiceError::ValidationError("Invalid payment terms".into()))
}

fn validate_name_len(name: &str) -> Result<(), ServiceError> {
    if name.len() > MAX_NAME_LEN {
        return Err(ServiceError::ValidationError(
            "Supplier name cannot exceed 100 characters".into(),
        ));
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<(), ServiceError> {
    if notes.is_some_and(|n| n.len() > MAX_NOTES_LEN) {
        return Err(ServiceError::ValidationError(
            "Notes cannot exceed 500 characters".into(),
        ));
    }
    Ok(())
}

fn validate_rating(rating: f32) -> Result<(), ServiceError> {
    if !(1.0..=5.0).contains(&rating) {
        return Err(ServiceError::ValidationError(
            "Rating must be between 1 and 5".into(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SupplierService {
    db: DbPool,
}

impl SupplierService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn create_supplier(
        &self,
        request: CreateSupplierRequest,
    ) -> Result<SupplierResponse, ServiceError> {
        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Supplier name is required".into()))?;
        validate_name_len(name)?;
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Supplier email is required".into()))?;
        let phone = request
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Supplier phone is required".into()))?;
        let business_license = request
            .business_license
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ServiceError::ValidationError("Business license is required".into())
            })?;

        validate_email(email)?;
        validate_phone(phone)?;

        let address = request.address.clone().unwrap_or_default();
        let (street, city, state, zip_code, country) = match (
            address.street.filter(|s| !s.trim().is_empty()),
            address.city.filter(|s| !s.trim().is_empty()),
            address.state.filter(|s| !s.trim().is_empty()),
            address.zip_code.filter(|s| !s.trim().is_empty()),
            address.country.filter(|s| !s.trim().is_empty()),
        ) {
            (Some(a), Some(b), Some(c), Some(d), Some(e)) => (a, b, c, d, e),
            _ => {
                return Err(ServiceError::ValidationError(
                    "Complete address is required (street, city, state, zip code, country)".into(),
                ))
            }
        };

        let contact = request.contact_person.clone().unwrap_or_default();
        let contact_name = contact
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                ServiceError::ValidationError("Contact person name is required".into())
            })?;

        let payment_terms = match request.payment_terms.as_deref() {
            None => PaymentTerms::Net30,
            Some(terms) => parse_payment_terms(terms)?,
        };
        let rating = request.rating.unwrap_or(DEFAULT_RATING);
        validate_rating(rating)?;
        validate_notes(request.notes.as_deref())?;

        let now = Utc::now();
        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email.to_lowercase()),
            phone: Set(phone.to_string()),
            street: Set(street),
            city: Set(city),
            state: Set(state),
            zip_code: Set(zip_code),
            country: Set(country),
            contact_name: Set(contact_name),
            contact_designation: Set(contact.designation),
            contact_phone: Set(contact.phone),
            contact_email: Set(contact.email),
            business_license: Set(business_license.to_string()),
            tax_id: Set(request.tax_id.clone()),
            payment_terms: Set(payment_terms.to_string()),
            rating: Set(rating),
            is_active: Set(request.is_active.unwrap_or(true)),
            notes: Set(request.notes.clone()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| ServiceError::from_db_err(e, "Email already exists"))?;

        info!(supplier_id = %model.id, "Supplier created");
        Ok(model_to_response(model))
    }

    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<SupplierResponse, ServiceError> {
        let model = supplier::Entity::find_by_id(supplier_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".into()))?;
        Ok(model_to_response(model))
    }

    /// Lists suppliers alphabetically. Active-only unless the filter says
    /// otherwise.
    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        filter: SupplierListFilter,
    ) -> Result<(Vec<SupplierResponse>, Pagination), ServiceError> {
        let (page, limit) = PageParams {
            page: filter.page,
            limit: filter.limit,
        }
        .resolve();

        let mut query = supplier::Entity::find()
            .filter(supplier::Column::IsActive.eq(filter.is_active.unwrap_or(true)))
            .order_by_asc(supplier::Column::Name);
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(supplier::Column::Name.contains(search));
        }

        let paginator = query.paginate(self.db.as_ref(), limit);
        let total = paginator.num_items().await?;
        let suppliers = paginator.fetch_page(page - 1).await?;

        Ok((
            suppliers.into_iter().map(model_to_response).collect(),
            Pagination::new(page, limit, total),
        ))
    }

    #[instrument(skip(self, request), fields(supplier_id = %supplier_id))]
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        request: UpdateSupplierRequest,
    ) -> Result<SupplierResponse, ServiceError> {
        if let Some(name) = request.name.as_deref() {
            validate_name_len(name)?;
        }
        if let Some(email) = request.email.as_deref() {
            validate_email(email)?;
        }
        if let Some(phone) = request.phone.as_deref() {
            validate_phone(phone)?;
        }
        validate_notes(request.notes.as_deref())?;
        let payment_terms = match request.payment_terms.as_deref() {
            None => None,
            Some(terms) => Some(parse_payment_terms(terms)?),
        };
        if let Some(rating) = request.rating {
            validate_rating(rating)?;
        }

        let existing = supplier::Entity::find_by_id(supplier_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".into()))?;

        let mut active: supplier::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(email) = request.email {
            active.email = Set(email.to_lowercase());
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = request.address {
            if let Some(street) = address.street {
                active.street = Set(street);
            }
            if let Some(city) = address.city {
                active.city = Set(city);
            }
            if let Some(state) = address.state {
                active.state = Set(state);
            }
            if let Some(zip_code) = address.zip_code {
                active.zip_code = Set(zip_code);
            }
            if let Some(country) = address.country {
                active.country = Set(country);
            }
        }
        if let Some(contact) = request.contact_person {
            if let Some(name) = contact.name {
                active.contact_name = Set(name);
            }
            if contact.designation.is_some() {
                active.contact_designation = Set(contact.designation);
            }
            if contact.phone.is_some() {
                active.contact_phone = Set(contact.phone);
            }
            if contact.email.is_some() {
                active.contact_email = Set(contact.email);
            }
        }
        if let Some(business_license) = request.business_license {
            active.business_license = Set(business_license);
        }
        if request.tax_id.is_some() {
            active.tax_id = Set(request.tax_id);
        }
        if let Some(terms) = payment_terms {
            active.payment_terms = Set(terms.to_string());
        }
        if let Some(rating) = request.rating {
            active.rating = Set(rating);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::from_db_err(e, "Email already exists"))?;

        info!(supplier_id = %supplier_id, "Supplier updated");
        Ok(model_to_response(updated))
    }

    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    pub async fn delete_supplier(&self, supplier_id: Uuid) -> Result<(), ServiceError> {
        let result = supplier::Entity::delete_by_id(supplier_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Supplier not found".into()));
        }
        info!(supplier_id = %supplier_id, "Supplier deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_analytics(&self) -> Result<SupplierAnalytics, ServiceError> {
        let suppliers = supplier::Entity::find().all(self.db.as_ref()).await?;
        Ok(summarize_suppliers(&suppliers))
    }
}

fn model_to_response(model: supplier::Model) -> SupplierResponse {
    SupplierResponse {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: AddressResponse {
            street: model.street,
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
            country: model.country,
        },
        contact_person: ContactPersonResponse {
            name: model.contact_name,
            designation: model.contact_designation,
            phone: model.contact_phone,
            email: model.contact_email,
        },
        business_license: model.business_license,
        tax_id: model.tax_id,
        payment_terms: model.payment_terms,
        rating: model.rating,
        is_active: model.is_active,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
