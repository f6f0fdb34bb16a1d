pub mod categories;
pub mod common;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod system;

use crate::db::DbPool;
use crate::services::{
    categories::CategoryService, orders::OrderService, products::ProductService,
    reports::ReportService, suppliers::SupplierService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: OrderService,
    pub products: ProductService,
    pub categories: CategoryService,
    pub suppliers: SupplierService,
    pub reports: ReportService,
}

impl AppServices {
    pub fn new(db: DbPool) -> Self {
        Self {
            orders: OrderService::new(db.clone()),
            products: ProductService::new(db.clone()),
            categories: CategoryService::new(db.clone()),
            suppliers: SupplierService::new(db.clone()),
            reports: ReportService::new(db),
        }
    }
}
