//! Catalog routes

use axum::{Json, extract::Path};

use crate::catalog::{self, Product, SizeGuide};
use crate::core::category::Category;
use crate::core::error::{RequestError, StoreResult};

/// `GET /api/catalog`
pub async fn list_products() -> Json<Vec<Product>> {
    Json(catalog::products())
}

/// `GET /api/catalog/{category}`
pub async fn get_product(Path(category): Path<String>) -> StoreResult<Json<Product>> {
    let category: Category = category.parse()?;
    Ok(Json(catalog::product(category)))
}

/// `GET /api/catalog/{category}/size-guide`
pub async fn get_size_guide(Path(category): Path<String>) -> StoreResult<Json<SizeGuide>> {
    let category: Category = category.parse()?;
    let guide = catalog::size_guide(category).ok_or_else(|| RequestError::NotFound {
        resource: format!("size guide for {}", category.display_label()),
    })?;
    Ok(Json(guide))
}
