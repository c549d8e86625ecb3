// handlers/products.rs - /api/products resource
//
// Each handler performs exactly one store call. Writes sit behind the admin
// gate attached by the router, so they run only for admin callers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{NewProduct, Product, ProductPatch};
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::state::AppState;

const NOT_FOUND: &str = "Product not found";

/// A malformed id cannot name a stored product, so it reads as absent.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(NOT_FOUND))
}

/// GET /api/products - every product, in insertion order
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;

    state
        .products
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// POST /api/products (admin)
pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<NewProduct>,
) -> Result<Json<Product>, ApiError> {
    let fields = body.validate()?;
    let product = state.products.insert(Product::create(fields)).await?;

    tracing::info!(product_id = %product.id, name = %product.fields.name, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/:id (admin) - apply the supplied fields, return the result
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    let patch = patch.validate()?;

    // Nothing to apply: answer with the stored document, timestamps untouched
    if patch.is_empty() {
        return state
            .products
            .find(id)
            .await?
            .map(Json)
            .ok_or_else(|| ApiError::not_found(NOT_FOUND));
    }

    let product = state
        .products
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(product_id = %product.id, "Product updated");
    Ok(Json(product))
}

/// DELETE /api/products/:id (admin)
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    if !state.products.delete(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(json!({ "msg": "Product deleted successfully" })))
}
