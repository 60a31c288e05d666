//! Read API.
//!
//! ```text
//! GET /categories                  active categories, tree order
//! GET /products/:slug              active products with the slug, full documents
//! GET /products/category/:slug     active products of the category, listing documents
//! ```
//!
//! Unknown or inactive slugs answer `200 []`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::{
    CategoryDocument, ProductCategoryDocument, ProductDocument, category_document,
    product_category_document, product_document,
};
use crate::{CatalogStore, StoreError};

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub error: String,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Maps a store error onto a status code and JSON body.
pub fn error_response(err: StoreError) -> ApiError {
    let status = match &err {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists => StatusCode::CONFLICT,
        StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::Internal(msg) => {
            error!(error = %msg, "catalog store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

/// Shared state of the catalog routers.
pub struct CatalogState<S> {
    /// Store answering the reads.
    pub store: Arc<S>,
    /// Prefix joined to image references.
    pub media_url: Arc<str>,
}

impl<S> Clone for CatalogState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            media_url: Arc::clone(&self.media_url),
        }
    }
}

async fn list_categories<S: CatalogStore>(
    State(state): State<CatalogState<S>>,
) -> Result<Json<Vec<CategoryDocument>>, ApiError> {
    let categories = state
        .store
        .list_active_categories()
        .await
        .map_err(error_response)?;
    Ok(Json(categories.iter().map(category_document).collect()))
}

async fn get_products<S: CatalogStore>(
    State(state): State<CatalogState<S>>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProductDocument>>, ApiError> {
    let graphs = state
        .store
        .active_products_by_slug(&slug)
        .await
        .map_err(error_response)?;
    debug!(slug = %slug, count = graphs.len(), "product lookup");
    Ok(Json(
        graphs
            .iter()
            .map(|graph| product_document(graph, &state.media_url))
            .collect(),
    ))
}

async fn list_category_products<S: CatalogStore>(
    State(state): State<CatalogState<S>>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProductCategoryDocument>>, ApiError> {
    let graphs = state
        .store
        .active_products_by_category_slug(&slug)
        .await
        .map_err(error_response)?;
    debug!(category = %slug, count = graphs.len(), "category listing");
    Ok(Json(
        graphs
            .iter()
            .map(|graph| product_category_document(graph, &state.media_url))
            .collect(),
    ))
}

/// Creates the read router over `store`, rendering image urls under `media_url`.
pub fn create_catalog_router<S: CatalogStore>(store: Arc<S>, media_url: &str) -> Router {
    Router::new()
        .route("/categories", get(list_categories::<S>))
        .route("/products/:slug", get(get_products::<S>))
        .route("/products/category/:slug", get(list_category_products::<S>))
        .with_state(CatalogState {
            store,
            media_url: Arc::from(media_url),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;

    #[test]
    fn status_mapping() {
        assert_eq!(error_response(StoreError::NotFound).0, StatusCode::NOT_FOUND);
        assert_eq!(error_response(StoreError::AlreadyExists).0, StatusCode::CONFLICT);
        let (status, Json(body)) =
            error_response(ValidationError::DuplicateOrder { order: 1 }.into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Duplicate value.");
        assert_eq!(
            error_response(StoreError::Internal("boom".to_string())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
