//! Administrative write API.
//!
//! Every handler decodes a JSON input, hands it to the store's write path and returns the
//! persisted row.  Creation answers `201 Created`; updates answer `200 OK`.  Failures use the
//! status mapping of [`error_response`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiError, error_response};
use crate::validate::AttachOutcome;
use crate::{
    AttachAttribute, AttachAttributeValue, Attribute, AttributeValue, CatalogStore, Category,
    CategoryId, NewAttribute, NewAttributeValue, NewCategory, NewProduct, NewProductImage,
    NewProductLine, NewProductType, Product, ProductAttributeValue, ProductId, ProductImage,
    ProductImageId, ProductLine, ProductLineAttributeValue, ProductLineId, ProductType,
    ProductTypeAttribute, ProductTypeId,
};

type Created<T> = Result<(StatusCode, Json<T>), ApiError>;
type Updated<T> = Result<Json<T>, ApiError>;

/// Response from attaching an attribute value to a product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachLineValueResponse {
    /// The edge.
    pub edge: ProductLineAttributeValue,
    /// Whether the edge was newly created (true) or already existed (false).
    pub created: bool,
}

fn created<T>(row: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(row))
}

////////////////////////////////////////////// Categories /////////////////////////////////////////////

async fn create_category<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Json(category): Json<NewCategory>,
) -> Created<Category> {
    let row = store
        .create_category(category)
        .await
        .map_err(error_response)?;
    info!(category = %row.id, slug = %row.slug, "category created");
    Ok(created(row))
}

async fn update_category<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<CategoryId>,
    Json(category): Json<NewCategory>,
) -> Updated<Category> {
    let row = store
        .update_category(id, category)
        .await
        .map_err(error_response)?;
    info!(category = %row.id, "category updated");
    Ok(Json(row))
}

//////////////////////////////////////// Product types & attributes ///////////////////////////////////////

async fn create_product_type<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Json(product_type): Json<NewProductType>,
) -> Created<ProductType> {
    let row = store
        .create_product_type(product_type)
        .await
        .map_err(error_response)?;
    Ok(created(row))
}

async fn update_product_type<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<ProductTypeId>,
    Json(product_type): Json<NewProductType>,
) -> Updated<ProductType> {
    let row = store
        .update_product_type(id, product_type)
        .await
        .map_err(error_response)?;
    Ok(Json(row))
}

async fn attach_product_type_attribute<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<ProductTypeId>,
    Json(request): Json<AttachAttribute>,
) -> Created<ProductTypeAttribute> {
    let row = store
        .attach_product_type_attribute(id, request.attribute_id)
        .await
        .map_err(error_response)?;
    Ok(created(row))
}

async fn create_attribute<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Json(attribute): Json<NewAttribute>,
) -> Created<Attribute> {
    let row = store
        .create_attribute(attribute)
        .await
        .map_err(error_response)?;
    Ok(created(row))
}

async fn create_attribute_value<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Json(value): Json<NewAttributeValue>,
) -> Created<AttributeValue> {
    let row = store
        .create_attribute_value(value)
        .await
        .map_err(error_response)?;
    Ok(created(row))
}

/////////////////////////////////////////////// Products //////////////////////////////////////////////

async fn create_product<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Json(product): Json<NewProduct>,
) -> Created<Product> {
    let row = store
        .create_product(product)
        .await
        .map_err(error_response)?;
    info!(product = %row.id, pid = %row.pid, "product created");
    Ok(created(row))
}

async fn update_product<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<ProductId>,
    Json(product): Json<NewProduct>,
) -> Updated<Product> {
    let row = store
        .update_product(id, product)
        .await
        .map_err(error_response)?;
    Ok(Json(row))
}

async fn attach_product_attribute_value<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<ProductId>,
    Json(request): Json<AttachAttributeValue>,
) -> Created<ProductAttributeValue> {
    let row = store
        .attach_product_attribute_value(id, request.attribute_value_id)
        .await
        .map_err(error_response)?;
    Ok(created(row))
}

//////////////////////////////////////////// Product lines ////////////////////////////////////////////

async fn create_product_line<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Json(line): Json<NewProductLine>,
) -> Created<ProductLine> {
    let row = store
        .create_product_line(line)
        .await
        .map_err(error_response)?;
    info!(product_line = %row.id, order = row.order, "product line created");
    Ok(created(row))
}

async fn update_product_line<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<ProductLineId>,
    Json(line): Json<NewProductLine>,
) -> Updated<ProductLine> {
    let row = store
        .update_product_line(id, line)
        .await
        .map_err(error_response)?;
    Ok(Json(row))
}

async fn attach_line_attribute_value<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<ProductLineId>,
    Json(request): Json<AttachAttributeValue>,
) -> Result<(StatusCode, Json<AttachLineValueResponse>), ApiError> {
    let outcome = store
        .attach_line_attribute_value(id, request.attribute_value_id)
        .await
        .map_err(error_response)?;
    let created = outcome == AttachOutcome::Attached;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let response = AttachLineValueResponse {
        edge: ProductLineAttributeValue {
            product_line_id: id,
            attribute_value_id: request.attribute_value_id,
        },
        created,
    };
    Ok((status, Json(response)))
}

/////////////////////////////////////////// Product images ////////////////////////////////////////////

async fn create_product_image<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Json(image): Json<NewProductImage>,
) -> Created<ProductImage> {
    let row = store
        .create_product_image(image)
        .await
        .map_err(error_response)?;
    Ok(created(row))
}

async fn update_product_image<S: CatalogStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<ProductImageId>,
    Json(image): Json<NewProductImage>,
) -> Updated<ProductImage> {
    let row = store
        .update_product_image(id, image)
        .await
        .map_err(error_response)?;
    Ok(Json(row))
}

/// Creates the admin router over `store`.  Mount it under `/admin`.
pub fn create_admin_router<S: CatalogStore>(store: Arc<S>) -> Router {
    Router::new()
        .route("/categories", post(create_category::<S>))
        .route("/categories/:id", put(update_category::<S>))
        .route("/product-types", post(create_product_type::<S>))
        .route("/product-types/:id", put(update_product_type::<S>))
        .route(
            "/product-types/:id/attributes",
            post(attach_product_type_attribute::<S>),
        )
        .route("/attributes", post(create_attribute::<S>))
        .route("/attribute-values", post(create_attribute_value::<S>))
        .route("/products", post(create_product::<S>))
        .route("/products/:id", put(update_product::<S>))
        .route(
            "/products/:id/attribute-values",
            post(attach_product_attribute_value::<S>),
        )
        .route("/product-lines", post(create_product_line::<S>))
        .route("/product-lines/:id", put(update_product_line::<S>))
        .route(
            "/product-lines/:id/attribute-values",
            post(attach_line_attribute_value::<S>),
        )
        .route("/product-images", post(create_product_image::<S>))
        .route("/product-images/:id", put(update_product_image::<S>))
        .with_state(store)
}
