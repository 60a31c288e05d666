//! Product operations for PostgreSQL database.

use sqlx::{Postgres, Transaction};

use super::SqlResult;
use crate::{AttributeValueId, NewProduct, Product, ProductAttributeValue, ProductId};

const COLUMNS: &str = "id, name, slug, pid, description, is_digital, is_active, category_id, \
                       product_type_id, created_at";

/// Inserts a product.  `created_at` is set by the database.
///
/// # Returns
/// * `Ok(Product)` - The new row
/// * `Err(StoreError::AlreadyExists)` - The pid is taken
/// * `Err(StoreError::NotFound)` - The category or product type doesn't exist
pub async fn insert(tx: &mut Transaction<'_, Postgres>, product: &NewProduct) -> SqlResult<Product> {
    let row = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products
            (name, slug, pid, description, is_digital, is_active, category_id, product_type_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(&product.name)
    .bind(&product.slug)
    .bind(&product.pid)
    .bind(&product.description)
    .bind(product.is_digital)
    .bind(product.is_active)
    .bind(product.category_id)
    .bind(product.product_type_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

/// Replaces a product's fields, keeping `created_at`.  Returns `None` when no product has this
/// id.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductId,
    product: &NewProduct,
) -> SqlResult<Option<Product>> {
    let row = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET name = $2, slug = $3, pid = $4, description = $5, is_digital = $6, is_active = $7,
            category_id = $8, product_type_id = $9
        WHERE id = $1
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(id)
    .bind(&product.name)
    .bind(&product.slug)
    .bind(&product.pid)
    .bind(&product.description)
    .bind(product.is_digital)
    .bind(product.is_active)
    .bind(product.category_id)
    .bind(product.product_type_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row)
}

/// Locks a product row for the rest of the transaction, returning whether it exists.
///
/// Writers of a product's lines take this lock first, so order assignment among the lines of one
/// product is serialised.
pub async fn lock(tx: &mut Transaction<'_, Postgres>, id: ProductId) -> SqlResult<bool> {
    let found =
        sqlx::query_scalar::<_, ProductId>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(found.is_some())
}

/// Links an attribute value to a product.
///
/// # Returns
/// * `Err(StoreError::AlreadyExists)` - The link exists
/// * `Err(StoreError::NotFound)` - Either side doesn't exist
pub async fn attach_attribute_value(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    attribute_value_id: AttributeValueId,
) -> SqlResult<ProductAttributeValue> {
    sqlx::query(
        r#"
        INSERT INTO product_attribute_values (product_id, attribute_value_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(product_id)
    .bind(attribute_value_id)
    .execute(&mut **tx)
    .await?;
    Ok(ProductAttributeValue {
        product_id,
        attribute_value_id,
    })
}

/// Lists the active products with `slug`.
pub async fn list_active_by_slug(
    tx: &mut Transaction<'_, Postgres>,
    slug: &str,
) -> SqlResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(&format!(
        "SELECT {} FROM products WHERE slug = $1 AND is_active ORDER BY id",
        COLUMNS
    ))
    .bind(slug)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}

/// Lists the active products filed under the category with `slug`.
pub async fn list_active_by_category_slug(
    tx: &mut Transaction<'_, Postgres>,
    slug: &str,
) -> SqlResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT p.id, p.name, p.slug, p.pid, p.description, p.is_digital, p.is_active,
               p.category_id, p.product_type_id, p.created_at
        FROM products p
        JOIN categories c ON c.id = p.category_id
        WHERE c.slug = $1 AND p.is_active
        ORDER BY p.id
        "#,
    )
    .bind(slug)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}
