//! Product type operations for PostgreSQL database.

use std::collections::HashMap;

use sqlx::{Postgres, Transaction};

use super::SqlResult;
use crate::{AttributeId, NewProductType, ProductType, ProductTypeAttribute, ProductTypeId};

/// Inserts a product type.
///
/// # Returns
/// * `Ok(ProductType)` - The new row
/// * `Err(StoreError::NotFound)` - The parent doesn't exist
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    product_type: &NewProductType,
) -> SqlResult<ProductType> {
    let row = sqlx::query_as::<_, ProductType>(
        r#"
        INSERT INTO product_types (name, parent_id)
        VALUES ($1, $2)
        RETURNING id, name, parent_id
        "#,
    )
    .bind(&product_type.name)
    .bind(product_type.parent_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

/// Replaces a product type's fields, returning `None` when no product type has this id.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductTypeId,
    product_type: &NewProductType,
) -> SqlResult<Option<ProductType>> {
    let row = sqlx::query_as::<_, ProductType>(
        r#"
        UPDATE product_types
        SET name = $2, parent_id = $3
        WHERE id = $1
        RETURNING id, name, parent_id
        "#,
    )
    .bind(id)
    .bind(&product_type.name)
    .bind(product_type.parent_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row)
}

/// Serialises product type re-parenting until the transaction ends.
pub async fn lock(tx: &mut Transaction<'_, Postgres>) -> SqlResult<()> {
    sqlx::query("LOCK TABLE product_types IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Returns the parent of every non-root row.
pub async fn parent_map(
    tx: &mut Transaction<'_, Postgres>,
) -> SqlResult<HashMap<ProductTypeId, ProductTypeId>> {
    let rows = sqlx::query_as::<_, (ProductTypeId, ProductTypeId)>(
        "SELECT id, parent_id FROM product_types WHERE parent_id IS NOT NULL",
    )
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Links an attribute to a product type.
///
/// # Returns
/// * `Err(StoreError::AlreadyExists)` - The link exists
/// * `Err(StoreError::NotFound)` - Either side doesn't exist
pub async fn attach_attribute(
    tx: &mut Transaction<'_, Postgres>,
    product_type_id: ProductTypeId,
    attribute_id: AttributeId,
) -> SqlResult<ProductTypeAttribute> {
    sqlx::query(
        r#"
        INSERT INTO product_type_attributes (product_type_id, attribute_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(product_type_id)
    .bind(attribute_id)
    .execute(&mut **tx)
    .await?;
    Ok(ProductTypeAttribute {
        product_type_id,
        attribute_id,
    })
}
