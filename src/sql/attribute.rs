//! Attribute and attribute value operations for PostgreSQL database.

use sqlx::{Postgres, Transaction};

use super::{SqlResult, raw_ids};
use crate::{
    Attribute, AttributeId, AttributeValue, AttributeValueId, NewAttribute, NewAttributeValue,
    ProductId, ProductLineId, ResolvedAttributeValue,
};

/// An attribute value joined with its attribute and tagged with the row it hangs off.
#[derive(Debug, sqlx::FromRow)]
struct OwnedValueRow {
    owner_id: i64,
    value_id: AttributeValueId,
    attribute_value: String,
    attribute_id: AttributeId,
    attribute_name: String,
    attribute_description: String,
}

impl OwnedValueRow {
    fn into_resolved(self) -> (i64, ResolvedAttributeValue) {
        (
            self.owner_id,
            ResolvedAttributeValue {
                value: AttributeValue {
                    id: self.value_id,
                    attribute_value: self.attribute_value,
                    attribute_id: self.attribute_id,
                },
                attribute: Attribute {
                    id: self.attribute_id,
                    name: self.attribute_name,
                    description: self.attribute_description,
                },
            },
        )
    }
}

/// Inserts an attribute.
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    attribute: &NewAttribute,
) -> SqlResult<Attribute> {
    let row = sqlx::query_as::<_, Attribute>(
        r#"
        INSERT INTO attributes (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description
        "#,
    )
    .bind(&attribute.name)
    .bind(&attribute.description)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

/// Inserts an attribute value.
///
/// # Returns
/// * `Err(StoreError::NotFound)` - The attribute doesn't exist
pub async fn insert_value(
    tx: &mut Transaction<'_, Postgres>,
    value: &NewAttributeValue,
) -> SqlResult<AttributeValue> {
    let row = sqlx::query_as::<_, AttributeValue>(
        r#"
        INSERT INTO attribute_values (attribute_value, attribute_id)
        VALUES ($1, $2)
        RETURNING id, attribute_value, attribute_id
        "#,
    )
    .bind(&value.attribute_value)
    .bind(value.attribute_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

/// Returns the attribute a value belongs to, or `None` when the value doesn't exist.
pub async fn attribute_of(
    tx: &mut Transaction<'_, Postgres>,
    value_id: AttributeValueId,
) -> SqlResult<Option<AttributeId>> {
    let attribute = sqlx::query_scalar::<_, AttributeId>(
        "SELECT attribute_id FROM attribute_values WHERE id = $1",
    )
    .bind(value_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(attribute)
}

/// Loads the attribute values of every product in `products`, keyed by product.
pub async fn for_products(
    tx: &mut Transaction<'_, Postgres>,
    products: &[ProductId],
) -> SqlResult<Vec<(ProductId, ResolvedAttributeValue)>> {
    let rows = sqlx::query_as::<_, OwnedValueRow>(
        r#"
        SELECT pav.product_id AS owner_id, av.id AS value_id, av.attribute_value,
               av.attribute_id, a.name AS attribute_name, a.description AS attribute_description
        FROM product_attribute_values pav
        JOIN attribute_values av ON av.id = pav.attribute_value_id
        JOIN attributes a ON a.id = av.attribute_id
        WHERE pav.product_id = ANY($1)
        ORDER BY av.id
        "#,
    )
    .bind(raw_ids(products, ProductId::get))
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows
        .into_iter()
        .map(OwnedValueRow::into_resolved)
        .map(|(owner, value)| (ProductId::new(owner), value))
        .collect())
}

/// Loads the attribute values of every product line in `lines`, keyed by line.
pub async fn for_product_lines(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[ProductLineId],
) -> SqlResult<Vec<(ProductLineId, ResolvedAttributeValue)>> {
    let rows = sqlx::query_as::<_, OwnedValueRow>(
        r#"
        SELECT plav.product_line_id AS owner_id, av.id AS value_id, av.attribute_value,
               av.attribute_id, a.name AS attribute_name, a.description AS attribute_description
        FROM product_line_attribute_values plav
        JOIN attribute_values av ON av.id = plav.attribute_value_id
        JOIN attributes a ON a.id = av.attribute_id
        WHERE plav.product_line_id = ANY($1)
        ORDER BY av.id
        "#,
    )
    .bind(raw_ids(lines, ProductLineId::get))
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows
        .into_iter()
        .map(OwnedValueRow::into_resolved)
        .map(|(owner, value)| (ProductLineId::new(owner), value))
        .collect())
}
