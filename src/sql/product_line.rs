//! Product line operations for PostgreSQL database.

use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use super::{SqlResult, order_conflict, raw_ids};
use crate::{
    AttributeId, AttributeValueId, NewProductLine, Order, ProductId, ProductLine, ProductLineId,
};

const COLUMNS: &str = r#"id, price, sku, stock_qty, is_active, "order", weight, product_id, product_type_id, created_at"#;
const ORDER_KEY: &str = "product_lines_order_key";

/// Retrieves a product line by id.
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductLineId,
) -> SqlResult<Option<ProductLine>> {
    let row = sqlx::query_as::<_, ProductLine>(&format!(
        "SELECT {} FROM product_lines WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row)
}

/// Locks a product line row for the rest of the transaction, returning whether it exists.
///
/// Writers of a line's images and attribute values take this lock first.
pub async fn lock(tx: &mut Transaction<'_, Postgres>, id: ProductLineId) -> SqlResult<bool> {
    let found = sqlx::query_scalar::<_, ProductLineId>(
        "SELECT id FROM product_lines WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(found.is_some())
}

/// Returns (id, order) of every line of `product_id`.
pub async fn sibling_orders(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> SqlResult<Vec<(ProductLineId, Order)>> {
    let rows = sqlx::query_as::<_, (ProductLineId, Order)>(
        r#"SELECT id, "order" FROM product_lines WHERE product_id = $1"#,
    )
    .bind(product_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}

/// Inserts a product line at `order`.
///
/// # Returns
/// * `Ok(ProductLine)` - The new row
/// * `Err(StoreError::Validation(ValidationError::DuplicateOrder { .. }))` - A concurrent
///   writer took the order
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    line: &NewProductLine,
    price: Decimal,
    order: Order,
) -> SqlResult<ProductLine> {
    sqlx::query_as::<_, ProductLine>(&format!(
        r#"
        INSERT INTO product_lines
            (price, sku, stock_qty, is_active, "order", weight, product_id, product_type_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(price)
    .bind(&line.sku)
    .bind(line.stock_qty)
    .bind(line.is_active)
    .bind(order)
    .bind(line.weight)
    .bind(line.product_id)
    .bind(line.product_type_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|err| order_conflict(err, ORDER_KEY, order))
}

/// Replaces a product line's fields, keeping `created_at`.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductLineId,
    line: &NewProductLine,
    price: Decimal,
    order: Order,
) -> SqlResult<Option<ProductLine>> {
    sqlx::query_as::<_, ProductLine>(&format!(
        r#"
        UPDATE product_lines
        SET price = $2, sku = $3, stock_qty = $4, is_active = $5, "order" = $6, weight = $7,
            product_id = $8, product_type_id = $9
        WHERE id = $1
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(id)
    .bind(price)
    .bind(&line.sku)
    .bind(line.stock_qty)
    .bind(line.is_active)
    .bind(order)
    .bind(line.weight)
    .bind(line.product_id)
    .bind(line.product_type_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|err| order_conflict(err, ORDER_KEY, order))
}

/// Returns (value, attribute) for every attribute value attached to a line.
pub async fn attached_values(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductLineId,
) -> SqlResult<Vec<(AttributeValueId, AttributeId)>> {
    let rows = sqlx::query_as::<_, (AttributeValueId, AttributeId)>(
        r#"
        SELECT av.id, av.attribute_id
        FROM product_line_attribute_values plav
        JOIN attribute_values av ON av.id = plav.attribute_value_id
        WHERE plav.product_line_id = $1
        "#,
    )
    .bind(id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}

/// Links an attribute value to a product line.
pub async fn attach_attribute_value(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductLineId,
    attribute_value_id: AttributeValueId,
) -> SqlResult<()> {
    sqlx::query(
        r#"
        INSERT INTO product_line_attribute_values (product_line_id, attribute_value_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(id)
    .bind(attribute_value_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Lists the active lines of every product in `products`, by product then order.
pub async fn list_active_for_products(
    tx: &mut Transaction<'_, Postgres>,
    products: &[ProductId],
) -> SqlResult<Vec<ProductLine>> {
    let rows = sqlx::query_as::<_, ProductLine>(&format!(
        r#"
        SELECT {}
        FROM product_lines
        WHERE product_id = ANY($1) AND is_active
        ORDER BY product_id, "order", id
        "#,
        COLUMNS
    ))
    .bind(raw_ids(products, ProductId::get))
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::tests::setup_test_db;
    use crate::sql::{category, product, product_image, product_type};
    use crate::{NewCategory, NewProduct, NewProductImage, NewProductType, StoreError, ValidationError};

    async fn seeded_product(tx: &mut Transaction<'_, Postgres>) -> NewProductLine {
        let category_id = category::insert(
            tx,
            &NewCategory {
                name: "Lamps".to_string(),
                slug: "lamps".to_string(),
                is_active: true,
                parent_id: None,
            },
        )
        .await
        .unwrap();
        let product_type = product_type::insert(
            tx,
            &NewProductType {
                name: "Lighting".to_string(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
        let product = product::insert(
            tx,
            &NewProduct {
                name: "Desk lamp".to_string(),
                slug: "desk-lamp".to_string(),
                pid: "LAMP-1".to_string(),
                description: String::new(),
                is_digital: false,
                is_active: true,
                category_id,
                product_type_id: product_type.id,
            },
        )
        .await
        .unwrap();
        NewProductLine {
            price: Decimal::new(2999, 2),
            sku: "LAMP-1-A".to_string(),
            stock_qty: 3,
            is_active: true,
            order: None,
            weight: 0.8,
            product_id: product.id,
            product_type_id: product_type.id,
        }
    }

    #[tokio::test]
    async fn taken_line_order_is_duplicate_value() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();
        let line = seeded_product(&mut tx).await;

        let first = insert(&mut tx, &line, line.price, 1).await.unwrap();
        assert_eq!(first.order, 1);
        let err = insert(&mut tx, &line, line.price, 1).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Validation(ValidationError::DuplicateOrder { order: 1 })
        );
    }

    #[tokio::test]
    async fn taken_image_order_is_duplicate_value() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();
        let line = seeded_product(&mut tx).await;
        let line = insert(&mut tx, &line, line.price, 1).await.unwrap();

        let image = NewProductImage {
            alternative_text: "front".to_string(),
            url: "front.jpg".to_string(),
            order: None,
            product_line_id: line.id,
        };
        product_image::insert(&mut tx, &image, 1).await.unwrap();
        let err = product_image::insert(&mut tx, &image, 1).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Validation(ValidationError::DuplicateOrder { order: 1 })
        );
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();
        let mut line = seeded_product(&mut tx).await;
        line.product_id = ProductId::new(999_999);

        let err = insert(&mut tx, &line, line.price, 1).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }
}
