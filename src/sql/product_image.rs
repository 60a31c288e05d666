//! Product image operations for PostgreSQL database.

use sqlx::{Postgres, Transaction};

use super::{SqlResult, order_conflict, raw_ids};
use crate::{NewProductImage, Order, ProductImage, ProductImageId, ProductLineId};

const COLUMNS: &str = r#"id, alternative_text, url, "order", product_line_id"#;
const ORDER_KEY: &str = "product_images_order_key";

/// Retrieves a product image by id.
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductImageId,
) -> SqlResult<Option<ProductImage>> {
    let row = sqlx::query_as::<_, ProductImage>(&format!(
        "SELECT {} FROM product_images WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row)
}

/// Returns (id, order) of every image of `product_line_id`.
pub async fn sibling_orders(
    tx: &mut Transaction<'_, Postgres>,
    product_line_id: ProductLineId,
) -> SqlResult<Vec<(ProductImageId, Order)>> {
    let rows = sqlx::query_as::<_, (ProductImageId, Order)>(
        r#"SELECT id, "order" FROM product_images WHERE product_line_id = $1"#,
    )
    .bind(product_line_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}

/// Inserts a product image at `order`.
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    image: &NewProductImage,
    order: Order,
) -> SqlResult<ProductImage> {
    sqlx::query_as::<_, ProductImage>(&format!(
        r#"
        INSERT INTO product_images (alternative_text, url, "order", product_line_id)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(&image.alternative_text)
    .bind(&image.url)
    .bind(order)
    .bind(image.product_line_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|err| order_conflict(err, ORDER_KEY, order))
}

/// Replaces a product image's fields.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: ProductImageId,
    image: &NewProductImage,
    order: Order,
) -> SqlResult<Option<ProductImage>> {
    sqlx::query_as::<_, ProductImage>(&format!(
        r#"
        UPDATE product_images
        SET alternative_text = $2, url = $3, "order" = $4, product_line_id = $5
        WHERE id = $1
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(id)
    .bind(&image.alternative_text)
    .bind(&image.url)
    .bind(order)
    .bind(image.product_line_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|err| order_conflict(err, ORDER_KEY, order))
}

/// Lists the images of every line in `lines`, by line then order.
pub async fn list_for_lines(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[ProductLineId],
) -> SqlResult<Vec<ProductImage>> {
    let rows = sqlx::query_as::<_, ProductImage>(&format!(
        r#"
        SELECT {}
        FROM product_images
        WHERE product_line_id = ANY($1)
        ORDER BY product_line_id, "order", id
        "#,
        COLUMNS
    ))
    .bind(raw_ids(lines, ProductLineId::get))
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}
