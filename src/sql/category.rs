//! Category operations for PostgreSQL database.
//!
//! Category writes hold an exclusive lock on the table for the rest of the transaction so that
//! the nested-set renumbering of one write never interleaves with another.

use std::collections::HashMap;

use sqlx::{Postgres, Transaction};

use super::SqlResult;
use crate::tree::{TreeNode, number_forest};
use crate::{Category, CategoryId, NewCategory};

const COLUMNS: &str = "id, name, slug, is_active, parent_id, tree_id, lft, rght, level";

#[derive(sqlx::FromRow)]
struct NodeRow {
    id: CategoryId,
    parent_id: Option<CategoryId>,
    name: String,
}

/// Serialises category writers until the transaction ends.
pub async fn lock(tx: &mut Transaction<'_, Postgres>) -> SqlResult<()> {
    sqlx::query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Retrieves a category by id.
pub async fn get(tx: &mut Transaction<'_, Postgres>, id: CategoryId) -> SqlResult<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row)
}

/// Inserts a category with zeroed tree numbering.  Call [`renumber`] before committing.
///
/// # Returns
/// * `Ok(CategoryId)` - Id of the new row
/// * `Err(StoreError::AlreadyExists)` - The name or slug is taken
/// * `Err(StoreError::NotFound)` - The parent doesn't exist
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    category: &NewCategory,
) -> SqlResult<CategoryId> {
    let id = sqlx::query_scalar::<_, CategoryId>(
        r#"
        INSERT INTO categories (name, slug, is_active, parent_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&category.name)
    .bind(&category.slug)
    .bind(category.is_active)
    .bind(category.parent_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

/// Replaces a category's fields.  Call [`renumber`] before committing.
///
/// # Returns
/// * `Ok(true)` - The category existed and was updated
/// * `Ok(false)` - No category has this id
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: CategoryId,
    category: &NewCategory,
) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE categories
        SET name = $2, slug = $3, is_active = $4, parent_id = $5
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(category.is_active)
    .bind(category.parent_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns the parent of every non-root row.
pub async fn parent_map(
    tx: &mut Transaction<'_, Postgres>,
) -> SqlResult<HashMap<CategoryId, CategoryId>> {
    let rows = sqlx::query_as::<_, (CategoryId, CategoryId)>(
        "SELECT id, parent_id FROM categories WHERE parent_id IS NOT NULL",
    )
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Recomputes the nested-set numbering of the whole forest.
pub async fn renumber(tx: &mut Transaction<'_, Postgres>) -> SqlResult<()> {
    let rows = sqlx::query_as::<_, NodeRow>("SELECT id, parent_id, name FROM categories")
        .fetch_all(&mut **tx)
        .await?;
    let nodes: Vec<_> = rows
        .iter()
        .map(|row| TreeNode {
            id: row.id,
            parent: row.parent_id,
            name: row.name.as_str(),
        })
        .collect();
    let positions = number_forest(&nodes);

    let mut ids = Vec::with_capacity(positions.len());
    let mut tree_ids = Vec::with_capacity(positions.len());
    let mut lfts = Vec::with_capacity(positions.len());
    let mut rghts = Vec::with_capacity(positions.len());
    let mut levels = Vec::with_capacity(positions.len());
    for (id, position) in positions {
        ids.push(id.get());
        tree_ids.push(position.tree_id);
        lfts.push(position.lft);
        rghts.push(position.rght);
        levels.push(position.level);
    }

    sqlx::query(
        r#"
        UPDATE categories AS c
        SET tree_id = v.tree_id, lft = v.lft, rght = v.rght, level = v.level
        FROM UNNEST($1::BIGINT[], $2::INTEGER[], $3::INTEGER[], $4::INTEGER[], $5::INTEGER[])
            AS v(id, tree_id, lft, rght, level)
        WHERE c.id = v.id
        "#,
    )
    .bind(ids)
    .bind(tree_ids)
    .bind(lfts)
    .bind(rghts)
    .bind(levels)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Lists active categories in tree order.
pub async fn list_active(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE is_active ORDER BY tree_id, lft",
        COLUMNS
    ))
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}
