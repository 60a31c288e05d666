//! PostgreSQL database operations for the catalog.
//!
//! This module provides functions for interacting with the PostgreSQL database,
//! organized by table.  Every function runs inside a caller-supplied transaction;
//! [`PgCatalogStore`] strings them together into the write and read paths of
//! [`CatalogStore`](crate::CatalogStore).

use crate::{Order, StoreError, ValidationError};

/// Attribute and attribute value operations.
pub mod attribute;

/// Category operations with nested-set renumbering.
pub mod category;

/// Product operations.
pub mod product;

/// Product image operations.
pub mod product_image;

/// Product line operations.
pub mod product_line;

/// Product type operations.
pub mod product_type;

mod store;

pub use store::PgCatalogStore;

/// Result type for database operations.
pub type SqlResult<T> = Result<T, StoreError>;

/// Maps a unique violation on `constraint` to a duplicate-order rejection.
///
/// The write path checks sibling orders before inserting; the unique index only fires when two
/// writers raced past that check.
pub(crate) fn order_conflict(err: sqlx::Error, constraint: &str, order: Order) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(constraint) {
            return ValidationError::DuplicateOrder { order }.into();
        }
    }
    err.into()
}

/// Converts typed ids to the raw values bound as a `BIGINT[]` parameter.
pub(crate) fn raw_ids<I: Copy>(ids: &[I], get: impl Fn(I) -> i64) -> Vec<i64> {
    ids.iter().copied().map(get).collect()
}

#[cfg(test)]
/// Test utilities for PostgreSQL database operations.
pub mod tests {
    use sqlx::PgPool;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Creates a unique test database for each test invocation.
    ///
    /// The server is taken from `TEST_DATABASE_URL`, falling back to a local
    /// `storefront_test` database.
    ///
    /// The database is created by:
    /// 1. Connecting to the base database URL
    /// 2. Creating a new database with a unique name
    /// 3. Running migrations on the new database
    /// 4. Returning a connection pool to the new database
    pub async fn setup_test_db() -> PgPool {
        let base_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/storefront_test".to_string());

        let pid = std::process::id();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("storefront_test_{}_{}_{}", pid, timestamp, counter);

        let mut parsed_url = url::Url::parse(&base_url).expect("Invalid database URL");

        let admin_pool = PgPool::connect(&base_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::query(&format!("CREATE DATABASE {}", db_name))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test database");

        admin_pool.close().await;

        parsed_url.set_path(&format!("/{}", db_name));
        let test_db_url = parsed_url.as_str();

        let pool = PgPool::connect(test_db_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }
}
