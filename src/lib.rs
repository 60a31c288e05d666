//! # Storefront: a Product Catalog with a Validated Write Path
//!
//! This crate implements the catalog of an online store: categories arranged in a forest,
//! products filed under them, purchasable product lines with images, and attribute axes such as
//! Color or Size whose values describe products and lines.  It provides:
//!
//! - **Typed schema**: every entity and join row, with newtype ids
//! - **Self-maintaining order fields**: rows deriving [`Ordered`](storefront_derive::Ordered)
//!   get the next free position among their siblings when saved without one
//! - **Write-time validation**: no two siblings share an order, no product line carries two
//!   values of the same attribute, plus field rules
//! - **Read API**: nested JSON documents served by axum over any [`CatalogStore`]
//! - **Admin API**: JSON endpoints for data entry, running the same write path
//! - **Storage**: an in-memory store and a PostgreSQL store built on sqlx
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HTTP (api: read, admin: write)          │
//! ├─────────────────────────────────────────┤
//! │ Documents (pure serialization)          │
//! ├─────────────────────────────────────────┤
//! │ CatalogStore trait                      │
//! │   validate ─ assign order ─ persist     │
//! ├───────────────────┬─────────────────────┤
//! │ InMemoryCatalog   │ PgCatalogStore      │
//! └───────────────────┴─────────────────────┘
//! ```
//!
//! ## Usage Examples
//!
//! ### Auto-ordering
//!
//! ```rust
//! # use storefront::{assign_order, NewProductImage, ProductLineId};
//! let mut image = NewProductImage {
//!     alternative_text: "front".to_string(),
//!     url: "front.jpg".to_string(),
//!     order: None,
//!     product_line_id: ProductLineId::new(1),
//! };
//! assert_eq!(assign_order(&mut image, [1, 2]), 3);
//! assert_eq!(image.order, Some(3));
//! ```
//!
//! ### Serving the catalog
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use storefront::{InMemoryCatalogStore, create_admin_router, create_catalog_router};
//! # async fn serve() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryCatalogStore::new());
//! let app = axum::Router::new()
//!     .merge(create_catalog_router(Arc::clone(&store), "/media/"))
//!     .nest("/admin", create_admin_router(store));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

extern crate self as storefront;

mod data_store;
mod errors;
mod model;
mod ordering;

/// Administrative write API.
pub mod admin;

/// Read API and the error mapping shared by all handlers.
pub mod api;

/// Command-line interface utilities for program termination and output formatting.
pub mod cli_utils;

/// Command handlers of `storefrontctl`.
pub mod commands;

/// Runtime configuration of the daemon.
pub mod config;

/// Pure serialization of catalog graphs into response documents.
pub mod document;

/// YAML seed data applied through the write path.
pub mod fixture;

/// HTTP client utilities for interacting with a running catalog.
pub mod http_utils;

/// Tracing subscriber setup.
pub mod logging;

/// PostgreSQL persistence.
pub mod sql;

/// Category and product-type hierarchies.
pub mod tree;

/// Write-time checks.
pub mod validate;

pub use admin::{AttachLineValueResponse, create_admin_router};
pub use api::{ErrorBody, create_catalog_router};
pub use config::ServerConfig;
pub use data_store::{CatalogStore, InMemoryCatalogStore, StoreResult};
pub use errors::StoreError;
pub use fixture::{Fixture, FixtureError, FixtureSummary, apply_fixture};
pub use model::*;
pub use ordering::{Ordered, assign_order, next_order, next_order_for};
pub use sql::PgCatalogStore;
pub use storefront_derive::Ordered;
pub use validate::{AttachOutcome, ValidationError};
