//! # Command Handlers
//!
//! This module contains the command handlers of the `storefrontctl` CLI application.
//!
//! ## Structure
//!
//! - `catalog` - Read commands (categories, product, category)
//! - `admin` - Write commands (create, update)
//! - `shared` - Argument validation and body loading

/// `create` and `update` against the admin API.
pub mod admin;
/// `categories`, `product` and `category` against the read API.
pub mod catalog;
/// Argument checks and request bodies.
pub mod shared;

pub use admin::{handle_create_command, handle_update_command};
pub use catalog::{handle_categories_command, handle_category_command, handle_product_command};
