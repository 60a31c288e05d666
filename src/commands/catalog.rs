//! # Read Command Handlers

use crate::cli_utils::{self, OutputFormat};
use crate::commands::shared::validate_args_count_or_exit;
use crate::document::{CategoryDocument, ProductCategoryDocument, ProductDocument};
use crate::http_utils::{self, CatalogClient};

/// `storefrontctl categories`
pub async fn handle_categories_command(args: &[String], client: &CatalogClient, output: OutputFormat) {
    validate_args_count_or_exit(args, 1, 1, "Usage: storefrontctl categories");
    let categories = http_utils::execute_or_exit(
        || client.get::<Vec<CategoryDocument>>("categories"),
        "Failed to list categories",
    )
    .await;
    cli_utils::print_or_exit(&categories, output, "categories");
}

/// `storefrontctl product <slug>`
pub async fn handle_product_command(args: &[String], client: &CatalogClient, output: OutputFormat) {
    validate_args_count_or_exit(args, 2, 2, "Usage: storefrontctl product <slug>");
    let path = format!("products/{}", args[1]);
    let products = http_utils::execute_or_exit(
        || client.get::<Vec<ProductDocument>>(&path),
        "Failed to get product",
    )
    .await;
    cli_utils::print_or_exit(&products, output, "products");
}

/// `storefrontctl category <slug>`
pub async fn handle_category_command(args: &[String], client: &CatalogClient, output: OutputFormat) {
    validate_args_count_or_exit(args, 2, 2, "Usage: storefrontctl category <slug>");
    let path = format!("products/category/{}", args[1]);
    let products = http_utils::execute_or_exit(
        || client.get::<Vec<ProductCategoryDocument>>(&path),
        "Failed to list category products",
    )
    .await;
    cli_utils::print_or_exit(&products, output, "products");
}
