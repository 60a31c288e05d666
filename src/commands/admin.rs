//! # Write Command Handlers
//!
//! Bodies are JSON, given inline or as `@file`, and are forwarded to the admin API unchanged.

use crate::cli_utils::{self, OutputFormat};
use crate::commands::shared::{read_body_or_exit, resource_or_exit, validate_args_count_or_exit};
use crate::http_utils::{self, CatalogClient};

const CREATE_USAGE: &str = r#"Usage: storefrontctl create <resource> <json|@file>
Example: storefrontctl create categories '{"name":"Shoes","slug":"shoes","is_active":true}'"#;

const UPDATE_USAGE: &str = r#"Usage: storefrontctl update <resource> <id> <json|@file>
Example: storefrontctl update product-lines 7 @line.json"#;

/// `storefrontctl create <resource> <json|@file>`
pub async fn handle_create_command(args: &[String], client: &CatalogClient, output: OutputFormat) {
    validate_args_count_or_exit(args, 3, 3, CREATE_USAGE);
    let resource = resource_or_exit(&args[1]);
    let body = read_body_or_exit(&args[2]);
    let path = format!("admin/{}", resource);
    let created = http_utils::execute_or_exit(
        || client.post::<serde_json::Value, serde_json::Value>(&path, &body),
        &format!("Failed to create {}", resource),
    )
    .await;
    cli_utils::print_or_exit(&created, output, resource);
}

/// `storefrontctl update <resource> <id> <json|@file>`
pub async fn handle_update_command(args: &[String], client: &CatalogClient, output: OutputFormat) {
    validate_args_count_or_exit(args, 4, 4, UPDATE_USAGE);
    let resource = resource_or_exit(&args[1]);
    let id: i64 = args[2]
        .parse()
        .unwrap_or_else(|_| cli_utils::exit_with_error(&format!("Invalid id '{}'", args[2])));
    let body = read_body_or_exit(&args[3]);
    let path = format!("admin/{}/{}", resource, id);
    let updated = http_utils::execute_or_exit(
        || client.put::<serde_json::Value, serde_json::Value>(&path, &body),
        &format!("Failed to update {}", resource),
    )
    .await;
    cli_utils::print_or_exit(&updated, output, resource);
}
