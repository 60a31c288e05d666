//! # Shared Command Utilities

use crate::cli_utils;

/// Admin collections `storefrontctl` can write to.
pub const RESOURCES: &[&str] = &[
    "categories",
    "product-types",
    "attributes",
    "attribute-values",
    "products",
    "product-lines",
    "product-images",
];

/// Validates both minimum and maximum argument counts.
///
/// # Arguments
/// * `args` - The command arguments array (including the command itself)
/// * `min_count` - The minimum number of arguments required
/// * `max_count` - The maximum number of arguments allowed
/// * `usage` - The usage string to display
pub fn validate_args_count_or_exit(args: &[String], min_count: usize, max_count: usize, usage: &str) {
    if args.len() < min_count {
        cli_utils::exit_with_usage_error("missing arguments", usage);
    }
    if args.len() > max_count {
        cli_utils::exit_with_usage_error("too many arguments", usage);
    }
}

/// Returns `resource` if it names an admin collection, exiting otherwise.
pub fn resource_or_exit(resource: &str) -> &str {
    if RESOURCES.contains(&resource) {
        resource
    } else {
        cli_utils::exit_with_error(&format!(
            "Unknown resource '{}'. Available resources: {}",
            resource,
            RESOURCES.join(", ")
        ))
    }
}

/// Loads a request body given inline or as `@path`.
pub fn read_body(arg: &str) -> Result<serde_json::Value, String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid JSON body: {}", e))
}

/// Loads a request body or exits with an error.
pub fn read_body_or_exit(arg: &str) -> serde_json::Value {
    read_body(arg).unwrap_or_else(|e| cli_utils::exit_with_error(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_bodies() {
        let body = read_body(r#"{"name": "Shoes"}"#).unwrap();
        assert_eq!(body["name"], "Shoes");
        assert!(read_body("{").unwrap_err().starts_with("Invalid JSON body"));
    }

    #[test]
    fn missing_body_file() {
        let err = read_body("@/nonexistent/storefront/body.json").unwrap_err();
        assert!(err.starts_with("Failed to read file"));
    }
}
