use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use storefront::{
    cli_utils::{self, OutputFormat},
    commands::{
        handle_categories_command, handle_category_command, handle_create_command,
        handle_product_command, handle_update_command,
    },
    http_utils::{CatalogClient, DEFAULT_BASE_URL},
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Base URL of the storefront server")]
    base_url: String,
    #[arrrg(optional, "Output format: json or yaml (default: json)")]
    output: String,
}

const USAGE: &str = r#"Usage: storefrontctl [options] <command> [args...]

Options:
  --base-url <url>     Base URL of the storefront server (default: http://127.0.0.1:8080)
  --output <format>    Output format: json or yaml (default: json)

Commands:
  categories                              List active categories
  product <slug>                          Show the products with a slug
  category <slug>                         List the products of a category
  create <resource> <json|@file>          Create a row through the admin API
  update <resource> <id> <json|@file>     Replace a row through the admin API

Resources:
  categories, product-types, attributes, attribute-values, products,
  product-lines, product-images"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) =
        Options::from_command_line_relaxed("USAGE: storefrontctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let base_url = if options.base_url.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        options.base_url
    };
    let output = if options.output.is_empty() {
        OutputFormat::default()
    } else {
        options
            .output
            .parse::<OutputFormat>()
            .unwrap_or_else(|e: String| cli_utils::exit_with_usage_error(&e, USAGE))
    };

    let client = CatalogClient::new(base_url);

    match free[0].as_str() {
        "categories" => handle_categories_command(&free, &client, output).await,
        "product" => handle_product_command(&free, &client, output).await,
        "category" => handle_category_command(&free, &client, output).await,
        "create" => handle_create_command(&free, &client, output).await,
        "update" => handle_update_command(&free, &client, output).await,
        "help" => println!("{}", USAGE),
        _ => {
            cli_utils::exit_with_error(&format!(
                "Unknown command '{}'. Available commands: categories, product, category, create, update",
                free[0]
            ));
        }
    }

    Ok(())
}
