use std::path::PathBuf;
use std::sync::Arc;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use storefront::{
    CatalogStore, Fixture, InMemoryCatalogStore, PgCatalogStore, ServerConfig, apply_fixture,
    cli_utils, create_admin_router, create_catalog_router, logging,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Args {
    #[arrrg(optional, "PostgreSQL database URL (in-memory store when unset)")]
    database_url: Option<String>,
    #[arrrg(optional, "YAML fixture to load at startup")]
    seed: Option<String>,
    #[arrrg(optional, "Host to bind the HTTP server")]
    host: Option<String>,
    #[arrrg(optional, "Port to bind the HTTP server")]
    port: Option<u16>,
    #[arrrg(optional, "Prefix for image URLs in documents")]
    media_url: Option<String>,
    #[arrrg(flag, "Emit logs as JSON lines")]
    log_json: bool,
}

const HELP_TEXT: &str = r#"storefrontd - product catalog daemon

USAGE:
    storefrontd [OPTIONS]

OPTIONS:
    --database-url <URL>   PostgreSQL database URL [default: in-memory store]
    --seed <FILE>          YAML fixture applied through the write path at startup
    --host <HOST>          Host to bind the HTTP server [default: 127.0.0.1]
    --port <PORT>          Port to bind the HTTP server [default: 8080]
    --media-url <PREFIX>   Prefix for image URLs in documents [default: /media/]
    --log-json             Emit logs as JSON lines

Log verbosity follows RUST_LOG [default: info].

API ENDPOINTS:
    Catalog:
      GET    /categories                    Active categories in tree order
      GET    /products/{slug}               Active products with the slug
      GET    /products/category/{slug}      Active products of a category

    Admin:
      POST   /admin/categories              Create a category
      PUT    /admin/categories/{id}         Update a category
      POST   /admin/product-types           Create a product type
      PUT    /admin/product-types/{id}      Update a product type
      POST   /admin/product-types/{id}/attributes
      POST   /admin/attributes              Create an attribute
      POST   /admin/attribute-values        Create an attribute value
      POST   /admin/products                Create a product
      PUT    /admin/products/{id}           Update a product
      POST   /admin/products/{id}/attribute-values
      POST   /admin/product-lines           Create a product line
      PUT    /admin/product-lines/{id}      Update a product line
      POST   /admin/product-lines/{id}/attribute-values
      POST   /admin/product-images          Create a product image
      PUT    /admin/product-images/{id}     Update a product image"#;

impl Args {
    fn into_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            database_url: self.database_url,
            seed: self.seed.map(PathBuf::from),
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            media_url: self.media_url.unwrap_or(defaults.media_url),
            log_json: self.log_json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = Args::from_command_line("USAGE: storefrontd [OPTIONS]");

    if !free.is_empty() && free[0] == "help" {
        println!("{}", HELP_TEXT);
        return Ok(());
    }
    if !free.is_empty() {
        cli_utils::exit_with_usage_error(&format!("Unexpected arguments: {:?}", free), HELP_TEXT);
    }

    let config = args.into_config();
    logging::init_tracing(config.log_json)?;
    info!(store = %config.store_description(), "storefrontd starting");

    match &config.database_url {
        Some(url) => {
            let store = PgCatalogStore::connect(url).await?;
            serve(Arc::new(store), &config).await
        }
        None => serve(Arc::new(InMemoryCatalogStore::new()), &config).await,
    }
}

async fn serve<S: CatalogStore>(
    store: Arc<S>,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &config.seed {
        let fixture = Fixture::load(path)?;
        let summary = apply_fixture(store.as_ref(), &fixture).await?;
        info!(
            seed = %path.display(),
            categories = summary.categories,
            products = summary.products,
            "seed loaded"
        );
    }

    let app = Router::new()
        .merge(create_catalog_router(Arc::clone(&store), &config.media_url))
        .nest("/admin", create_admin_router(store));

    let addr = config.bind_address()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
    info!(address = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("storefrontd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, stopping server gracefully");
}
