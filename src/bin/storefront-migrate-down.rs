//! Reverts the most recent catalog migration.

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use tracing::info;

use storefront::{ServerConfig, cli_utils, logging};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(required, "PostgreSQL database URL")]
    database_url: String,
}

const USAGE: &str = r#"Usage: storefront-migrate-down --database-url <URL>

Revert the most recent catalog migration.  Reverting the initial migration
drops every catalog table.

Arguments:
  --database-url <URL>    PostgreSQL database connection URL"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line(USAGE);
    if !free.is_empty() {
        cli_utils::exit_with_usage_error(&format!("Unexpected arguments: {:?}", free), USAGE);
    }
    logging::init_tracing(false)?;

    let config = ServerConfig {
        database_url: Some(options.database_url),
        ..ServerConfig::default()
    };
    info!(database = %config.store_description(), "connecting");
    let pool = sqlx::PgPool::connect(config.database_url.as_deref().unwrap_or_default()).await?;

    sqlx::migrate!("./migrations").undo(&pool, 1).await?;
    info!("reverted the most recent migration");
    Ok(())
}
