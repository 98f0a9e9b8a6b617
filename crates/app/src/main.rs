use std::time::Duration;

use clap::Parser;
use engine::{Engine, MemoryStore, SqliteStore};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod cli;
mod commands;
mod export;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = cli::Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "brilink={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let database = match cli.database_url.as_deref() {
        Some("memory") => Database::Memory,
        Some(url) => Database::Sqlite(url.to_string()),
        None => settings.database,
    };

    let builder = Engine::builder().grace_period(Duration::from_millis(
        settings.ledger.delete_grace_ms,
    ));
    let engine = match database {
        Database::Memory => {
            tracing::info!("using an in-memory ledger, nothing will be saved");
            builder.store(MemoryStore::new()).build().await?
        }
        Database::Sqlite(path) => {
            let db = connect_sqlite(&path).await?;
            builder.store(SqliteStore::new(db)).build().await?
        }
    };

    commands::run(&engine, cli.command).await
}

/// Accepts a bare path or a full `sqlite:` url.
async fn connect_sqlite(
    path: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{path}?mode=rwc")
    };

    tracing::debug!(%url, "connecting to database");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
