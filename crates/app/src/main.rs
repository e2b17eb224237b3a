use std::path::PathBuf;

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pocketbook={level},server={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    let (db, database_path) = parse_database(&settings.server.database).await?;

    let ledger = ledger::Ledger::builder().database(db).build();
    ledger.seed_defaults().await?;
    tracing::info!("Database ready, defaults seeded");

    let bind = settings.server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(ledger, database_path, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<(sea_orm::DatabaseConnection, Option<PathBuf>), Box<dyn std::error::Error + Send + Sync>>
{
    let (url, path) = match config {
        Database::Memory => (String::from("sqlite::memory:"), None),
        Database::Sqlite(path) => (
            format!("sqlite:{}?mode=rwc", path),
            Some(PathBuf::from(path)),
        ),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok((database, path))
}
