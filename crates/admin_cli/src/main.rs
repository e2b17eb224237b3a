use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ledger::Ledger;
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "pocketbook_admin")]
#[command(about = "Admin utilities for Pocketbook (bootstrap and backups)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./pocketbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the schema and seed default accounts/categories.
    Init,
    Account(Account),
    Category(Category),
    /// Copy the database file to a backup destination.
    Backup(BackupArgs),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Add(AddArgs),
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Add(AddArgs),
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct BackupArgs {
    #[arg(long)]
    dest: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            let ledger = connect(&cli.database_url).await?;
            ledger.seed_defaults().await?;
            println!("database initialized");
        }
        Command::Account(account) => {
            let AccountCommand::Add(args) = account.command;
            let ledger = connect(&cli.database_url).await?;
            let id = ledger.create_account(&args.name).await?;
            println!("account {} -> {id}", args.name);
        }
        Command::Category(category) => {
            let CategoryCommand::Add(args) = category.command;
            let ledger = connect(&cli.database_url).await?;
            let id = ledger.create_category(&args.name).await?;
            println!("category {} -> {id}", args.name);
        }
        Command::Backup(args) => backup(&cli.database_url, &args.dest)?,
    }

    Ok(())
}

async fn connect(database_url: &str) -> Result<Ledger, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Ledger::builder().database(db).build())
}

fn backup(database_url: &str, dest: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(path) = sqlite_file_path(database_url) else {
        return Err("backup requires a file-backed sqlite database".into());
    };
    std::fs::copy(path, dest)?;
    println!("backup written to {}", dest.display());
    Ok(())
}

/// Extract the file path from a `sqlite:` URL; `None` for in-memory databases.
fn sqlite_file_path(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    if rest.is_empty() || rest.starts_with(":memory:") {
        return None;
    }
    rest.split('?').next().filter(|path| !path.is_empty())
}
