use clap::{Parser, Subcommand};
use sea_orm::Database;
use sea_orm_migration::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "migration")]
#[command(about = "Manage the Frollo cache schema")]
struct Cli {
    /// Cache database (also read from `FROLLO_DATABASE_URL`).
    #[arg(
        long,
        env = "FROLLO_DATABASE_URL",
        default_value = "sqlite:./frollo_cache.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
enum Command {
    /// Apply pending migrations.
    #[default]
    Up,
    /// Roll back the last `steps` migrations, or all of them.
    Down {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Drop every table and migrate from scratch.
    Fresh,
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.command.unwrap_or_default() {
        Command::Up => migration::Migrator::up(&db, None).await?,
        Command::Down { steps } => migration::Migrator::down(&db, steps).await?,
        Command::Fresh => migration::Migrator::fresh(&db).await?,
        Command::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
