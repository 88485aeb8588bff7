mod run;
mod settings;
mod snapshots;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::run::RunTarget;
use crate::settings::SettingsCommands;
use crate::snapshots::SnapshotsCommands;

#[derive(Debug, Parser)]
#[command(name = "homedash-cli")]
#[command(about = "homedash command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Inspect or replace the settings document
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Run an integration pipeline now
    Run {
        /// Integration to run (music, trakt, feedly, goodreads) or `all`
        #[arg(value_parser = run::parse_target)]
        target: RunTarget,

        /// Settings owner; omit for the global document
        #[arg(long)]
        user_id: Option<i64>,

        /// Build the snapshot and print it without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Browse stored snapshots
    Snapshots {
        #[command(subcommand)]
        command: SnapshotsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("homedash-cli: pass --help for available commands");
        return Ok(());
    };

    let config = homedash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = homedash_db::PoolConfig::from_app_config(&config);
    let pool = homedash_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                homedash_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = homedash_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Settings { command } => settings::run_settings(&pool, command).await?,
        Commands::Run {
            target,
            user_id,
            dry_run,
        } => run::run_target(&pool, &config, target, user_id, dry_run).await?,
        Commands::Snapshots { command } => snapshots::run_snapshots(&pool, command).await?,
    }

    Ok(())
}
