//! `snapshots` command: browse stored pipeline output.

use clap::Subcommand;
use homedash_core::Integration;

#[derive(Debug, Subcommand)]
pub enum SnapshotsCommands {
    /// List recent snapshots, newest first
    List {
        integration: Integration,
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long, default_value = "10")]
        limit: i64,
    },
    /// Print the newest snapshot document
    Latest {
        integration: Integration,
        #[arg(long)]
        user_id: Option<i64>,
    },
}

pub(crate) async fn run_snapshots(
    pool: &sqlx::PgPool,
    command: SnapshotsCommands,
) -> anyhow::Result<()> {
    match command {
        SnapshotsCommands::List {
            integration,
            user_id,
            limit,
        } => {
            let rows =
                homedash_db::list_snapshots(pool, integration, user_id, limit.clamp(1, 200)).await?;
            if rows.is_empty() {
                println!("no {integration} snapshots");
                return Ok(());
            }
            println!("{:<8} {:<25} SIZE", "ID", "CREATED");
            for row in rows {
                println!(
                    "{:<8} {:<25} {}",
                    row.id,
                    row.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    row.document.to_string().len()
                );
            }
        }
        SnapshotsCommands::Latest {
            integration,
            user_id,
        } => {
            let row = homedash_db::latest_snapshot(pool, integration, user_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no {integration} snapshot yet"))?;
            println!("{}", serde_json::to_string_pretty(&row.document)?);
        }
    }
    Ok(())
}
