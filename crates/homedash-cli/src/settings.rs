//! `settings` command: read or replace the stored settings document.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use homedash_core::Settings;

#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    /// Print the settings document
    Show {
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Replace the settings document with the contents of a JSON file
    Import {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        user_id: Option<i64>,
    },
}

pub(crate) async fn run_settings(
    pool: &sqlx::PgPool,
    command: SettingsCommands,
) -> anyhow::Result<()> {
    match command {
        SettingsCommands::Show { user_id } => {
            let row = homedash_db::get_settings(pool, user_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no settings document for {}", owner(user_id)))?;
            println!("{}", serde_json::to_string_pretty(&row.document)?);
        }
        SettingsCommands::Import { file, user_id } => {
            let document = read_document(&file)?;
            let row = homedash_db::upsert_settings(pool, user_id, &document).await?;
            tracing::info!(user_id = ?row.user_id, file = %file.display(), "settings imported");
            println!(
                "settings for {} saved (updated {})",
                owner(row.user_id),
                row.updated_at.to_rfc3339()
            );
        }
    }
    Ok(())
}

/// Read and validate a settings document from disk.
pub(crate) fn read_document(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {e}", path.display()))?;
    if !document.is_object() {
        anyhow::bail!("{} must contain a JSON object", path.display());
    }
    Settings::from_document(document.clone())?;
    Ok(document)
}

fn owner(user_id: Option<i64>) -> String {
    user_id.map_or_else(|| "global settings".to_string(), |id| format!("user {id}"))
}
