//! `run` command: execute pipelines on demand.

use homedash_core::{AppConfig, Integration};
use homedash_db::PgStore;
use homedash_integrations::{collect, run_all, run_pipeline, Clients, RunOutcome};

/// One integration, or every integration concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    One(Integration),
    All,
}

pub(crate) fn parse_target(raw: &str) -> Result<RunTarget, String> {
    if raw.eq_ignore_ascii_case("all") {
        return Ok(RunTarget::All);
    }
    raw.parse()
        .map(RunTarget::One)
        .map_err(|e: homedash_core::UnknownIntegration| e.to_string())
}

fn targets(target: RunTarget) -> Vec<Integration> {
    match target {
        RunTarget::One(integration) => vec![integration],
        RunTarget::All => Integration::ALL.to_vec(),
    }
}

/// # Errors
///
/// Returns an error if a single-integration run fails, if any integration
/// fails in an `all` run, or if a dry-run snapshot cannot be built.
pub(crate) async fn run_target(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    target: RunTarget,
    user_id: Option<i64>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let store = PgStore::new(pool.clone());
    let clients = Clients::from_app_config(config)?;

    if dry_run {
        for integration in targets(target) {
            let snapshot = collect(&store, &clients, integration, user_id).await?;
            println!("dry-run: {integration} snapshot (not saved)");
            println!("{}", serde_json::to_string_pretty(&snapshot.to_document(user_id)?)?);
        }
        return Ok(());
    }

    match target {
        RunTarget::One(integration) => {
            let id = run_pipeline(&store, &clients, integration, user_id).await?;
            println!("{integration}: saved snapshot {id}");
        }
        RunTarget::All => {
            let outcomes = run_all(&store, &clients, user_id).await;
            for outcome in &outcomes {
                println!("{}", describe(outcome));
            }
            let failed = outcomes.iter().filter(|o| !o.is_saved()).count();
            if failed > 0 {
                anyhow::bail!("{failed} of {} integrations failed", outcomes.len());
            }
        }
    }

    Ok(())
}

pub(crate) fn describe(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Saved {
            integration,
            snapshot_id,
        } => format!("{integration}: saved snapshot {snapshot_id}"),
        RunOutcome::Failed {
            integration,
            kind,
            message,
        } => format!("{integration}: failed ({kind}): {message}"),
    }
}
