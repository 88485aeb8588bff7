//! Background job scheduler.
//!
//! Registers one recurring job per integration. Each job runs the pipeline
//! for the configured owner and logs the outcome; a failed run never stops
//! the scheduler.

use std::sync::Arc;

use homedash_core::{AppConfig, Integration};
use homedash_db::PgStore;
use homedash_integrations::{run_and_log, Clients};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    store: PgStore,
    clients: Arc<Clients>,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    for integration in Integration::ALL {
        let cron = cron_for(&config, integration);
        register_pipeline_job(
            &scheduler,
            integration,
            cron,
            store.clone(),
            Arc::clone(&clients),
            config.schedule_user_id,
        )
        .await?;
    }

    scheduler.start().await?;
    Ok(scheduler)
}

fn cron_for(config: &AppConfig, integration: Integration) -> &str {
    match integration {
        Integration::Music => &config.music_cron,
        Integration::Trakt => &config.trakt_cron,
        Integration::Feedly => &config.feedly_cron,
        Integration::Goodreads => &config.goodreads_cron,
    }
}

async fn register_pipeline_job(
    scheduler: &JobScheduler,
    integration: Integration,
    cron: &str,
    store: PgStore,
    clients: Arc<Clients>,
    user_id: Option<i64>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let store = store.clone();
        let clients = Arc::clone(&clients);

        Box::pin(async move {
            tracing::info!(%integration, "scheduler: starting run");
            let outcome = run_and_log(&store, &clients, integration, user_id).await;
            tracing::info!(
                %integration,
                saved = outcome.is_saved(),
                "scheduler: run complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(%integration, cron, "scheduler: job registered");
    Ok(())
}
