mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use homedash_db::PgStore;
use homedash_integrations::Clients;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(homedash_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = homedash_db::PoolConfig::from_app_config(&config);
    let pool = homedash_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = homedash_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations up to date");

    let clients = Arc::new(Clients::from_app_config(&config)?);
    let _scheduler =
        scheduler::build_scheduler(PgStore::new(pool.clone()), clients, Arc::clone(&config))
            .await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        homedash_core::Environment::Development
    ))?;
    let app = build_app(AppState { pool }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "homedash-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
