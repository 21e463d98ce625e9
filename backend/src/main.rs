//! Backend entry-point: loads settings, wires adapters, and serves the REST API.

mod server;

#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::config::AppSettings;
use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, build_http_state, create_server, ensure_superuser};

#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(make: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match make() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(error = %error, "metrics initialization failed; continuing without /metrics");
            None
        }
    }
}

async fn connect_database(settings: &AppSettings) -> std::io::Result<Option<DbPool>> {
    let Some(database_url) = settings.database_url() else {
        return Ok(None);
    };
    run_migrations(database_url)
        .await
        .map_err(|err| std::io::Error::other(format!("database migrations failed: {err}")))?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_size()))
        .await
        .map_err(|err| std::io::Error::other(format!("database pool setup failed: {err}")))?;
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;

    let mut config = ServerConfig::from_settings(&settings);
    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("recipes")
            .endpoint("/metrics")
            .build()
    }));

    let http_state = build_http_state(&config)?;
    if let Some(superuser) = settings.superuser() {
        ensure_superuser(&http_state, superuser)
            .await
            .map_err(|err| std::io::Error::other(format!("superuser bootstrap failed: {err}")))?;
    }

    info!(
        bind_addr = config.bind_addr(),
        media_root = %config.media_root().display(),
        "starting server"
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, http_state, config)?;
    server.await
}
