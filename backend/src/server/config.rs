//! HTTP server configuration object and helpers.

use std::path::{Path, PathBuf};

use backend::config::AppSettings;
use backend::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: String,
    pub(crate) media_root: PathBuf,
    pub(crate) media_url: String,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        bind_addr: impl Into<String>,
        media_root: impl Into<PathBuf>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            media_root: media_root.into(),
            media_url: media_url.into(),
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Server configuration taken from loaded settings, without a pool.
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(
            settings.bind_addr(),
            settings.media_root(),
            settings.media_url(),
        )
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one the server wires the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    #[must_use]
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
