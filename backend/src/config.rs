//! Application settings loaded via OrthoConfig.
//!
//! Every field can come from `RECIPES_*` environment variables, a config
//! file or the command line. Unset fields fall back to the defaults exposed
//! by the accessor methods.

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MEDIA_ROOT: &str = "./media";
pub const DEFAULT_MEDIA_URL: &str = "/media/";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Runtime configuration for the recipe API server.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPES")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_size: Option<u32>,
    /// Directory receiving uploaded images.
    pub media_root: Option<PathBuf>,
    /// Public URL prefix under which `media_root` is served.
    pub media_url: Option<String>,
    /// Email of a superuser created at startup when absent.
    pub superuser_email: Option<String>,
    /// Password for the startup superuser.
    pub superuser_password: Option<String>,
}

/// Credentials for the optional startup superuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperuserSettings<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl AppSettings {
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn media_root(&self) -> &Path {
        self.media_root
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MEDIA_ROOT))
    }

    pub fn media_url(&self) -> &str {
        self.media_url.as_deref().unwrap_or(DEFAULT_MEDIA_URL)
    }

    /// Superuser credentials, present only when both halves are configured.
    pub fn superuser(&self) -> Option<SuperuserSettings<'_>> {
        match (self.superuser_email.as_deref(), self.superuser_password.as_deref()) {
            (Some(email), Some(password)) => Some(SuperuserSettings { email, password }),
            _ => None,
        }
    }
}
