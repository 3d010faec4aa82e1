//! Runtime settings loaded via OrthoConfig.
//!
//! Every field can be set through `PAWMATE_*` environment variables, a
//! config file, or command-line flags. Unset values fall back to the
//! defaults exposed by the accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::inbound::http::state::DEFAULT_MATCH_RADIUS_KM;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
/// Default jitter applied to locations shown to other users.
pub const DEFAULT_JITTER_KM: f64 = 0.5;
const DEFAULT_NOTIFIER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DATABASE_PATH: &str = "pawmate.db";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid notifier URL '{value}': {source}")]
    NotifierUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("{field} must be a non-negative number, got {value}")]
    NegativeDistance { field: &'static str, value: f64 },
}

/// Settings shared by the HTTP server and the reminder job.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PAWMATE")]
pub struct PawmateSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Maximum displacement, in kilometres, applied to pet locations shown
    /// to other users.
    pub jitter_km: Option<f64>,
    /// Match radius used when a lookup omits `maxDistanceKm`.
    pub match_radius_km: Option<f64>,
    /// Relay endpoint for email/push delivery; deliveries are only logged
    /// when unset.
    pub notifier_url: Option<String>,
    /// Request timeout for the relay, in seconds.
    pub notifier_timeout_secs: Option<u64>,
    /// SQLite database holding the tree. The server and the reminder job
    /// must point at the same file.
    pub database_path: Option<PathBuf>,
    /// JSON snapshot imported when the database is still empty.
    pub seed_path: Option<PathBuf>,
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SettingsError::NegativeDistance { field, value })
    }
}

impl PawmateSettings {
    /// Configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        match self.bind_addr.as_deref() {
            None => Ok(SocketAddr::from(DEFAULT_BIND_ADDR)),
            Some(raw) => raw.parse().map_err(|source| SettingsError::BindAddr {
                value: raw.to_owned(),
                source,
            }),
        }
    }

    pub fn jitter_km(&self) -> Result<f64, SettingsError> {
        non_negative("jitter_km", self.jitter_km.unwrap_or(DEFAULT_JITTER_KM))
    }

    pub fn match_radius_km(&self) -> Result<f64, SettingsError> {
        non_negative(
            "match_radius_km",
            self.match_radius_km.unwrap_or(DEFAULT_MATCH_RADIUS_KM),
        )
    }

    /// Parsed relay endpoint, if one is configured.
    pub fn notifier_url(&self) -> Result<Option<Url>, SettingsError> {
        self.notifier_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|source| SettingsError::NotifierUrl {
                    value: raw.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Database file, falling back to `pawmate.db` in the working directory.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    pub fn notifier_timeout(&self) -> Duration {
        Duration::from_secs(
            self.notifier_timeout_secs
                .unwrap_or(DEFAULT_NOTIFIER_TIMEOUT_SECS),
        )
    }
}
