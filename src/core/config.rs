//! Catalog configuration
//!
//! # Environment variables
//!
//! Every knob can be overridden through the environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/flavour-catalog | Work directory (database, logs) |
//! | ENVIRONMENT | development | development / staging / production |
//! | IMPORT_THROTTLE_MS | 250 | Delay inserted into import loops |
//! | VISITOR_TTL_SECS | 90 | Presence docs older than this are pruned |
//! | VISITOR_SWEEP_SECS | 30 | Interval of the presence sweep task |

use std::path::PathBuf;

/// Rows between two import throttle delays. The import loop sleeps for
/// [`Config::import_throttle_ms`] after every chunk of this many rows.
pub const IMPORT_THROTTLE_EVERY: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the embedded database and log files
    pub work_dir: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Milliseconds slept every [`IMPORT_THROTTLE_EVERY`] imported rows
    pub import_throttle_ms: u64,
    /// Seconds of inactivity after which a visitor presence doc is pruned
    pub visitor_ttl_secs: u64,
    /// Interval of the periodic visitor sweep task
    pub visitor_sweep_secs: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/flavour-catalog".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            import_throttle_ms: std::env::var("IMPORT_THROTTLE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(250),
            visitor_ttl_secs: std::env::var("VISITOR_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(90),
            visitor_sweep_secs: std::env::var("VISITOR_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Override the work directory, common in tests
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    /// Database directory: `{work_dir}/database`
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Log directory: `{work_dir}/logs`
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Ensure the work directory structure exists
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
