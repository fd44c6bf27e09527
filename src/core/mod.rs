//! Core Module
//!
//! Configuration, shared state and background task plumbing.

pub mod config;
pub mod state;
pub mod tasks;

pub use config::{Config, IMPORT_THROTTLE_EVERY};
pub use state::CatalogState;
pub use tasks::{BackgroundTasks, TaskKind};

/// Load `.env` and initialize logging. Call once at process start.
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    let log_dir = config.log_dir();
    crate::utils::logger::init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        log_dir.to_str(),
    );
}
