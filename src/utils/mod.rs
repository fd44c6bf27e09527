//! Utility module: shared helpers and types
//!
//! # Contents
//!
//! - [`AppError`] / [`AppResult`] - application error type
//! - [`logger`] - tracing setup
//! - [`time`] - timestamp helpers
//! - [`validation`] - input length/required checks

pub mod error;
pub mod logger;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResult};
pub use time::{iso_now, now_millis};
