//! tally-config
//!
//! Persistent application settings and configuration model.
//! Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{ConfigManager, DATA_DIR_ENV};
pub use model::Config;
