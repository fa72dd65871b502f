//! Process-level plumbing shared by the server binary: layered configuration
//! and logging bootstrap.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
