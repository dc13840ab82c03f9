//! Process-level plumbing shared by the Foodgram binaries: layered configuration,
//! logging initialisation and shutdown signals.

pub mod config;
pub mod home_dir;
pub mod logging;
pub mod shutdown;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
pub use shutdown::wait_for_shutdown;
