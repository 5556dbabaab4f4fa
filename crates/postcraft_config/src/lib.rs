mod build_pipeline;
mod config;
mod config_error;
mod config_loader;

pub use build_pipeline::build_pipeline;
pub use config::{Config, DEFAULT_PLUGINS};
pub use config_error::ConfigError;
pub use config_loader::{ConfigLoader, LoadedConfig, CONFIG_FILE_NAMES};
