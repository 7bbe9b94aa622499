pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig, AnalysisConfig};
pub use core::{
    etl::{AnalysisEngine, RunOutcome},
    pipeline::InventoryPipeline,
};
pub use utils::error::{AnalysisError, Result};
