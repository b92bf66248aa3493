pub mod bootstrap;
pub mod clients;
pub mod config;
pub mod errors;
pub mod logging;
pub mod types;

pub use config::{DatabaseConfig, PipelineConfig};
pub use errors::{ErrorCode, PipelineError, PipelineResult};
pub use types::*;
