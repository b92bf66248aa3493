use serde::{Deserialize, Serialize};

/// Schema names owned by the pipeline.
pub const BRONZE_SCHEMA: &str = "bronze";
pub const SILVER_SCHEMA: &str = "silver";
pub const GOLD_SCHEMA: &str = "gold";

/// One tier of the medallion pipeline. Each stage is its own program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Bronze,
    Silver,
    Gold,
}

impl Stage {
    /// Fixed execution order.
    pub const ORDERED: [Stage; 3] = [Stage::Bronze, Stage::Silver, Stage::Gold];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }

    pub fn binary_name(&self) -> &'static str {
        match self {
            Self::Bronze => "medallion-bronze",
            Self::Silver => "medallion-silver",
            Self::Gold => "medallion-gold",
        }
    }

    pub fn log_file_name(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze_load.log",
            Self::Silver => "silver_build.log",
            Self::Gold => "gold_build.log",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Log file written by the pipeline driver itself.
pub const DRIVER_LOG_FILE: &str = "etl_pipeline.log";
