use std::process::ExitCode;

use medallion_shared::bootstrap::{exit_status, start_stage, startup_failure};
use medallion_shared::clients::db::create_pool;
use medallion_shared::{PipelineConfig, PipelineResult, Stage};

fn main() -> ExitCode {
    let config = match start_stage(Stage::Gold) {
        Ok(config) => config,
        Err(e) => return startup_failure(Stage::Gold, &e),
    };
    exit_status(Stage::Gold, run(&config))
}

fn run(config: &PipelineConfig) -> PipelineResult<()> {
    let pool = create_pool(&config.database_url()?)?;
    medallion_gold::run(config, &pool).map(|_| ())
}
