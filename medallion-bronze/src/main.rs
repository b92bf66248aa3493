use std::process::ExitCode;

use medallion_shared::bootstrap::{exit_status, start_stage, startup_failure};
use medallion_shared::clients::db::create_pool;
use medallion_shared::{PipelineConfig, PipelineResult, Stage};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match start_stage(Stage::Bronze) {
        Ok(config) => config,
        Err(e) => return startup_failure(Stage::Bronze, &e),
    };
    exit_status(Stage::Bronze, run(&config).await)
}

async fn run(config: &PipelineConfig) -> PipelineResult<()> {
    let pool = create_pool(&config.database_url()?)?;
    let summary = medallion_bronze::run(config, &pool).await?;
    if !summary.failed.is_empty() {
        tracing::warn!(tables = ?summary.failed, "some bronze tables failed to load");
    }
    Ok(())
}
