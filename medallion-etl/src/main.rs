use std::process::ExitCode;

use medallion_etl::{run_pipeline, ProcessLauncher};
use medallion_shared::bootstrap::exit_code_for;
use medallion_shared::logging::init_tracing;
use medallion_shared::{PipelineConfig, PipelineError, DRIVER_LOG_FILE};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match PipelineConfig::load() {
        Ok(config) => config,
        Err(e) => return startup_failure(&e),
    };
    if let Err(e) = init_tracing("medallion-etl", &config.log_path(DRIVER_LOG_FILE)) {
        return startup_failure(&e);
    }

    let launcher = match ProcessLauncher::from_config(&config) {
        Ok(launcher) => launcher,
        Err(e) => {
            tracing::error!(error = %e, "cannot locate stage programs");
            return exit_code_for(&e);
        }
    };
    tracing::info!(run_id = %launcher.run_id(), "pipeline run id assigned");

    match run_pipeline(&launcher).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => exit_code_for(&e),
    }
}

fn startup_failure(err: &PipelineError) -> ExitCode {
    eprintln!("medallion-etl failed to start [{}]: {err}", err.error_code().code());
    exit_code_for(err)
}
