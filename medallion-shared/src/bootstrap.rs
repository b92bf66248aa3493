use std::process::ExitCode;

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, PipelineResult};
use crate::logging::init_tracing;
use crate::types::Stage;

/// Load configuration and start logging for a stage program.
pub fn start_stage(stage: Stage) -> PipelineResult<PipelineConfig> {
    let config = PipelineConfig::load()?;
    init_tracing(stage.binary_name(), &config.log_path(stage.log_file_name()))?;
    if let Some(run_id) = &config.run_id {
        tracing::info!(stage = %stage, run_id = %run_id, "stage started by pipeline driver");
    }
    Ok(config)
}

/// Report a failure that happened before logging was available.
pub fn startup_failure(stage: Stage, err: &PipelineError) -> ExitCode {
    eprintln!("{} failed to start [{}]: {err}", stage.binary_name(), err.error_code().code());
    exit_code_for(err)
}

/// Map a stage outcome onto the process exit status the driver inspects.
pub fn exit_status(stage: Stage, result: PipelineResult<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(stage = %stage, code = err.error_code().code(), error = %err, "stage failed");
            exit_code_for(&err)
        }
    }
}

pub fn exit_code_for(err: &PipelineError) -> ExitCode {
    ExitCode::from(err.exit_code().clamp(1, 255) as u8)
}
