//! Pipeline driver: run bronze, silver, and gold as separate programs, in order.

pub mod launcher;

use std::time::{Duration, Instant};

use medallion_shared::{PipelineError, PipelineResult, Stage};

pub use launcher::{ProcessLauncher, StageExit, StageLauncher};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub completed: Vec<Stage>,
    pub elapsed: Duration,
}

/// Launch each stage in turn and stop at the first one that fails.
///
/// No retries and no rollback: stages that already succeeded keep their
/// effects when a later stage fails.
pub async fn run_pipeline<L: StageLauncher>(launcher: &L) -> PipelineResult<PipelineReport> {
    tracing::info!("starting ETL pipeline");
    let started = Instant::now();
    let mut completed = Vec::with_capacity(Stage::ORDERED.len());

    for stage in Stage::ORDERED {
        tracing::info!(stage = %stage, "executing stage");
        let exit = launcher.launch(stage).await.inspect_err(|e| {
            tracing::error!(stage = %stage, error = %e, "could not launch stage");
        })?;

        if !exit.success() {
            tracing::error!(stage = %stage, status = ?exit.code, "ETL pipeline failed, exiting");
            return Err(PipelineError::StageFailed {
                stage,
                status: exit.code,
            });
        }

        tracing::info!(stage = %stage, "stage completed successfully");
        completed.push(stage);
    }

    let elapsed = started.elapsed();
    tracing::info!(elapsed_secs = elapsed.as_secs_f64(), "ETL pipeline completed successfully");
    Ok(PipelineReport { completed, elapsed })
}
