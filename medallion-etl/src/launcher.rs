use std::future::Future;
use std::path::PathBuf;

use tokio::process::Command;

use medallion_shared::{ErrorCode, PipelineConfig, PipelineError, PipelineResult, Stage};

/// Exit status of a finished stage program. `None` means it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageExit {
    pub code: Option<i32>,
}

impl StageExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs one stage to completion.
pub trait StageLauncher {
    fn launch(&self, stage: Stage) -> impl Future<Output = PipelineResult<StageExit>>;
}

/// Spawns `<bin_dir>/medallion-<stage>` as a child process in the project root.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    bin_dir: PathBuf,
    project_root: PathBuf,
    run_id: String,
}

impl ProcessLauncher {
    pub fn new(bin_dir: PathBuf, project_root: PathBuf, run_id: String) -> Self {
        Self {
            bin_dir,
            project_root,
            run_id,
        }
    }

    /// Stage binaries default to the directory holding the running driver.
    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let bin_dir = match &config.bin_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_exe()?
                .parent()
                .map(PathBuf::from)
                .ok_or_else(|| PipelineError::internal("driver executable has no parent directory"))?,
        };
        let project_root = std::fs::canonicalize(&config.project_root)?;
        let run_id = config
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
        Ok(Self::new(bin_dir, project_root, run_id))
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn program(&self, stage: Stage) -> PathBuf {
        self.bin_dir.join(stage.binary_name())
    }
}

impl StageLauncher for ProcessLauncher {
    async fn launch(&self, stage: Stage) -> PipelineResult<StageExit> {
        let program = self.program(stage);
        let status = Command::new(&program)
            .current_dir(&self.project_root)
            .env("MEDALLION_PROJECT_ROOT", &self.project_root)
            .env("MEDALLION_RUN_ID", &self.run_id)
            .status()
            .await
            .map_err(|e| {
                PipelineError::new(
                    ErrorCode::StageLaunchFailed,
                    format!("failed to start {}: {e}", program.display()),
                )
            })?;
        Ok(StageExit { code: status.code() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_programs_live_in_bin_dir() {
        let launcher = ProcessLauncher::new("/opt/etl/bin".into(), "/srv/etl".into(), "run-1".into());
        assert_eq!(launcher.program(Stage::Silver), PathBuf::from("/opt/etl/bin/medallion-silver"));
        assert_eq!(launcher.run_id(), "run-1");
    }

    #[test]
    fn exit_code_zero_is_success() {
        assert!(StageExit { code: Some(0) }.success());
        assert!(!StageExit { code: Some(1) }.success());
        assert!(!StageExit { code: None }.success());
    }

    #[tokio::test]
    async fn missing_binary_is_a_launch_failure() {
        let dir = std::env::temp_dir();
        let launcher = ProcessLauncher::new(dir.join("medallion-no-such-dir"), dir, "run-2".into());
        let err = launcher.launch(Stage::Bronze).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::StageLaunchFailed);
    }
}
