use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Stage;

/// Pipeline error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Database and SQL script errors
/// - E2xxx: Spreadsheet source errors
/// - E3xxx: Stage orchestration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ConfigError,
    IoError,

    // Database (E1xxx)
    DatabaseError,
    PoolError,
    ScriptFailed,

    // Spreadsheet (E2xxx)
    SourceAuthFailed,
    SpreadsheetNotFound,
    WorksheetNotFound,
    SourceApiError,

    // Orchestration (E3xxx)
    StageFailed,
    StageLaunchFailed,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InternalError => "E0001",
            Self::ConfigError => "E0002",
            Self::IoError => "E0003",

            Self::DatabaseError => "E1001",
            Self::PoolError => "E1002",
            Self::ScriptFailed => "E1003",

            Self::SourceAuthFailed => "E2001",
            Self::SpreadsheetNotFound => "E2002",
            Self::WorksheetNotFound => "E2003",
            Self::SourceApiError => "E2004",

            Self::StageFailed => "E3001",
            Self::StageLaunchFailed => "E3002",
        }
    }

    /// Process exit status a stage program reports for this class of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InternalError | Self::IoError => 1,
            Self::ConfigError => 2,
            Self::DatabaseError | Self::PoolError | Self::ScriptFailed => 3,
            Self::SourceAuthFailed
            | Self::SpreadsheetNotFound
            | Self::WorksheetNotFound
            | Self::SourceApiError => 4,
            Self::StageFailed | Self::StageLaunchFailed => 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{message}")]
    Known { code: ErrorCode, message: String },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("sql script {} failed: {source}", path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("spreadsheet authentication failed: {0}")]
    SourceAuth(String),

    #[error("spreadsheet '{0}' not found")]
    SpreadsheetNotFound(String),

    #[error("worksheet '{0}' not found")]
    WorksheetNotFound(String),

    #[error("spreadsheet api error: {0}")]
    SourceApi(String),

    #[error("stage {stage} exited with status {status:?}")]
    StageFailed { stage: Stage, status: Option<i32> },
}

impl PipelineError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn script(path: impl Into<PathBuf>, source: PipelineError) -> Self {
        Self::Script {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Known { code, .. } => *code,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Pool(_) => ErrorCode::PoolError,
            Self::Script { .. } => ErrorCode::ScriptFailed,
            Self::SourceAuth(_) => ErrorCode::SourceAuthFailed,
            Self::SpreadsheetNotFound(_) => ErrorCode::SpreadsheetNotFound,
            Self::WorksheetNotFound(_) => ErrorCode::WorksheetNotFound,
            Self::SourceApi(_) => ErrorCode::SourceApiError,
            Self::StageFailed { .. } => ErrorCode::StageFailed,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.error_code().exit_code()
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        Self::SourceApi(err.to_string())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
