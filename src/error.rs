use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("version control error: {0}")]
    VersionControl(String),
    #[error("work item tracking error: {0}")]
    WorkItemTracking(String),
    #[error("export error: {0}")]
    Export(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
