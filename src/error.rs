use thiserror::Error;

pub type Result<T> = std::result::Result<T, CadenceError>;

/// Coarse classification used by the API layer to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Storage,
}

#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("Column with id {0} not found")]
    ColumnNotFound(String),

    #[error("Board with id {0} not found")]
    BoardNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Task with id {0} not found")]
    TaskNotFound(String),

    #[error("Default project '{0}' not found")]
    DefaultProjectNotFound(String),

    #[error("Default project has no board")]
    DefaultBoardNotFound,

    #[error("Default board has no column")]
    DefaultColumnNotFound,

    #[error("Project name must contain at least one letter")]
    InvalidProjectName,

    #[error("{message}")]
    CapacityExceeded { message: String },

    #[error("Task is already in column {0}")]
    SameColumn(String),

    #[error("Invalid WIP limit {0}: must be a positive integer")]
    InvalidWipLimit(i64),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "sqlite-storage")]
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CadenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ColumnNotFound(_)
            | Self::BoardNotFound(_)
            | Self::ProjectNotFound(_)
            | Self::TaskNotFound(_)
            | Self::DefaultProjectNotFound(_)
            | Self::DefaultBoardNotFound
            | Self::DefaultColumnNotFound => ErrorKind::NotFound,
            Self::InvalidProjectName
            | Self::CapacityExceeded { .. }
            | Self::SameColumn(_)
            | Self::InvalidWipLimit(_)
            | Self::ConfigError(_) => ErrorKind::Validation,
            Self::StorageError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorKind::Storage
            }
            #[cfg(feature = "sqlite-storage")]
            Self::SqliteError(_) => ErrorKind::Storage,
        }
    }
}
