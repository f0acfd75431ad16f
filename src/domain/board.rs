use crate::domain::project::ProjectId;
use crate::error::{CadenceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::uuid_id;

uuid_id!(
    /// Unique identifier for a board
    BoardId
);

uuid_id!(
    /// Unique identifier for a board column
    ColumnId
);

/// A kanban board, owned exclusively by one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub project_id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(project_id: ProjectId, name: String) -> Self {
        Self {
            id: BoardId::new(),
            project_id,
            name,
            created_at: Utc::now(),
        }
    }
}

/// A column on a board, optionally capped by a WIP limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub name: String,
    pub position: i32,
    /// Maximum number of tasks; `None` means unlimited
    pub limit: Option<u32>,
}

impl Column {
    pub fn new(board_id: BoardId, name: String, position: i32) -> Self {
        Self {
            id: ColumnId::new(),
            board_id,
            name,
            position,
            limit: None,
        }
    }

    /// Sets the WIP limit; zero and negative limits are rejected
    pub fn with_limit(mut self, limit: Option<i64>) -> Result<Self> {
        self.limit = validate_limit(limit)?;
        Ok(self)
    }
}

/// Checks a caller-supplied WIP limit
pub fn validate_limit(limit: Option<i64>) -> Result<Option<u32>> {
    match limit {
        None => Ok(None),
        Some(value) if value > 0 => u32::try_from(value)
            .map(Some)
            .map_err(|_| CadenceError::InvalidWipLimit(value)),
        Some(value) => Err(CadenceError::InvalidWipLimit(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_without_limit() {
        let column = Column::new(BoardId::new(), "Todo".to_string(), 0);
        assert!(column.limit.is_none());
    }

    #[test]
    fn test_column_limit_validation() {
        let board_id = BoardId::new();

        let column = Column::new(board_id, "Doing".to_string(), 1)
            .with_limit(Some(3))
            .unwrap();
        assert_eq!(column.limit, Some(3));

        assert!(Column::new(board_id, "Doing".to_string(), 1)
            .with_limit(Some(0))
            .is_err());
        assert!(Column::new(board_id, "Doing".to_string(), 1)
            .with_limit(Some(-2))
            .is_err());
    }

    #[test]
    fn test_id_round_trips_through_display() {
        let id = ColumnId::new();
        let parsed: ColumnId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
