use crate::domain::{BoardSnapshot, ColumnId, Task, TaskId};
use crate::error::Result;
use crate::placement::TaskMover;
use std::sync::Arc;
use tracing::info;

/// A drop that passed validation; only [`DropValidator`] can produce one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedDrop {
    task_id: TaskId,
    target_column_id: ColumnId,
}

impl ValidatedDrop {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn target_column_id(&self) -> ColumnId {
        self.target_column_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropDecision {
    Accept(ValidatedDrop),
    Reject { reason: String },
}

impl DropDecision {
    pub fn is_valid(&self) -> bool {
        matches!(self, DropDecision::Accept(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            DropDecision::Accept(_) => None,
            DropDecision::Reject { reason } => Some(reason),
        }
    }

    fn reject(reason: impl Into<String>) -> Self {
        DropDecision::Reject {
            reason: reason.into(),
        }
    }
}

pub struct DropValidator;

impl DropValidator {
    /// Decides whether `task_id` may be dropped onto `target_column_id`.
    ///
    /// Counts come from the board the user is looking at, not a fresh
    /// read; the move itself re-checks capacity against storage.
    pub fn validate(
        board: &BoardSnapshot,
        task_id: &TaskId,
        target_column_id: &ColumnId,
    ) -> DropDecision {
        let (Some(column), Some(task)) = (board.column(target_column_id), board.task(task_id))
        else {
            return DropDecision::reject("Column or task not found");
        };

        if task.column_id == column.id {
            return DropDecision::reject("Task is already in this column");
        }

        if let Some(limit) = column.limit {
            if board.task_count(&column.id) >= limit as usize {
                return DropDecision::reject(format!(
                    "Column '{}' is at WIP limit ({})",
                    column.name, limit
                ));
            }
        }

        DropDecision::Accept(ValidatedDrop {
            task_id: task.id,
            target_column_id: column.id,
        })
    }
}

/// Persists validated drops
#[derive(Clone)]
pub struct MoveCommitter {
    mover: Arc<dyn TaskMover>,
}

impl MoveCommitter {
    pub fn new(mover: Arc<dyn TaskMover>) -> Self {
        Self { mover }
    }

    pub async fn commit(&self, drop: ValidatedDrop) -> Result<Task> {
        let task = self
            .mover
            .move_task(&drop.task_id, &drop.target_column_id)
            .await?;
        info!(task = %task.id, column = %task.column_id, "drop committed");
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, Column, NewTask, ProjectId, TaskCreate, TaskIdentifier};

    fn task_in(column: &Column, number: u32) -> Task {
        let identifier = TaskIdentifier::compose("ABC", number);
        Task::from_new(NewTask::new(
            TaskCreate::new(column.id, format!("Task {}", number)),
            identifier,
            number as i32,
        ))
    }

    fn board(limit: Option<i64>) -> (BoardSnapshot, Column, Column, TaskId) {
        let board = Board::new(ProjectId::new(), "Main".to_string());
        let todo = Column::new(board.id, "Todo".to_string(), 0);
        let review = Column::new(board.id, "Review".to_string(), 1)
            .with_limit(limit)
            .unwrap();
        let mover = task_in(&todo, 1);
        let mover_id = mover.id;
        let tasks = vec![mover, task_in(&review, 2), task_in(&review, 3)];
        let snapshot = BoardSnapshot::new(board, vec![todo.clone(), review.clone()], tasks);
        (snapshot, todo, review, mover_id)
    }

    #[test]
    fn test_accepts_drop_onto_other_column_with_room() {
        let (snapshot, _, review, task_id) = board(Some(3));
        let decision = DropValidator::validate(&snapshot, &task_id, &review.id);
        assert!(decision.is_valid());
        assert_eq!(decision.reason(), None);
    }

    #[test]
    fn test_rejects_drop_onto_current_column() {
        let (snapshot, todo, _, task_id) = board(None);
        let decision = DropValidator::validate(&snapshot, &task_id, &todo.id);
        assert_eq!(decision.reason(), Some("Task is already in this column"));
    }

    #[test]
    fn test_rejects_drop_onto_full_column() {
        let (snapshot, _, review, task_id) = board(Some(2));
        let decision = DropValidator::validate(&snapshot, &task_id, &review.id);
        assert!(!decision.is_valid());
        assert_eq!(
            decision.reason(),
            Some("Column 'Review' is at WIP limit (2)")
        );
    }

    #[test]
    fn test_rejects_unknown_ids() {
        let (snapshot, todo, _, task_id) = board(None);
        let unknown_column = DropValidator::validate(&snapshot, &task_id, &ColumnId::new());
        let unknown_task = DropValidator::validate(&snapshot, &TaskId::new(), &todo.id);
        assert_eq!(unknown_column.reason(), Some("Column or task not found"));
        assert_eq!(unknown_task.reason(), Some("Column or task not found"));
    }
}
