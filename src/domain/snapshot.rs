use crate::domain::board::{Board, Column, ColumnId};
use crate::domain::ordering::{append_position, compare_tasks, sort_columns};
use crate::domain::task::{Task, TaskId};
use serde::{Deserialize, Serialize};

/// A board with its columns and tasks, as loaded by a board view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Board,
    /// Ordered by position, ties broken by id
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}

/// Record of an optimistic local move, kept so it can be rolled back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMove {
    pub task_id: TaskId,
    pub from_column: ColumnId,
    pub from_position: i32,
    pub to_column: ColumnId,
}

impl BoardSnapshot {
    pub fn new(board: Board, mut columns: Vec<Column>, tasks: Vec<Task>) -> Self {
        sort_columns(&mut columns);
        Self {
            board,
            columns,
            tasks,
        }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Tasks of one column in rank order
    pub fn tasks_in_column(&self, id: &ColumnId) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| &t.column_id == id).collect();
        tasks.sort_by(|a, b| compare_tasks(a, b));
        tasks
    }

    pub fn task_count(&self, id: &ColumnId) -> usize {
        self.tasks.iter().filter(|t| &t.column_id == id).count()
    }

    /// Moves a task locally ahead of the server round trip.
    ///
    /// Returns `None` when the task or column is unknown, or when the task is
    /// already in the target column.
    pub fn apply_local_move(&mut self, task_id: &TaskId, to_column: ColumnId) -> Option<LocalMove> {
        self.column(&to_column)?;
        let position = append_position(
            self.tasks
                .iter()
                .filter(|t| t.column_id == to_column)
                .map(|t| t.position),
        );
        let task = self.tasks.iter_mut().find(|t| &t.id == task_id)?;
        if task.column_id == to_column {
            return None;
        }

        let local = LocalMove {
            task_id: task.id,
            from_column: task.column_id,
            from_position: task.position,
            to_column,
        };
        task.column_id = to_column;
        task.position = position;
        Some(local)
    }

    /// Undoes an optimistic move
    pub fn revert_local_move(&mut self, local: &LocalMove) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == local.task_id) {
            task.column_id = local.from_column;
            task.position = local.from_position;
        }
    }

    /// Replaces a task with the server's copy
    pub fn upsert_task(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }
}
