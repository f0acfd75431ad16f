//! Plain in-memory tables shared by the memory and file backends.
//!
//! Callers hold the surrounding lock for the whole of each method, which is
//! what makes the counter increment and the checked appends atomic.

use crate::domain::{
    append_position, sort_columns, Board, BoardId, BoardSnapshot, CapacityGuard, Column, ColumnId,
    NewTask, Project, ProjectId, Task, TaskId,
};
use crate::error::{CadenceError, Result};
use crate::storage::{ColumnPlacement, CounterTick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    projects: Vec<Project>,
    boards: Vec<Board>,
    columns: Vec<Column>,
    tasks: Vec<Task>,
}

impl StoreState {
    pub fn insert_project(&mut self, project: &Project) -> Result<()> {
        if self.projects.iter().any(|p| p.has_slug(&project.slug)) {
            return Err(CadenceError::StorageError(format!(
                "project slug {} already exists",
                project.slug
            )));
        }
        self.projects.push(project.clone());
        Ok(())
    }

    pub fn project_by_slug(&self, slug: &str) -> Option<Project> {
        self.projects.iter().find(|p| p.has_slug(slug)).cloned()
    }

    pub fn project_by_name(&self, name: &str) -> Option<Project> {
        self.projects.iter().find(|p| p.name == name).cloned()
    }

    pub fn increment_counter(&mut self, project_id: &ProjectId) -> Result<CounterTick> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| &p.id == project_id)
            .ok_or_else(|| CadenceError::ProjectNotFound(project_id.to_string()))?;
        let task_number = project.next_task_number();
        Ok(CounterTick {
            project_slug: project.slug.clone(),
            task_number,
        })
    }

    pub fn insert_board(&mut self, board: &Board) -> Result<()> {
        if !self.projects.iter().any(|p| p.id == board.project_id) {
            return Err(CadenceError::ProjectNotFound(board.project_id.to_string()));
        }
        self.boards.push(board.clone());
        Ok(())
    }

    pub fn first_board(&self, project_id: &ProjectId) -> Option<Board> {
        self.boards
            .iter()
            .filter(|b| &b.project_id == project_id)
            .min_by_key(|b| b.created_at)
            .cloned()
    }

    pub fn snapshot(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        let board = self
            .boards
            .iter()
            .find(|b| &b.id == board_id)
            .cloned()
            .ok_or_else(|| CadenceError::BoardNotFound(board_id.to_string()))?;
        let columns = self.columns_of(board_id);
        let tasks = self
            .tasks
            .iter()
            .filter(|t| columns.iter().any(|c| c.id == t.column_id))
            .cloned()
            .collect();
        Ok(BoardSnapshot::new(board, columns, tasks))
    }

    pub fn insert_column(&mut self, column: &Column) -> Result<()> {
        if !self.boards.iter().any(|b| b.id == column.board_id) {
            return Err(CadenceError::BoardNotFound(column.board_id.to_string()));
        }
        self.columns.push(column.clone());
        Ok(())
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<Column> {
        self.columns.iter().find(|c| &c.id == column_id).cloned()
    }

    pub fn column_placement(&self, column_id: &ColumnId) -> Option<ColumnPlacement> {
        let column = self.column(column_id)?;
        let board = self.boards.iter().find(|b| b.id == column.board_id)?;
        let project = self.projects.iter().find(|p| p.id == board.project_id)?;
        Some(ColumnPlacement {
            board_id: board.id,
            project_id: project.id,
            column,
        })
    }

    pub fn columns_of(&self, board_id: &BoardId) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|c| &c.board_id == board_id)
            .cloned()
            .collect();
        sort_columns(&mut columns);
        columns
    }

    pub fn count_in_column(&self, column_id: &ColumnId) -> usize {
        self.tasks.iter().filter(|t| &t.column_id == column_id).count()
    }

    pub fn positions_in_column(
        &self,
        column_id: &ColumnId,
        excluding: Option<&TaskId>,
    ) -> Vec<i32> {
        self.tasks
            .iter()
            .filter(|t| &t.column_id == column_id && Some(&t.id) != excluding)
            .map(|t| t.position)
            .collect()
    }

    pub fn insert_task(&mut self, new_task: NewTask) -> Result<Task> {
        if self.column(&new_task.column_id).is_none() {
            return Err(CadenceError::ColumnNotFound(new_task.column_id.to_string()));
        }
        if self.tasks.iter().any(|t| t.slug == new_task.identifier.slug) {
            return Err(CadenceError::StorageError(format!(
                "task slug {} already exists",
                new_task.identifier.slug
            )));
        }
        let task = Task::from_new(new_task);
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Inserts at the end of the column if its limit leaves room
    pub fn append_task(&mut self, mut new_task: NewTask) -> Result<Task> {
        let column = self
            .column(&new_task.column_id)
            .ok_or_else(|| CadenceError::ColumnNotFound(new_task.column_id.to_string()))?;
        let positions = self.positions_in_column(&column.id, None);
        CapacityGuard::ensure_room(&column, positions.len())?;
        new_task.position = append_position(positions);
        self.insert_task(new_task)
    }

    /// Moves to the end of another column if its limit leaves room
    pub fn append_to_column(&mut self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task> {
        let task = self
            .task(task_id)
            .ok_or_else(|| CadenceError::TaskNotFound(task_id.to_string()))?;
        let column = self
            .column(column_id)
            .ok_or_else(|| CadenceError::ColumnNotFound(column_id.to_string()))?;
        if task.column_id == column.id {
            return Err(CadenceError::SameColumn(column.id.to_string()));
        }
        let positions = self.positions_in_column(&column.id, Some(task_id));
        CapacityGuard::ensure_room(&column, positions.len())?;
        self.relocate_task(task_id, &column.id, append_position(positions))
    }

    pub fn task(&self, task_id: &TaskId) -> Option<Task> {
        self.tasks.iter().find(|t| &t.id == task_id).cloned()
    }

    pub fn relocate_task(
        &mut self,
        task_id: &TaskId,
        column_id: &ColumnId,
        position: i32,
    ) -> Result<Task> {
        if self.column(column_id).is_none() {
            return Err(CadenceError::ColumnNotFound(column_id.to_string()));
        }
        let task = self
            .tasks
            .iter_mut()
            .find(|t| &t.id == task_id)
            .ok_or_else(|| CadenceError::TaskNotFound(task_id.to_string()))?;
        task.relocate(*column_id, position);
        Ok(task.clone())
    }
}
