use crate::{
    domain::{
        Board, BoardId, BoardSnapshot, Column, ColumnId, NewTask, Project, ProjectId, Task, TaskId,
    },
    error::Result,
};
use async_trait::async_trait;

pub mod file_storage;
pub mod memory_storage;
mod state;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Result of an atomic counter increment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterTick {
    pub project_slug: String,
    pub task_number: u32,
}

/// A column together with the board and project that own it
#[derive(Debug, Clone)]
pub struct ColumnPlacement {
    pub column: Column,
    pub board_id: BoardId,
    pub project_id: ProjectId,
}

/// Storage trait for persisting projects, boards, columns and tasks
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Checks if the backend is ready for use
    async fn is_initialized(&self) -> bool;

    /// Saves a new project
    async fn create_project(&self, project: &Project) -> Result<()>;

    /// Looks up a project by slug, ignoring case
    async fn find_project_by_slug(&self, slug: &str) -> Result<Option<Project>>;

    /// Looks up a project by exact name
    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>>;

    /// Increments the project's task counter and returns the new value.
    ///
    /// Must be a single atomic read-modify-write: concurrent callers never
    /// observe the same number.
    async fn increment_project_counter(&self, project_id: &ProjectId) -> Result<CounterTick>;

    /// Saves a new board
    async fn create_board(&self, board: &Board) -> Result<()>;

    /// Returns the project's first board in creation order
    async fn first_board_of_project(&self, project_id: &ProjectId) -> Result<Option<Board>>;

    /// Loads a board with all its columns and tasks
    async fn load_board_snapshot(&self, board_id: &BoardId) -> Result<BoardSnapshot>;

    /// Saves a new column
    async fn create_column(&self, column: &Column) -> Result<()>;

    async fn find_column_by_id(&self, column_id: &ColumnId) -> Result<Option<Column>>;

    /// Resolves column -> board -> project; `None` if any link is missing
    async fn find_column_with_project(&self, column_id: &ColumnId)
        -> Result<Option<ColumnPlacement>>;

    /// Lists a board's columns ordered by position
    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>>;

    async fn count_tasks_in_column(&self, column_id: &ColumnId) -> Result<usize>;

    /// Positions of the column's tasks, optionally leaving one task out
    async fn task_positions_in_column(
        &self,
        column_id: &ColumnId,
        excluding: Option<&TaskId>,
    ) -> Result<Vec<i32>>;

    /// Persists a fully resolved task
    async fn create_task(&self, task: NewTask) -> Result<Task>;

    /// Appends a task to the end of its column as one atomic step.
    ///
    /// The count, the WIP-limit check, the append position and the insert
    /// happen under one lock or transaction; `task.position` is overwritten.
    /// Fails with `CapacityExceeded` when the column is full.
    async fn append_task(&self, task: NewTask) -> Result<Task>;

    async fn find_task_by_id(&self, task_id: &TaskId) -> Result<Option<Task>>;

    /// Moves a task to a column at the given rank
    async fn update_task_column_and_position(
        &self,
        task_id: &TaskId,
        column_id: &ColumnId,
        position: i32,
    ) -> Result<Task>;

    /// Moves a task to the end of another column as one atomic step.
    ///
    /// The destination is counted without the task itself. Fails with
    /// `SameColumn` or `CapacityExceeded` before anything is written.
    async fn append_to_column(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task>;
}
