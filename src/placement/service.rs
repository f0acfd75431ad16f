use crate::config::PlacementConfig;
use crate::domain::{ColumnId, NewTask, QuickTaskCreate, Task, TaskCreate, TaskId};
use crate::error::{CadenceError, Result};
use crate::placement::identifier::IdentifierAllocator;
use crate::storage::Storage;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Persists a task move; the seam the drop committer calls through
#[async_trait]
pub trait TaskMover: Send + Sync {
    async fn move_task(&self, task_id: &TaskId, target_column_id: &ColumnId) -> Result<Task>;
}

/// Creates and moves tasks while keeping identifiers and column limits intact.
///
/// Callers are expected to have authorized the acting user against the
/// project, board and column involved before reaching this service.
pub struct TaskPlacementService {
    storage: Arc<dyn Storage>,
    identifiers: IdentifierAllocator,
    config: PlacementConfig,
}

impl TaskPlacementService {
    pub fn new(storage: Arc<dyn Storage>, config: PlacementConfig) -> Self {
        let identifiers = IdentifierAllocator::new(Arc::clone(&storage));
        Self::with_allocator(storage, identifiers, config)
    }

    pub fn with_allocator(
        storage: Arc<dyn Storage>,
        identifiers: IdentifierAllocator,
        config: PlacementConfig,
    ) -> Self {
        Self {
            storage,
            identifiers,
            config,
        }
    }

    /// Creates a task at the end of its column.
    ///
    /// The task number is consumed before the capacity check. A rejected
    /// creation therefore leaves a permanent gap in the project's numbering;
    /// numbers are never reused.
    pub async fn create_task(&self, input: TaskCreate) -> Result<Task> {
        let column = self
            .storage
            .find_column_by_id(&input.column_id)
            .await?
            .ok_or_else(|| CadenceError::ColumnNotFound(input.column_id.to_string()))?;

        let placement = self
            .storage
            .find_column_with_project(&column.id)
            .await?
            .ok_or_else(|| CadenceError::ProjectNotFound(column.id.to_string()))?;

        let identifier = self
            .identifiers
            .allocate_task_identifier(&placement.project_id)
            .await?;
        let slug = identifier.slug.clone();

        // Storage counts, checks the limit and picks the position in one step
        let new_task = NewTask::new(input, identifier, 0);
        let task = match self.storage.append_task(new_task).await {
            Ok(task) => task,
            Err(CadenceError::CapacityExceeded { message }) => {
                warn!(
                    column = %column.id,
                    orphaned = %slug,
                    "task creation rejected: {}", message
                );
                return Err(CadenceError::CapacityExceeded { message });
            }
            Err(e) => return Err(e),
        };

        info!(
            task = %task.id,
            slug = %task.slug,
            column = %task.column_id,
            position = task.position,
            "task created"
        );
        Ok(task)
    }

    /// Creates a task in the first column of the default project's first board
    pub async fn quick_create_task(&self, input: QuickTaskCreate) -> Result<Task> {
        let name = &self.config.default_project_name;
        let project = self
            .storage
            .find_project_by_name(name)
            .await?
            .ok_or_else(|| CadenceError::DefaultProjectNotFound(name.clone()))?;

        let board = self
            .storage
            .first_board_of_project(&project.id)
            .await?
            .ok_or(CadenceError::DefaultBoardNotFound)?;

        let column = self
            .storage
            .list_columns(&board.id)
            .await?
            .into_iter()
            .next()
            .ok_or(CadenceError::DefaultColumnNotFound)?;

        self.create_task(input.into_task_create(column.id)).await
    }

    /// Moves a task to the end of another column.
    ///
    /// Slug and task number are left as they are.
    pub async fn move_task(&self, task_id: &TaskId, target_column_id: &ColumnId) -> Result<Task> {
        let task = self
            .storage
            .find_task_by_id(task_id)
            .await?
            .ok_or_else(|| CadenceError::TaskNotFound(task_id.to_string()))?;

        let moved = match self.storage.append_to_column(task_id, target_column_id).await {
            Ok(moved) => moved,
            Err(CadenceError::CapacityExceeded { message }) => {
                warn!(
                    task = %task.id,
                    column = %target_column_id,
                    "task move rejected: {}", message
                );
                return Err(CadenceError::CapacityExceeded { message });
            }
            Err(e) => return Err(e),
        };

        info!(
            task = %moved.id,
            slug = %moved.slug,
            from = %task.column_id,
            to = %moved.column_id,
            position = moved.position,
            "task moved"
        );
        Ok(moved)
    }
}

#[async_trait]
impl TaskMover for TaskPlacementService {
    async fn move_task(&self, task_id: &TaskId, target_column_id: &ColumnId) -> Result<Task> {
        TaskPlacementService::move_task(self, task_id, target_column_id).await
    }
}
