use crate::domain::{
    append_position, validate_limit, Board, BoardId, Column, Project, ProjectCreate, ProjectId,
    ProjectStatus,
};
use crate::error::{CadenceError, Result};
use crate::placement::identifier::IdentifierAllocator;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::info;

/// Sets up projects and the boards and columns tasks live in
pub struct ProjectService {
    storage: Arc<dyn Storage>,
    identifiers: IdentifierAllocator,
}

impl ProjectService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let identifiers = IdentifierAllocator::new(Arc::clone(&storage));
        Self::with_allocator(storage, identifiers)
    }

    pub fn with_allocator(storage: Arc<dyn Storage>, identifiers: IdentifierAllocator) -> Self {
        Self {
            storage,
            identifiers,
        }
    }

    pub async fn create_project(&self, input: ProjectCreate) -> Result<Project> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CadenceError::InvalidProjectName);
        }

        let slug = self.identifiers.allocate_project_slug(name).await?;
        let mut project = Project::new(name.to_string(), slug);
        project.description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        project.color = input
            .color
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        project.status = ProjectStatus::normalize(input.status.as_deref()).unwrap_or_default();

        self.storage.create_project(&project).await?;
        info!(project = %project.id, slug = %project.slug, "project created");
        Ok(project)
    }

    pub async fn create_board(&self, project_id: &ProjectId, name: &str) -> Result<Board> {
        let board = Board::new(*project_id, name.trim().to_string());
        self.storage.create_board(&board).await?;
        info!(board = %board.id, project = %project_id, "board created");
        Ok(board)
    }

    /// Appends a column to the board
    pub async fn create_column(
        &self,
        board_id: &BoardId,
        name: &str,
        limit: Option<i64>,
    ) -> Result<Column> {
        let limit = validate_limit(limit)?;
        let existing = self.storage.list_columns(board_id).await?;
        let position = append_position(existing.iter().map(|c| c.position));

        let mut column = Column::new(*board_id, name.trim().to_string(), position);
        column.limit = limit;
        self.storage.create_column(&column).await?;
        info!(column = %column.id, board = %board_id, position, ?limit, "column created");
        Ok(column)
    }
}
