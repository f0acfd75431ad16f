use crate::{
    domain::{
        Board, BoardId, BoardSnapshot, Column, ColumnId, NewTask, Project, ProjectId, Task, TaskId,
    },
    error::Result,
    storage::{state::StoreState, ColumnPlacement, CounterTick, Storage},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::debug;

/// File-based storage: the whole store is one JSON document rewritten after
/// every mutation while the store lock is held.
pub struct FileStorage {
    root_path: PathBuf,
    state: Mutex<StoreState>,
}

impl FileStorage {
    const CADENCE_DIR: &'static str = ".cadence";
    const STORE_FILE: &'static str = "store.json";
    const TEMP_SUFFIX: &'static str = "tmp";

    /// Creates a new FileStorage instance for the given workspace root
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: workspace_root.as_ref().join(Self::CADENCE_DIR),
            state: Mutex::new(StoreState::default()),
        }
    }

    fn store_file(&self) -> PathBuf {
        self.root_path.join(Self::STORE_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn persist(&self, state: &StoreState) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(state)?;
        let target = self.store_file();
        let temp = target.with_extension(Self::TEMP_SUFFIX);

        fs::write(&temp, json).await?;
        fs::rename(&temp, &target).await?;
        Ok(())
    }

    /// Applies a change to a copy of the store, writes the copy, and swaps
    /// it in only once the write succeeded. The lock is held throughout.
    async fn mutate<T>(&self, change: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock().await;
        let mut draft = state.clone();
        let value = change(&mut draft)?;
        self.persist(&draft).await?;
        *state = draft;
        Ok(value)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let mut state = self.state.lock().await;
        let store_file = self.store_file();
        if store_file.exists() {
            let contents = fs::read_to_string(&store_file).await?;
            *state = serde_json::from_str(&contents)?;
            debug!(path = %store_file.display(), "loaded store");
        } else {
            self.persist(&state).await?;
            debug!(path = %store_file.display(), "created empty store");
        }

        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "# Local caches\n*.tmp\n").await?;
        }

        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.store_file().exists()
    }

    async fn create_project(&self, project: &Project) -> Result<()> {
        self.mutate(|state| state.insert_project(project)).await
    }

    async fn find_project_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        Ok(self.state.lock().await.project_by_slug(slug))
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        Ok(self.state.lock().await.project_by_name(name))
    }

    async fn increment_project_counter(&self, project_id: &ProjectId) -> Result<CounterTick> {
        self.mutate(|state| state.increment_counter(project_id)).await
    }

    async fn create_board(&self, board: &Board) -> Result<()> {
        self.mutate(|state| state.insert_board(board)).await
    }

    async fn first_board_of_project(&self, project_id: &ProjectId) -> Result<Option<Board>> {
        Ok(self.state.lock().await.first_board(project_id))
    }

    async fn load_board_snapshot(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        self.state.lock().await.snapshot(board_id)
    }

    async fn create_column(&self, column: &Column) -> Result<()> {
        self.mutate(|state| state.insert_column(column)).await
    }

    async fn find_column_by_id(&self, column_id: &ColumnId) -> Result<Option<Column>> {
        Ok(self.state.lock().await.column(column_id))
    }

    async fn find_column_with_project(
        &self,
        column_id: &ColumnId,
    ) -> Result<Option<ColumnPlacement>> {
        Ok(self.state.lock().await.column_placement(column_id))
    }

    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        Ok(self.state.lock().await.columns_of(board_id))
    }

    async fn count_tasks_in_column(&self, column_id: &ColumnId) -> Result<usize> {
        Ok(self.state.lock().await.count_in_column(column_id))
    }

    async fn task_positions_in_column(
        &self,
        column_id: &ColumnId,
        excluding: Option<&TaskId>,
    ) -> Result<Vec<i32>> {
        Ok(self
            .state
            .lock()
            .await
            .positions_in_column(column_id, excluding))
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        self.mutate(|state| state.insert_task(task)).await
    }

    async fn find_task_by_id(&self, task_id: &TaskId) -> Result<Option<Task>> {
        Ok(self.state.lock().await.task(task_id))
    }

    async fn update_task_column_and_position(
        &self,
        task_id: &TaskId,
        column_id: &ColumnId,
        position: i32,
    ) -> Result<Task> {
        self.mutate(|state| state.relocate_task(task_id, column_id, position))
            .await
    }

    async fn append_task(&self, task: NewTask) -> Result<Task> {
        self.mutate(|state| state.append_task(task)).await
    }

    async fn append_to_column(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task> {
        self.mutate(|state| state.append_to_column(task_id, column_id))
            .await
    }
}
