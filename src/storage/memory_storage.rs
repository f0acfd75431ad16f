use crate::{
    domain::{
        Board, BoardId, BoardSnapshot, Column, ColumnId, NewTask, Project, ProjectId, Task, TaskId,
    },
    error::Result,
    storage::{state::StoreState, ColumnPlacement, CounterTick, Storage},
};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Process-local storage, mostly for tests and embedding
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<StoreState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        true
    }

    async fn create_project(&self, project: &Project) -> Result<()> {
        self.state.lock().await.insert_project(project)
    }

    async fn find_project_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        Ok(self.state.lock().await.project_by_slug(slug))
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        Ok(self.state.lock().await.project_by_name(name))
    }

    async fn increment_project_counter(&self, project_id: &ProjectId) -> Result<CounterTick> {
        self.state.lock().await.increment_counter(project_id)
    }

    async fn create_board(&self, board: &Board) -> Result<()> {
        self.state.lock().await.insert_board(board)
    }

    async fn first_board_of_project(&self, project_id: &ProjectId) -> Result<Option<Board>> {
        Ok(self.state.lock().await.first_board(project_id))
    }

    async fn load_board_snapshot(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        self.state.lock().await.snapshot(board_id)
    }

    async fn create_column(&self, column: &Column) -> Result<()> {
        self.state.lock().await.insert_column(column)
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
        self.state.lock().await.insert_task(task)
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
        self.state
            .lock()
            .await
            .relocate_task(task_id, column_id, position)
    }

    async fn append_task(&self, task: NewTask) -> Result<Task> {
        self.state.lock().await.append_task(task)
    }

    async fn append_to_column(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task> {
        self.state.lock().await.append_to_column(task_id, column_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskCreate, TaskIdentifier};
    use crate::error::CadenceError;
    use std::sync::Arc;

    async fn seeded() -> (MemoryStorage, Project, Column) {
        let storage = MemoryStorage::new();
        let project = Project::new("Backend".to_string(), "BAC".to_string());
        storage.create_project(&project).await.unwrap();
        let board = Board::new(project.id, "Main".to_string());
        storage.create_board(&board).await.unwrap();
        let column = Column::new(board.id, "Todo".to_string(), 0);
        storage.create_column(&column).await.unwrap();
        (storage, project, column)
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected_case_insensitively() {
        let (storage, _, _) = seeded().await;
        let clash = Project::new("Other".to_string(), "bac".to_string());
        assert!(storage.create_project(&clash).await.is_err());
    }

    #[tokio::test]
    async fn test_column_placement_resolves_chain() {
        let (storage, project, column) = seeded().await;
        let placement = storage
            .find_column_with_project(&column.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(placement.project_id, project.id);
        assert_eq!(placement.column.id, column.id);

        let missing = storage
            .find_column_with_project(&ColumnId::new())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_counter_increments_are_distinct() {
        let (storage, project, _) = seeded().await;
        let storage = Arc::new(storage);

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let project_id = project.id;
                tokio::spawn(async move {
                    storage
                        .increment_project_counter(&project_id)
                        .await
                        .unwrap()
                        .task_number
                })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=64).collect::<Vec<u32>>());
    }

    fn new_task(column: &Column, number: u32) -> NewTask {
        NewTask::new(
            TaskCreate::new(column.id, format!("Task {}", number)),
            TaskIdentifier::compose("BAC", number),
            -1,
        )
    }

    #[tokio::test]
    async fn test_append_task_assigns_position_and_enforces_limit() {
        let (storage, project, _) = seeded().await;
        let board = storage.first_board_of_project(&project.id).await.unwrap().unwrap();
        let capped = Column::new(board.id, "Capped".to_string(), 1)
            .with_limit(Some(2))
            .unwrap();
        storage.create_column(&capped).await.unwrap();

        let first = storage.append_task(new_task(&capped, 1)).await.unwrap();
        let second = storage.append_task(new_task(&capped, 2)).await.unwrap();
        assert_eq!((first.position, second.position), (0, 1));

        let err = storage.append_task(new_task(&capped, 3)).await.unwrap_err();
        assert!(matches!(err, CadenceError::CapacityExceeded { .. }));
        assert_eq!(storage.count_tasks_in_column(&capped.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_append_to_column_checks_before_writing() {
        let (storage, project, todo) = seeded().await;
        let board = storage.first_board_of_project(&project.id).await.unwrap().unwrap();
        let capped = Column::new(board.id, "Capped".to_string(), 1)
            .with_limit(Some(1))
            .unwrap();
        storage.create_column(&capped).await.unwrap();
        let first = storage.append_task(new_task(&todo, 1)).await.unwrap();
        let second = storage.append_task(new_task(&todo, 2)).await.unwrap();

        let same = storage.append_to_column(&first.id, &todo.id).await.unwrap_err();
        assert!(matches!(same, CadenceError::SameColumn(_)));

        let moved = storage.append_to_column(&first.id, &capped.id).await.unwrap();
        assert_eq!((moved.column_id, moved.position), (capped.id, 0));

        let full = storage.append_to_column(&second.id, &capped.id).await.unwrap_err();
        assert!(matches!(full, CadenceError::CapacityExceeded { .. }));
        let unchanged = storage.find_task_by_id(&second.id).await.unwrap().unwrap();
        assert_eq!((unchanged.column_id, unchanged.position), (todo.id, 1));
    }

    #[tokio::test]
    async fn test_counter_for_unknown_project_fails() {
        let storage = MemoryStorage::new();
        assert!(storage
            .increment_project_counter(&ProjectId::new())
            .await
            .is_err());
    }
}
