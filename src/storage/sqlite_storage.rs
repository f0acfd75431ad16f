use crate::{
    domain::{
        append_position, Board, BoardId, BoardSnapshot, CapacityGuard, Column, ColumnId, NewTask,
        Project, ProjectId, Task, TaskId,
    },
    error::{CadenceError, Result},
    storage::{ColumnPlacement, CounterTick, Storage},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row, TransactionBehavior};
use std::str::FromStr;
use tokio::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE COLLATE NOCASE,
    description TEXT,
    color TEXT,
    status TEXT NOT NULL,
    task_counter INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS boards (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS columns (
    id TEXT PRIMARY KEY,
    board_id TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    position INTEGER NOT NULL,
    wip_limit INTEGER CHECK (wip_limit IS NULL OR wip_limit > 0)
);
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    column_id TEXT NOT NULL REFERENCES columns(id) ON DELETE CASCADE,
    slug TEXT NOT NULL UNIQUE,
    task_number INTEGER NOT NULL,
    position INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    parent_id TEXT,
    task_type TEXT NOT NULL,
    priority TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_column ON tasks(column_id);
";

const PROJECT_COLUMNS: &str =
    "id, name, slug, description, color, status, task_counter, created_at, updated_at";
const TASK_COLUMNS: &str = "id, column_id, slug, task_number, position, title, description, \
     parent_id, task_type, priority, created_at, updated_at";

/// SQLite-backed storage
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at the given path
    pub fn new(database_path: &str) -> Result<Self> {
        let connection = Connection::open(database_path)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Opens a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            connection: Mutex::new(Connection::open_in_memory()?),
        })
    }
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.to_string().into())
    })
}

fn parse_optional<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| {
        value.parse::<T>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.to_string().into())
        })
    })
    .transpose()
}

fn parse_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    parse_column::<DateTime<Utc>>(row, idx)
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: parse_column(row, 0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        color: row.get(4)?,
        status: parse_column(row, 5)?,
        task_counter: row.get(6)?,
        created_at: parse_time(row, 7)?,
        updated_at: parse_time(row, 8)?,
    })
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: parse_column(row, 0)?,
        project_id: parse_column(row, 1)?,
        name: row.get(2)?,
        created_at: parse_time(row, 3)?,
    })
}

fn column_from_row(row: &Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: parse_column(row, 0)?,
        board_id: parse_column(row, 1)?,
        name: row.get(2)?,
        position: row.get(3)?,
        limit: row.get(4)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_column(row, 0)?,
        column_id: parse_column(row, 1)?,
        slug: row.get(2)?,
        task_number: row.get(3)?,
        position: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        parent_id: parse_optional(row, 7)?,
        task_type: parse_column(row, 8)?,
        priority: parse_optional(row, 9)?,
        created_at: parse_time(row, 10)?,
        updated_at: parse_time(row, 11)?,
    })
}

fn select_task(conn: &Connection, task_id: &TaskId) -> Result<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
    Ok(conn
        .query_row(&sql, params![task_id.to_string()], task_from_row)
        .optional()?)
}

fn select_column(conn: &Connection, column_id: &ColumnId) -> Result<Option<Column>> {
    Ok(conn
        .query_row(
            "SELECT id, board_id, name, position, wip_limit FROM columns WHERE id = ?1",
            params![column_id.to_string()],
            column_from_row,
        )
        .optional()?)
}

fn select_positions(
    conn: &Connection,
    column_id: &ColumnId,
    excluding: Option<&TaskId>,
) -> Result<Vec<i32>> {
    let mut stmt = conn
        .prepare("SELECT position FROM tasks WHERE column_id = ?1 AND (?2 IS NULL OR id != ?2)")?;
    let positions = stmt
        .query_map(
            params![column_id.to_string(), excluding.map(|id| id.to_string())],
            |row| row.get(0),
        )?
        .collect::<rusqlite::Result<Vec<i32>>>()?;
    Ok(positions)
}

fn insert_task(conn: &Connection, task: NewTask) -> Result<Task> {
    let task = Task::from_new(task);
    conn.execute(
        &format!(
            "INSERT INTO tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            TASK_COLUMNS
        ),
        params![
            task.id.to_string(),
            task.column_id.to_string(),
            task.slug,
            task.task_number,
            task.position,
            task.title,
            task.description,
            task.parent_id.map(|id| id.to_string()),
            task.task_type.to_string(),
            task.priority.map(|p| p.to_string()),
            task.created_at.to_rfc3339(),
            task.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(task)
}

fn relocate_task(
    conn: &Connection,
    task_id: &TaskId,
    column_id: &ColumnId,
    position: i32,
) -> Result<Task> {
    let updated = conn.execute(
        "UPDATE tasks SET column_id = ?2, position = ?3, updated_at = ?4 WHERE id = ?1",
        params![
            task_id.to_string(),
            column_id.to_string(),
            position,
            Utc::now().to_rfc3339(),
        ],
    )?;
    if updated == 0 {
        return Err(CadenceError::TaskNotFound(task_id.to_string()));
    }
    select_task(conn, task_id)?.ok_or_else(|| CadenceError::TaskNotFound(task_id.to_string()))
}

fn select_columns(conn: &Connection, board_id: &BoardId) -> Result<Vec<Column>> {
    let mut stmt = conn.prepare(
        "SELECT id, board_id, name, position, wip_limit FROM columns
         WHERE board_id = ?1 ORDER BY position, id",
    )?;
    let columns = stmt
        .query_map(params![board_id.to_string()], column_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        let conn = self.connection.lock().await;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        let conn = self.connection.lock().await;
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'tasks'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count > 0)
        .unwrap_or(false)
    }

    async fn create_project(&self, project: &Project) -> Result<()> {
        let conn = self.connection.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO projects ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                PROJECT_COLUMNS
            ),
            params![
                project.id.to_string(),
                project.name,
                project.slug,
                project.description,
                project.color,
                project.status.to_string(),
                project.task_counter,
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn find_project_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        let conn = self.connection.lock().await;
        let sql = format!(
            "SELECT {} FROM projects WHERE slug = ?1 COLLATE NOCASE",
            PROJECT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![slug], project_from_row)
            .optional()?)
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let conn = self.connection.lock().await;
        let sql = format!(
            "SELECT {} FROM projects WHERE name = ?1 ORDER BY created_at LIMIT 1",
            PROJECT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![name], project_from_row)
            .optional()?)
    }

    async fn increment_project_counter(&self, project_id: &ProjectId) -> Result<CounterTick> {
        let conn = self.connection.lock().await;
        // One statement: the increment and the read-back cannot interleave
        // with another writer.
        let tick = conn
            .query_row(
                "UPDATE projects SET task_counter = task_counter + 1, updated_at = ?2
                 WHERE id = ?1 RETURNING slug, task_counter",
                params![project_id.to_string(), Utc::now().to_rfc3339()],
                |row| {
                    Ok(CounterTick {
                        project_slug: row.get(0)?,
                        task_number: row.get(1)?,
                    })
                },
            )
            .optional()?;
        tick.ok_or_else(|| CadenceError::ProjectNotFound(project_id.to_string()))
    }

    async fn create_board(&self, board: &Board) -> Result<()> {
        let conn = self.connection.lock().await;
        conn.execute(
            "INSERT INTO boards (id, project_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                board.id.to_string(),
                board.project_id.to_string(),
                board.name,
                board.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn first_board_of_project(&self, project_id: &ProjectId) -> Result<Option<Board>> {
        let conn = self.connection.lock().await;
        Ok(conn
            .query_row(
                "SELECT id, project_id, name, created_at FROM boards
                 WHERE project_id = ?1 ORDER BY created_at, rowid LIMIT 1",
                params![project_id.to_string()],
                board_from_row,
            )
            .optional()?)
    }

    async fn load_board_snapshot(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
        let conn = self.connection.lock().await;
        let board = conn
            .query_row(
                "SELECT id, project_id, name, created_at FROM boards WHERE id = ?1",
                params![board_id.to_string()],
                board_from_row,
            )
            .optional()?
            .ok_or_else(|| CadenceError::BoardNotFound(board_id.to_string()))?;
        let columns = select_columns(&conn, board_id)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE column_id IN (SELECT id FROM columns WHERE board_id = ?1)",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map(params![board_id.to_string()], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(BoardSnapshot::new(board, columns, tasks))
    }

    async fn create_column(&self, column: &Column) -> Result<()> {
        let conn = self.connection.lock().await;
        conn.execute(
            "INSERT INTO columns (id, board_id, name, position, wip_limit) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                column.id.to_string(),
                column.board_id.to_string(),
                column.name,
                column.position,
                column.limit,
            ],
        )?;
        Ok(())
    }

    async fn find_column_by_id(&self, column_id: &ColumnId) -> Result<Option<Column>> {
        let conn = self.connection.lock().await;
        select_column(&conn, column_id)
    }

    async fn find_column_with_project(
        &self,
        column_id: &ColumnId,
    ) -> Result<Option<ColumnPlacement>> {
        let conn = self.connection.lock().await;
        Ok(conn
            .query_row(
                "SELECT c.id, c.board_id, c.name, c.position, c.wip_limit, p.id
                 FROM columns c
                 JOIN boards b ON b.id = c.board_id
                 JOIN projects p ON p.id = b.project_id
                 WHERE c.id = ?1",
                params![column_id.to_string()],
                |row| {
                    let column = column_from_row(row)?;
                    Ok(ColumnPlacement {
                        board_id: column.board_id,
                        project_id: parse_column(row, 5)?,
                        column,
                    })
                },
            )
            .optional()?)
    }

    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        let conn = self.connection.lock().await;
        select_columns(&conn, board_id)
    }

    async fn count_tasks_in_column(&self, column_id: &ColumnId) -> Result<usize> {
        let conn = self.connection.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE column_id = ?1",
            params![column_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn task_positions_in_column(
        &self,
        column_id: &ColumnId,
        excluding: Option<&TaskId>,
    ) -> Result<Vec<i32>> {
        let conn = self.connection.lock().await;
        select_positions(&conn, column_id, excluding)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let conn = self.connection.lock().await;
        insert_task(&conn, task)
    }

    async fn append_task(&self, mut task: NewTask) -> Result<Task> {
        let mut conn = self.connection.lock().await;
        // Dropping the transaction on an early return rolls it back
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let column = select_column(&tx, &task.column_id)?
            .ok_or_else(|| CadenceError::ColumnNotFound(task.column_id.to_string()))?;
        let positions = select_positions(&tx, &column.id, None)?;
        CapacityGuard::ensure_room(&column, positions.len())?;
        task.position = append_position(positions);
        let task = insert_task(&tx, task)?;
        tx.commit()?;
        Ok(task)
    }

    async fn find_task_by_id(&self, task_id: &TaskId) -> Result<Option<Task>> {
        let conn = self.connection.lock().await;
        select_task(&conn, task_id)
    }

    async fn update_task_column_and_position(
        &self,
        task_id: &TaskId,
        column_id: &ColumnId,
        position: i32,
    ) -> Result<Task> {
        let conn = self.connection.lock().await;
        relocate_task(&conn, task_id, column_id, position)
    }

    async fn append_to_column(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task> {
        let mut conn = self.connection.lock().await;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let task = select_task(&tx, task_id)?
            .ok_or_else(|| CadenceError::TaskNotFound(task_id.to_string()))?;
        let column = select_column(&tx, column_id)?
            .ok_or_else(|| CadenceError::ColumnNotFound(column_id.to_string()))?;
        if task.column_id == column.id {
            return Err(CadenceError::SameColumn(column.id.to_string()));
        }
        let positions = select_positions(&tx, &column.id, Some(task_id))?;
        CapacityGuard::ensure_room(&column, positions.len())?;
        let moved = relocate_task(&tx, task_id, &column.id, append_position(positions))?;
        tx.commit()?;
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskCreate, TaskIdentifier};

    async fn seeded() -> (SqliteStorage, Project, Column) {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.initialize().await.unwrap();
        let project = Project::new("Backend".to_string(), "BAC".to_string());
        storage.create_project(&project).await.unwrap();
        let board = Board::new(project.id, "Main".to_string());
        storage.create_board(&board).await.unwrap();
        let column = Column::new(board.id, "Todo".to_string(), 0)
            .with_limit(Some(5))
            .unwrap();
        storage.create_column(&column).await.unwrap();
        (storage, project, column)
    }

    #[tokio::test]
    async fn test_counter_increment_returns_slug() {
        let (storage, project, _) = seeded().await;
        let first = storage.increment_project_counter(&project.id).await.unwrap();
        let second = storage.increment_project_counter(&project.id).await.unwrap();
        assert_eq!(first.task_number, 1);
        assert_eq!(second.task_number, 2);
        assert_eq!(second.project_slug, "BAC");
    }

    #[tokio::test]
    async fn test_slug_lookup_is_case_insensitive() {
        let (storage, project, _) = seeded().await;
        let found = storage.find_project_by_slug("bac").await.unwrap().unwrap();
        assert_eq!(found.id, project.id);
    }

    #[tokio::test]
    async fn test_task_round_trip_and_snapshot() {
        let (storage, _, column) = seeded().await;
        let task = storage
            .create_task(NewTask::new(
                TaskCreate::new(column.id, "Store me"),
                TaskIdentifier::compose("BAC", 1),
                0,
            ))
            .await
            .unwrap();

        let placement = storage
            .find_column_with_project(&column.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(placement.column.limit, Some(5));

        let snapshot = storage
            .load_board_snapshot(&placement.board_id)
            .await
            .unwrap();
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.tasks[0].id, task.id);
        assert_eq!(snapshot.tasks[0].slug, "BAC-001");
    }

    #[tokio::test]
    async fn test_append_stops_at_limit() {
        let (storage, _, column) = seeded().await;
        for number in 1..=5 {
            let task = storage
                .append_task(NewTask::new(
                    TaskCreate::new(column.id, format!("Task {}", number)),
                    TaskIdentifier::compose("BAC", number),
                    -1,
                ))
                .await
                .unwrap();
            assert_eq!(task.position, number as i32 - 1);
        }

        let err = storage
            .append_task(NewTask::new(
                TaskCreate::new(column.id, "Overflow"),
                TaskIdentifier::compose("BAC", 6),
                -1,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, CadenceError::CapacityExceeded { .. }));
        assert_eq!(storage.count_tasks_in_column(&column.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_append_to_column_moves_to_end() {
        let (storage, _, todo) = seeded().await;
        let done = Column::new(todo.board_id, "Done".to_string(), 1);
        storage.create_column(&done).await.unwrap();
        let task = storage
            .append_task(NewTask::new(
                TaskCreate::new(todo.id, "Finish"),
                TaskIdentifier::compose("BAC", 1),
                -1,
            ))
            .await
            .unwrap();

        let same = storage.append_to_column(&task.id, &todo.id).await.unwrap_err();
        assert!(matches!(same, CadenceError::SameColumn(_)));

        let moved = storage.append_to_column(&task.id, &done.id).await.unwrap();
        assert_eq!((moved.column_id, moved.position), (done.id, 0));
        assert_eq!(moved.slug, "BAC-001");
    }
}
