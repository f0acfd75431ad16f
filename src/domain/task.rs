use crate::domain::board::ColumnId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::uuid_id;

uuid_id!(
    /// Unique identifier for a task
    TaskId
);

/// Kind of work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Subtask,
    Meeting,
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "subtask" => Ok(Self::Subtask),
            "meeting" => Ok(Self::Meeting),
            _ => Err(format!(
                "Invalid task type '{}'. Valid types: task, subtask, meeting",
                s
            )),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Subtask => write!(f, "subtask"),
            Self::Meeting => write!(f, "meeting"),
        }
    }
}

/// Task urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high, urgent",
                s
            )),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Human-readable identifier allocated once per task (e.g., ABC-001)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskIdentifier {
    pub slug: String,
    pub task_number: u32,
}

impl TaskIdentifier {
    /// Composes `<PROJECT>-<number>` with the number zero-padded to three digits
    pub fn compose(project_slug: &str, task_number: u32) -> Self {
        Self {
            slug: format!("{}-{:03}", project_slug, task_number),
            task_number,
        }
    }
}

impl fmt::Display for TaskIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug)
    }
}

/// A task living in exactly one column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    /// Assigned at creation and never changed, even across moves
    pub slug: String,
    pub task_number: u32,
    /// Rank within the current column
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    pub task_type: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn from_new(new_task: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            column_id: new_task.column_id,
            slug: new_task.identifier.slug,
            task_number: new_task.identifier.task_number,
            position: new_task.position,
            title: new_task.title,
            description: new_task.description,
            parent_id: new_task.parent_id,
            task_type: new_task.task_type,
            priority: new_task.priority,
            created_at: now,
            updated_at: now,
        }
    }

    /// Relocates the task; slug and number are untouched
    pub fn relocate(&mut self, column_id: ColumnId, position: i32) {
        self.column_id = column_id;
        self.position = position;
        self.updated_at = Utc::now();
    }
}

/// Caller-supplied fields for creating a task in a known column
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    pub column_id: ColumnId,
    pub description: Option<String>,
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub task_type: TaskType,
    pub priority: Option<TaskPriority>,
}

impl TaskCreate {
    pub fn new(column_id: ColumnId, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            column_id,
            description: None,
            parent_id: None,
            task_type: TaskType::Task,
            priority: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Caller-supplied fields for creating a task in the default project
#[derive(Debug, Clone, Deserialize)]
pub struct QuickTaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub task_type: TaskType,
    pub priority: Option<TaskPriority>,
}

impl QuickTaskCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            parent_id: None,
            task_type: TaskType::Task,
            priority: None,
        }
    }

    pub fn into_task_create(self, column_id: ColumnId) -> TaskCreate {
        TaskCreate {
            title: self.title,
            column_id,
            description: self.description,
            parent_id: self.parent_id,
            task_type: self.task_type,
            priority: self.priority,
        }
    }
}

/// Fully resolved task row handed to storage
#[derive(Debug, Clone)]
pub struct NewTask {
    pub column_id: ColumnId,
    pub identifier: TaskIdentifier,
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub parent_id: Option<TaskId>,
    pub task_type: TaskType,
    pub priority: Option<TaskPriority>,
}

impl NewTask {
    pub fn new(input: TaskCreate, identifier: TaskIdentifier, position: i32) -> Self {
        Self {
            column_id: input.column_id,
            identifier,
            position,
            title: input.title,
            description: input.description,
            parent_id: input.parent_id,
            task_type: input.task_type,
            priority: input.priority,
        }
    }
}
