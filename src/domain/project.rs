use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::uuid_id;

uuid_id!(
    /// Unique identifier for a project
    ProjectId
);

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Completed,
}

impl ProjectStatus {
    /// Maps free-form input onto a known status, dropping anything unrecognized
    pub fn normalize(input: Option<&str>) -> Option<Self> {
        input.and_then(|s| s.trim().parse().ok())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "completed" => Ok(Self::Completed),
            _ => Err(format!(
                "Invalid project status '{}'. Valid statuses: active, archived, completed",
                s
            )),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A project owning boards and the task-number sequence for its tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Three or more uppercase letters, immutable once assigned
    pub slug: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub status: ProjectStatus,
    /// Last task number handed out; only ever increases
    pub task_counter: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name,
            slug,
            description: None,
            color: None,
            status: ProjectStatus::Active,
            task_counter: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advances the counter and returns the new task number
    pub fn next_task_number(&mut self) -> u32 {
        self.task_counter += 1;
        self.updated_at = Utc::now();
        self.task_counter
    }

    /// Case-insensitive slug comparison
    pub fn has_slug(&self, slug: &str) -> bool {
        self.slug.eq_ignore_ascii_case(slug)
    }
}

/// Caller-supplied fields for a new project
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectCreate {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub status: Option<String>,
}

impl ProjectCreate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
