/// Declares a UUID-backed entity identifier
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generates a fresh random identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use uuid_id;

pub mod board;
pub mod capacity;
pub mod ordering;
pub mod project;
pub mod snapshot;
pub mod task;

pub use board::{validate_limit, Board, BoardId, Column, ColumnId};
pub use capacity::{CapacityDecision, CapacityGuard, ColumnLoad};
pub use ordering::{append_position, sort_columns, sort_tasks};
pub use project::{Project, ProjectCreate, ProjectId, ProjectStatus};
pub use snapshot::{BoardSnapshot, LocalMove};
pub use task::{
    NewTask, QuickTaskCreate, Task, TaskCreate, TaskId, TaskIdentifier, TaskPriority, TaskType,
};
