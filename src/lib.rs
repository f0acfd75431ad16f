//! # Cadence Core
//!
//! Task placement and drag-and-drop engine for kanban boards.
//!
//! The crate allocates project slugs and per-project task numbers, enforces
//! column WIP limits when tasks are created or moved, and runs the gesture
//! state machine that lets a user drag a task from one column to another.
//! Persistence sits behind the [`Storage`] trait with in-memory, file and
//! (optionally) SQLite backends.

pub mod clock;
pub mod config;
pub mod domain;
pub mod drag;
pub mod error;
pub mod placement;
pub mod storage;

// Re-export commonly used types
pub use config::EngineConfig;
pub use domain::{
    Board, BoardId, BoardSnapshot, CapacityGuard, Column, ColumnId, Project, ProjectId,
    QuickTaskCreate, Task, TaskCreate, TaskId,
};
pub use drag::{DragCoordinator, DragEvent, DragSession, DropResolution, GestureController};
pub use error::{CadenceError, ErrorKind, Result};
pub use placement::{IdentifierAllocator, ProjectService, TaskMover, TaskPlacementService};
pub use storage::Storage;
