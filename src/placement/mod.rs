//! Task creation, quick creation and moves, plus the project scaffolding
//! they depend on.

pub mod identifier;
pub mod project;
pub mod service;

pub use identifier::IdentifierAllocator;
pub use project::ProjectService;
pub use service::{TaskMover, TaskPlacementService};
