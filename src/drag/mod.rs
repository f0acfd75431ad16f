//! Drag-and-drop of tasks between columns.
//!
//! The rendering side owns the per-card [`GestureController`]s, the
//! [`DropZones`] and the [`AutoScrollReactor`]; they share one lock-free
//! [`DragSession`]. The application side runs a [`DragCoordinator`] that
//! receives [`DragEvent`]s over a channel, validates drops and commits them.

pub mod auto_scroll;
pub mod coordinator;
pub mod drop;
pub mod drop_zone;
pub mod gesture;
pub mod session;
pub mod slots;

pub use auto_scroll::{AutoScrollReactor, ScrollCommand, ScrollDriver, ScrollExtent};
pub use coordinator::{DragCoordinator, DropResolution};
pub use drop::{DropDecision, DropValidator, MoveCommitter, ValidatedDrop};
pub use drop_zone::{ColumnZone, DropZones, Rect};
pub use gesture::{DragEvent, GestureController, GestureOutcome, GestureState};
pub use session::{DragSession, DropTarget, Point, SessionView, Slot};
pub use slots::BoardSlots;
