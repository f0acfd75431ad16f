//! Application-side handling of drag lifecycle events.

use super::drop::{DropDecision, DropValidator, MoveCommitter};
use super::gesture::DragEvent;
use crate::domain::{BoardSnapshot, ColumnId, Task, TaskId};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

/// How a finished drag was settled
#[derive(Debug, Clone)]
pub enum DropResolution {
    /// Persisted; the board holds the server's copy of the task
    Moved(Task),
    Rejected { task_id: TaskId, reason: String },
    /// Released outside every column; the card goes back where it was
    NoTarget { task_id: TaskId },
    /// Stale event or a drop onto the card's own column
    Ignored { task_id: TaskId },
    /// The move call failed after the optimistic local move
    Failed {
        task_id: TaskId,
        reason: String,
        reverted: bool,
    },
}

impl DropResolution {
    pub fn task_id(&self) -> TaskId {
        match self {
            DropResolution::Moved(task) => task.id,
            DropResolution::Rejected { task_id, .. }
            | DropResolution::NoTarget { task_id }
            | DropResolution::Ignored { task_id }
            | DropResolution::Failed { task_id, .. } => *task_id,
        }
    }
}

/// Owns the board view's state and settles drops against it
pub struct DragCoordinator {
    board: BoardSnapshot,
    committer: MoveCommitter,
    active: Option<TaskId>,
}

impl DragCoordinator {
    pub fn new(board: BoardSnapshot, committer: MoveCommitter) -> Self {
        Self {
            board,
            committer,
            active: None,
        }
    }

    pub fn board(&self) -> &BoardSnapshot {
        &self.board
    }

    /// Task whose drag is currently in flight
    pub fn active_drag(&self) -> Option<TaskId> {
        self.active
    }

    /// Handles one event; only drag ends produce a resolution
    pub async fn handle(&mut self, event: DragEvent) -> Option<DropResolution> {
        match event {
            DragEvent::Started { task_id, .. } => {
                debug!(task = %task_id, "drag in flight");
                self.active = Some(task_id);
                None
            }
            DragEvent::Ended { task_id, target } => Some(self.settle(task_id, target).await),
        }
    }

    /// Consumes events until every sender is gone
    pub async fn run<F>(&mut self, events: &mut UnboundedReceiver<DragEvent>, mut on_resolution: F)
    where
        F: FnMut(DropResolution),
    {
        while let Some(event) = events.recv().await {
            if let Some(resolution) = self.handle(event).await {
                on_resolution(resolution);
            }
        }
    }

    async fn settle(&mut self, task_id: TaskId, target: Option<ColumnId>) -> DropResolution {
        if self.active != Some(task_id) {
            warn!(task = %task_id, active = ?self.active, "ignoring stale drag end");
            return DropResolution::Ignored { task_id };
        }
        self.active = None;

        let Some(target) = target else {
            debug!(task = %task_id, "dropped outside any column");
            return DropResolution::NoTarget { task_id };
        };

        if self.board.task(&task_id).map(|t| t.column_id) == Some(target) {
            debug!(task = %task_id, "dropped onto its own column");
            return DropResolution::Ignored { task_id };
        }

        let drop = match DropValidator::validate(&self.board, &task_id, &target) {
            DropDecision::Accept(drop) => drop,
            DropDecision::Reject { reason } => {
                warn!(task = %task_id, column = %target, "drop rejected: {}", reason);
                return DropResolution::Rejected { task_id, reason };
            }
        };

        let local = self.board.apply_local_move(&task_id, target);
        match self.committer.commit(drop).await {
            Ok(task) => {
                info!(task = %task.id, slug = %task.slug, "drop settled");
                self.board.upsert_task(task.clone());
                DropResolution::Moved(task)
            }
            Err(e) => {
                warn!(task = %task_id, column = %target, "move failed: {}", e);
                let reverted = match &local {
                    Some(local) => {
                        self.board.revert_local_move(local);
                        true
                    }
                    None => false,
                };
                DropResolution::Failed {
                    task_id,
                    reason: e.to_string(),
                    reverted,
                }
            }
        }
    }
}
