//! Per-card gesture recognition.
//!
//! A press held for the long-press duration starts a drag; travel during the
//! hold is unlimited. Once dragging, pointer moves are tracked into the
//! shared [`DragSession`] without involving the application side, which only
//! hears about the start and the end of the drag through [`DragEvent`]s.

use super::drop_zone::DropZones;
use super::session::{DragSession, Point, Slot};
use crate::config::GestureConfig;
use crate::domain::{ColumnId, TaskId};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

/// Boundary notifications for the application side
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    Started { task_id: TaskId, origin: Point },
    Ended {
        task_id: TaskId,
        target: Option<ColumnId>,
    },
}

impl DragEvent {
    pub fn task_id(&self) -> TaskId {
        match self {
            DragEvent::Started { task_id, .. } | DragEvent::Ended { task_id, .. } => *task_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Pointer down, hold not yet long enough
    Pressed { since: Instant, origin: Point, last: Point },
    /// `tracking` turns on with the first pointer move after the drag began
    Dragging { tracking: bool },
}

/// What a gesture input resulted in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Nothing changed that the caller needs to know about
    None,
    /// Short press released near where it started
    Tapped,
    DragStarted,
    /// Another card owns the session; the press was dropped
    Blocked,
    Dropped { target: Option<ColumnId> },
    Cancelled,
}

pub struct GestureController {
    task_id: TaskId,
    slot: Slot,
    session: Arc<DragSession>,
    events: UnboundedSender<DragEvent>,
    config: GestureConfig,
    state: GestureState,
}

impl GestureController {
    pub fn new(
        task_id: TaskId,
        slot: Slot,
        session: Arc<DragSession>,
        events: UnboundedSender<DragEvent>,
        config: GestureConfig,
    ) -> Self {
        Self {
            task_id,
            slot,
            session,
            events,
            config,
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn press_began(&mut self, now: Instant, at: Point) -> GestureOutcome {
        if self.state != GestureState::Idle {
            trace!(task = %self.task_id, "press ignored, gesture already in progress");
            return GestureOutcome::None;
        }
        self.state = GestureState::Pressed {
            since: now,
            origin: at,
            last: at,
        };
        GestureOutcome::None
    }

    /// Advances the hold timer; starts the drag once the hold is long enough
    pub fn tick(&mut self, now: Instant) -> GestureOutcome {
        let GestureState::Pressed { since, last, .. } = self.state else {
            return GestureOutcome::None;
        };
        if now.saturating_duration_since(since) < self.config.long_press() {
            return GestureOutcome::None;
        }

        if !self.session.begin(self.slot, last) {
            debug!(task = %self.task_id, "drag blocked, session owned by another card");
            self.state = GestureState::Idle;
            return GestureOutcome::Blocked;
        }
        self.state = GestureState::Dragging { tracking: false };
        debug!(task = %self.task_id, "drag started");
        self.notify(DragEvent::Started {
            task_id: self.task_id,
            origin: last,
        });
        GestureOutcome::DragStarted
    }

    pub fn pointer_moved(&mut self, now: Instant, at: Point, zones: &DropZones) -> GestureOutcome {
        let outcome = self.tick(now);
        match &mut self.state {
            GestureState::Pressed { last, .. } => *last = at,
            GestureState::Dragging { tracking } => {
                *tracking = true;
                self.session.update_pointer(at);
                zones.track(&self.session, at);
            }
            GestureState::Idle => {}
        }
        outcome
    }

    /// Ends the gesture.
    ///
    /// The final pointer is written and the drop zones re-resolved before the
    /// target is read, so the drop never acts on a target from an earlier
    /// frame.
    pub fn released(&mut self, now: Instant, at: Point, zones: &DropZones) -> GestureOutcome {
        self.tick(now);
        match self.state {
            GestureState::Idle => GestureOutcome::None,
            GestureState::Pressed { origin, .. } => {
                self.state = GestureState::Idle;
                if origin.distance_to(at) <= self.config.tap_max_distance {
                    GestureOutcome::Tapped
                } else {
                    GestureOutcome::Cancelled
                }
            }
            GestureState::Dragging { tracking: false } => self.finish(None),
            GestureState::Dragging { tracking: true } => {
                self.session.update_pointer(at);
                zones.track(&self.session, at);
                let target = self
                    .session
                    .target()
                    .and_then(|t| zones.column_id(t.column));
                self.finish(Some(target))
            }
        }
    }

    /// The system took the touch sequence away; never leaves a drag behind
    pub fn interrupted(&mut self) -> GestureOutcome {
        match self.state {
            GestureState::Idle => GestureOutcome::None,
            GestureState::Pressed { .. } => {
                self.state = GestureState::Idle;
                GestureOutcome::Cancelled
            }
            GestureState::Dragging { .. } => self.finish(None),
        }
    }

    /// `drop` is `None` when tracking never activated
    fn finish(&mut self, drop: Option<Option<ColumnId>>) -> GestureOutcome {
        self.session.end(self.slot);
        self.state = GestureState::Idle;

        let target = drop.flatten();
        self.notify(DragEvent::Ended {
            task_id: self.task_id,
            target,
        });
        match drop {
            Some(target) => {
                debug!(task = %self.task_id, ?target, "drag dropped");
                GestureOutcome::Dropped { target }
            }
            None => {
                debug!(task = %self.task_id, "drag cancelled");
                GestureOutcome::Cancelled
            }
        }
    }

    fn notify(&self, event: DragEvent) {
        if self.events.send(event).is_err() {
            debug!(task = %self.task_id, "drag event dropped, no listener");
        }
    }
}
