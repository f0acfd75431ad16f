//! Edge-triggered scrolling while a drag is active.
//!
//! The column list scrolls horizontally when the dragged card nears the left
//! or right edge of the board viewport. The task list of the column under the
//! pointer scrolls vertically when the pointer nears its top or bottom. Speed
//! ramps linearly from zero at the threshold to full speed at the edge.
//!
//! Both axes share one interval: at most one command is issued per scroll
//! interval, and the column list wins when both axes are near an edge.

use super::session::{DragSession, Point, Slot};
use crate::config::AutoScrollConfig;
use crate::domain::ColumnId;
use std::collections::HashMap;
use std::time::Instant;
use tracing::trace;

/// Scrollable region along one axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollExtent {
    /// Current scroll offset
    pub offset: f32,
    pub content: f32,
    pub viewport: f32,
    /// Screen coordinate of the viewport's leading edge
    pub origin: f32,
}

impl ScrollExtent {
    pub fn max_offset(&self) -> f32 {
        (self.content - self.viewport).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    Columns { offset: f32 },
    Tasks { column_id: ColumnId, offset: f32 },
}

/// Applies scroll commands to the host's scroll views
pub trait ScrollDriver {
    fn scroll(&self, command: ScrollCommand);
}

struct ColumnScroll {
    column_id: ColumnId,
    extent: ScrollExtent,
}

pub struct AutoScrollReactor {
    config: AutoScrollConfig,
    board: ScrollExtent,
    columns: HashMap<Slot, ColumnScroll>,
    last_scroll: Option<Instant>,
}

impl AutoScrollReactor {
    pub fn new(config: AutoScrollConfig) -> Self {
        Self {
            config,
            board: ScrollExtent::default(),
            columns: HashMap::new(),
            last_scroll: None,
        }
    }

    /// Layout of the horizontal column list
    pub fn set_board_extent(&mut self, extent: ScrollExtent) {
        self.board = extent;
    }

    /// Layout of one column's vertical task list
    pub fn register_column(&mut self, slot: Slot, column_id: ColumnId, extent: ScrollExtent) {
        self.columns.insert(slot, ColumnScroll { column_id, extent });
    }

    pub fn unregister_column(&mut self, slot: Slot) {
        self.columns.remove(&slot);
    }

    pub fn board_offset(&self) -> f32 {
        self.board.offset
    }

    pub fn column_offset(&self, slot: Slot) -> Option<f32> {
        self.columns.get(&slot).map(|c| c.extent.offset)
    }

    /// Observes the session for one frame and returns the scroll to apply
    pub fn on_frame(&mut self, now: Instant, session: &DragSession) -> Option<ScrollCommand> {
        if !session.is_active() {
            self.last_scroll = None;
            return None;
        }
        if !due(self.last_scroll, now, &self.config) {
            return None;
        }
        let pointer = session.pointer();

        let command = match self.horizontal_step(pointer) {
            Some(offset) => {
                self.board.offset = offset;
                Some(ScrollCommand::Columns { offset })
            }
            None => session
                .active_column()
                .and_then(|slot| self.vertical_step(slot, pointer)),
        };

        if let Some(command) = &command {
            self.last_scroll = Some(now);
            trace!(?command, "auto-scroll");
        }
        command
    }

    /// Runs one frame and hands the resulting command to `driver`
    pub fn drive(&mut self, now: Instant, session: &DragSession, driver: &dyn ScrollDriver) {
        if let Some(command) = self.on_frame(now, session) {
            driver.scroll(command);
        }
    }

    fn horizontal_step(&self, pointer: Point) -> Option<f32> {
        let threshold = self.config.horizontal_edge_threshold;
        let half = self.config.overlay_half_width;
        let local_x = pointer.x - self.board.origin;

        let left = local_x - half;
        let right = self.board.viewport - (local_x + half);
        let delta = if left < threshold {
            -self.config.scroll_speed * intensity(left, threshold)
        } else if right < threshold {
            self.config.scroll_speed * intensity(right, threshold)
        } else {
            return None;
        };
        step(&self.board, delta)
    }

    fn vertical_step(&mut self, slot: Slot, pointer: Point) -> Option<ScrollCommand> {
        let threshold = self.config.vertical_edge_threshold;
        let speed = self.config.scroll_speed;
        let column = self.columns.get_mut(&slot)?;
        let local_y = pointer.y - column.extent.origin;

        let top = local_y;
        let bottom = column.extent.viewport - local_y;
        let delta = if top < threshold {
            -speed * intensity(top, threshold)
        } else if bottom < threshold {
            speed * intensity(bottom, threshold)
        } else {
            return None;
        };
        let offset = step(&column.extent, delta)?;
        column.extent.offset = offset;
        Some(ScrollCommand::Tasks {
            column_id: column.column_id,
            offset,
        })
    }
}

fn due(last: Option<Instant>, now: Instant, config: &AutoScrollConfig) -> bool {
    last.map_or(true, |at| now.saturating_duration_since(at) >= config.scroll_interval())
}

/// Full speed at or past the edge, falling to zero at the threshold
fn intensity(distance: f32, threshold: f32) -> f32 {
    (1.0 - distance / threshold).clamp(0.0, 1.0)
}

/// New offset after scrolling by `delta`, or `None` when already at the bound
fn step(extent: &ScrollExtent, delta: f32) -> Option<f32> {
    let next = (extent.offset + delta).clamp(0.0, extent.max_offset());
    (next != extent.offset).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    fn slot(raw: u32) -> Slot {
        Slot::new(raw).unwrap()
    }

    fn reactor() -> AutoScrollReactor {
        let mut reactor = AutoScrollReactor::new(AutoScrollConfig::default());
        reactor.set_board_extent(ScrollExtent {
            offset: 500.0,
            content: 2000.0,
            viewport: 1000.0,
            origin: 0.0,
        });
        reactor
    }

    fn dragging_at(x: f32, y: f32) -> DragSession {
        let session = DragSession::new();
        session.begin(slot(1), Point::new(x, y));
        session
    }

    #[test]
    fn test_intensity_ramp() {
        assert_eq!(intensity(0.0, 80.0), 1.0);
        assert_eq!(intensity(40.0, 80.0), 0.5);
        assert_eq!(intensity(80.0, 80.0), 0.0);
        assert_eq!(intensity(-30.0, 80.0), 1.0);
    }

    #[test]
    fn test_idle_session_never_scrolls() {
        let mut reactor = reactor();
        let session = DragSession::new();
        assert!(reactor.on_frame(Instant::now(), &session).is_none());
    }

    #[test]
    fn test_card_edge_near_left_scrolls_left() {
        let mut reactor = reactor();
        // Card's left edge sits 40px from the viewport edge: half speed
        let session = dragging_at(200.0, 300.0);
        let command = reactor.on_frame(Instant::now(), &session);
        assert_eq!(command, Some(ScrollCommand::Columns { offset: 488.0 }));
        assert_eq!(reactor.board_offset(), 488.0);
    }

    #[test]
    fn test_card_edge_near_right_scrolls_right_at_full_speed() {
        let mut reactor = reactor();
        let session = dragging_at(900.0, 300.0);
        let command = reactor.on_frame(Instant::now(), &session);
        assert_eq!(command, Some(ScrollCommand::Columns { offset: 524.0 }));
    }

    #[test]
    fn test_middle_of_viewport_is_quiet() {
        let mut reactor = reactor();
        let session = dragging_at(500.0, 300.0);
        assert!(reactor.on_frame(Instant::now(), &session).is_none());
    }

    #[test]
    fn test_scroll_clamps_and_stops_at_bound() {
        let mut reactor = reactor();
        reactor.set_board_extent(ScrollExtent {
            offset: 10.0,
            content: 2000.0,
            viewport: 1000.0,
            origin: 0.0,
        });
        let session = dragging_at(100.0, 300.0);
        let start = Instant::now();

        let first = reactor.on_frame(start, &session);
        assert_eq!(first, Some(ScrollCommand::Columns { offset: 0.0 }));
        let second = reactor.on_frame(start + Duration::from_millis(20), &session);
        assert!(second.is_none());
    }

    #[test]
    fn test_rate_limited_per_interval() {
        let mut reactor = reactor();
        let session = dragging_at(900.0, 300.0);
        let start = Instant::now();

        assert!(reactor.on_frame(start, &session).is_some());
        assert!(reactor
            .on_frame(start + Duration::from_millis(5), &session)
            .is_none());
        assert!(reactor
            .on_frame(start + Duration::from_millis(15), &session)
            .is_none());
        assert!(reactor
            .on_frame(start + Duration::from_millis(16), &session)
            .is_some());
        assert_eq!(reactor.board_offset(), 548.0);
    }

    #[test]
    fn test_only_active_column_scrolls_vertically() {
        let mut reactor = reactor();
        let todo = ColumnId::new();
        let doing = ColumnId::new();
        let extent = ScrollExtent {
            offset: 100.0,
            content: 1200.0,
            viewport: 600.0,
            origin: 100.0,
        };
        reactor.register_column(slot(1), todo, extent);
        reactor.register_column(slot(2), doing, extent);

        // Pointer 30px above the bottom edge of the list, middle of the board
        let session = dragging_at(500.0, 670.0);
        session.set_active_column(Some(slot(2)));
        let command = reactor.on_frame(Instant::now(), &session);

        assert_eq!(
            command,
            Some(ScrollCommand::Tasks {
                column_id: doing,
                offset: 112.0
            })
        );
        assert_eq!(reactor.column_offset(slot(1)), Some(100.0));
        assert_eq!(reactor.column_offset(slot(2)), Some(112.0));
    }

    #[test]
    fn test_one_command_per_interval_with_horizontal_priority() {
        let mut reactor = reactor();
        let column = ColumnId::new();
        reactor.register_column(
            slot(1),
            column,
            ScrollExtent {
                offset: 100.0,
                content: 1200.0,
                viewport: 600.0,
                origin: 100.0,
            },
        );
        // Near the right edge of the board and the top of the task list
        let session = dragging_at(900.0, 100.0);
        session.set_active_column(Some(slot(1)));
        let start = Instant::now();

        assert_eq!(
            reactor.on_frame(start, &session),
            Some(ScrollCommand::Columns { offset: 524.0 })
        );
        assert_eq!(reactor.column_offset(slot(1)), Some(100.0));
        assert!(reactor
            .on_frame(start + Duration::from_millis(8), &session)
            .is_none());

        // Board scrolled to its bound: the task list gets the next interval
        reactor.set_board_extent(ScrollExtent {
            offset: 1000.0,
            content: 2000.0,
            viewport: 1000.0,
            origin: 0.0,
        });
        assert_eq!(
            reactor.on_frame(start + Duration::from_millis(16), &session),
            Some(ScrollCommand::Tasks {
                column_id: column,
                offset: 76.0
            })
        );
        assert!(reactor
            .on_frame(start + Duration::from_millis(20), &session)
            .is_none());
    }

    #[test]
    fn test_drive_forwards_commands() {
        struct Recorder(RefCell<Vec<ScrollCommand>>);
        impl ScrollDriver for Recorder {
            fn scroll(&self, command: ScrollCommand) {
                self.0.borrow_mut().push(command);
            }
        }

        let mut reactor = reactor();
        let recorder = Recorder(RefCell::new(Vec::new()));
        let session = dragging_at(900.0, 300.0);
        reactor.drive(Instant::now(), &session, &recorder);
        assert_eq!(recorder.0.borrow().len(), 1);
    }
}
