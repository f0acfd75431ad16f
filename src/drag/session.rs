//! Shared state of the in-flight drag.
//!
//! Every field is its own atomic cell with exactly one writer:
//!
//! | field           | writer                 |
//! |-----------------|------------------------|
//! | dragged task    | owning gesture         |
//! | is active       | owning gesture         |
//! | pointer         | owning gesture         |
//! | target          | column drop zones      |
//! | active column   | column drop zones      |
//!
//! Writers publish with `Release` and readers observe with `Acquire`, so a
//! pointer or target written on the rendering side is visible to any reader
//! that runs for the same or a later frame. No field is ever behind a lock.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Compact handle for a task or column of the board being viewed.
///
/// Ids are interned into slots (see [`BoardSlots`](super::BoardSlots)) so
/// they fit in a single atomic word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(NonZeroU32);

impl Slot {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Column under the pointer and the index the card would land at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub column: Slot,
    pub index: u32,
}

/// Point-in-time read of every field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionView {
    pub is_active: bool,
    pub dragged: Option<Slot>,
    pub pointer: Point,
    pub target: Option<DropTarget>,
    pub active_column: Option<Slot>,
}

impl SessionView {
    /// Target index with `-1` standing for "no target"
    pub fn target_index(&self) -> i64 {
        self.target.map_or(-1, |t| i64::from(t.index))
    }
}

#[derive(Debug, Default)]
pub struct DragSession {
    is_active: AtomicBool,
    dragged: AtomicU32,
    pointer: AtomicU64,
    target: AtomicU64,
    active_column: AtomicU32,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the session for `task`.
    ///
    /// Returns `false` without touching anything if another drag holds it.
    pub fn begin(&self, task: Slot, pointer: Point) -> bool {
        if self
            .dragged
            .compare_exchange(0, task.get(), Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.pointer.store(pack_point(pointer), Ordering::Release);
        self.target.store(0, Ordering::Release);
        self.active_column.store(0, Ordering::Release);
        self.is_active.store(true, Ordering::Release);
        true
    }

    pub fn update_pointer(&self, pointer: Point) {
        self.pointer.store(pack_point(pointer), Ordering::Release);
    }

    pub fn update_target(&self, target: Option<DropTarget>) {
        self.target.store(pack_target(target), Ordering::Release);
    }

    pub fn set_active_column(&self, column: Option<Slot>) {
        self.active_column
            .store(column.map_or(0, Slot::get), Ordering::Release);
    }

    /// Releases the session if `task` holds it.
    ///
    /// The dragged slot is cleared last, so a new drag cannot begin until
    /// every other field is back to empty.
    pub fn end(&self, task: Slot) -> bool {
        if self.dragged.load(Ordering::Acquire) != task.get() {
            return false;
        }
        self.is_active.store(false, Ordering::Release);
        self.target.store(0, Ordering::Release);
        self.active_column.store(0, Ordering::Release);
        self.pointer.store(0, Ordering::Release);
        self.dragged.store(0, Ordering::Release);
        true
    }

    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Acquire)
    }

    pub fn dragged(&self) -> Option<Slot> {
        Slot::new(self.dragged.load(Ordering::Acquire))
    }

    pub fn pointer(&self) -> Point {
        unpack_point(self.pointer.load(Ordering::Acquire))
    }

    pub fn target(&self) -> Option<DropTarget> {
        unpack_target(self.target.load(Ordering::Acquire))
    }

    pub fn active_column(&self) -> Option<Slot> {
        Slot::new(self.active_column.load(Ordering::Acquire))
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            is_active: self.is_active(),
            dragged: self.dragged(),
            pointer: self.pointer(),
            target: self.target(),
            active_column: self.active_column(),
        }
    }
}

fn pack_point(point: Point) -> u64 {
    (u64::from(point.x.to_bits()) << 32) | u64::from(point.y.to_bits())
}

fn unpack_point(bits: u64) -> Point {
    Point::new(f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
}

fn pack_target(target: Option<DropTarget>) -> u64 {
    target.map_or(0, |t| (u64::from(t.column.get()) << 32) | u64::from(t.index))
}

fn unpack_target(bits: u64) -> Option<DropTarget> {
    Slot::new((bits >> 32) as u32).map(|column| DropTarget {
        column,
        index: bits as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn slot(raw: u32) -> Slot {
        Slot::new(raw).unwrap()
    }

    fn assert_idle(session: &DragSession) {
        let view = session.view();
        assert!(!view.is_active);
        assert_eq!(view.dragged, None);
        assert_eq!(view.target, None);
        assert_eq!(view.target_index(), -1);
        assert_eq!(view.active_column, None);
    }

    #[test]
    fn test_new_session_is_idle() {
        assert_idle(&DragSession::new());
        assert_eq!(Slot::new(0), None);
    }

    #[test]
    fn test_pointer_and_target_survive_packing() {
        let session = DragSession::new();
        assert!(session.begin(slot(4), Point::new(-12.5, 640.25)));
        assert_eq!(session.pointer(), Point::new(-12.5, 640.25));

        let target = DropTarget {
            column: slot(2),
            index: 7,
        };
        session.update_target(Some(target));
        session.set_active_column(Some(slot(2)));
        assert_eq!(session.target(), Some(target));
        assert_eq!(session.view().target_index(), 7);
        assert_eq!(session.active_column(), Some(slot(2)));
    }

    #[test]
    fn test_second_drag_cannot_begin() {
        let session = DragSession::new();
        assert!(session.begin(slot(1), Point::default()));
        assert!(!session.begin(slot(2), Point::new(5.0, 5.0)));
        assert_eq!(session.dragged(), Some(slot(1)));
        assert_eq!(session.pointer(), Point::default());
    }

    #[test]
    fn test_only_owner_can_end() {
        let session = DragSession::new();
        session.begin(slot(1), Point::default());
        assert!(!session.end(slot(2)));
        assert!(session.is_active());
        assert!(session.end(slot(1)));
        assert_idle(&session);
    }

    #[test]
    fn test_start_track_end_sequences_leave_session_idle() {
        let session = DragSession::new();
        for round in 1..=20u32 {
            let task = slot(round);
            assert!(session.begin(task, Point::new(0.0, 0.0)));
            for step in 0..round {
                let p = Point::new(step as f32 * 3.0, step as f32 * 2.0);
                session.update_pointer(p);
                if step % 2 == 0 {
                    session.update_target(Some(DropTarget {
                        column: slot(step + 1),
                        index: step,
                    }));
                } else {
                    session.update_target(None);
                }
            }
            assert!(session.end(task));
            assert_idle(&session);
        }
    }

    #[test]
    fn test_concurrent_begin_has_single_winner() {
        let session = Arc::new(DragSession::new());
        let handles: Vec<_> = (1..=16u32)
            .map(|raw| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || session.begin(slot(raw), Point::default()))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(session.is_active());
    }
}
