//! Column drop zones: the single writer of the session's target and
//! active column.

use super::session::{DragSession, DropTarget, Point, Slot};
use crate::domain::ColumnId;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Laid-out column as seen by the drag layer
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnZone {
    pub slot: Slot,
    pub column_id: ColumnId,
    /// On-screen bounds of the column's task list
    pub bounds: Rect,
    pub scroll_offset: f32,
    /// Height of one card including spacing
    pub item_extent: f32,
    pub task_count: usize,
}

impl ColumnZone {
    /// Index a card dropped at `point` would take
    pub fn index_at(&self, point: Point) -> u32 {
        let max = u32::try_from(self.task_count).unwrap_or(u32::MAX);
        if self.item_extent <= 0.0 {
            return max;
        }
        let offset = point.y - self.bounds.y + self.scroll_offset;
        let index = (offset / self.item_extent).floor();
        if index <= 0.0 {
            0
        } else {
            (index as u32).min(max)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DropZones {
    zones: Vec<ColumnZone>,
}

impl DropZones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a column or replaces its layout
    pub fn upsert(&mut self, zone: ColumnZone) {
        match self.zones.iter_mut().find(|z| z.slot == zone.slot) {
            Some(existing) => *existing = zone,
            None => self.zones.push(zone),
        }
    }

    pub fn remove(&mut self, slot: Slot) {
        self.zones.retain(|z| z.slot != slot);
    }

    pub fn set_scroll_offset(&mut self, slot: Slot, offset: f32) {
        if let Some(zone) = self.zones.iter_mut().find(|z| z.slot == slot) {
            zone.scroll_offset = offset;
        }
    }

    pub fn set_task_count(&mut self, slot: Slot, count: usize) {
        if let Some(zone) = self.zones.iter_mut().find(|z| z.slot == slot) {
            zone.task_count = count;
        }
    }

    pub fn zone_at(&self, point: Point) -> Option<&ColumnZone> {
        self.zones.iter().find(|z| z.bounds.contains(point))
    }

    pub fn column_id(&self, slot: Slot) -> Option<ColumnId> {
        self.zones
            .iter()
            .find(|z| z.slot == slot)
            .map(|z| z.column_id)
    }

    /// Writes what the pointer is over into the session.
    ///
    /// A pointer outside every column clears both the target and the active
    /// column.
    pub fn track(&self, session: &DragSession, pointer: Point) {
        match self.zone_at(pointer) {
            Some(zone) => {
                let target = DropTarget {
                    column: zone.slot,
                    index: zone.index_at(pointer),
                };
                trace!(column = %zone.column_id, index = target.index, "pointer over column");
                session.update_target(Some(target));
                session.set_active_column(Some(zone.slot));
            }
            None => {
                session.update_target(None);
                session.set_active_column(None);
            }
        }
    }
}
