use super::session::Slot;
use crate::domain::{BoardSnapshot, ColumnId, TaskId};
use std::collections::HashMap;

/// Interns the ids of one board view into session slots.
///
/// Tasks and columns have separate slot spaces. Rebuild when the snapshot
/// gains tasks or columns.
#[derive(Debug, Clone, Default)]
pub struct BoardSlots {
    tasks: Vec<TaskId>,
    columns: Vec<ColumnId>,
    task_slots: HashMap<TaskId, Slot>,
    column_slots: HashMap<ColumnId, Slot>,
}

impl BoardSlots {
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        let mut slots = Self::default();
        for column in &snapshot.columns {
            slots.intern_column(column.id);
        }
        for task in &snapshot.tasks {
            slots.intern_task(task.id);
        }
        slots
    }

    pub fn intern_task(&mut self, id: TaskId) -> Option<Slot> {
        if let Some(slot) = self.task_slots.get(&id) {
            return Some(*slot);
        }
        let slot = slot_at(self.tasks.len())?;
        self.tasks.push(id);
        self.task_slots.insert(id, slot);
        Some(slot)
    }

    pub fn intern_column(&mut self, id: ColumnId) -> Option<Slot> {
        if let Some(slot) = self.column_slots.get(&id) {
            return Some(*slot);
        }
        let slot = slot_at(self.columns.len())?;
        self.columns.push(id);
        self.column_slots.insert(id, slot);
        Some(slot)
    }

    pub fn task_slot(&self, id: &TaskId) -> Option<Slot> {
        self.task_slots.get(id).copied()
    }

    pub fn column_slot(&self, id: &ColumnId) -> Option<Slot> {
        self.column_slots.get(id).copied()
    }

    pub fn task_id(&self, slot: Slot) -> Option<TaskId> {
        self.tasks.get(slot.get() as usize - 1).copied()
    }

    pub fn column_id(&self, slot: Slot) -> Option<ColumnId> {
        self.columns.get(slot.get() as usize - 1).copied()
    }
}

fn slot_at(index: usize) -> Option<Slot> {
    u32::try_from(index + 1).ok().and_then(Slot::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_stable_and_reversible() {
        let mut slots = BoardSlots::default();
        let a = TaskId::new();
        let b = TaskId::new();
        let column = ColumnId::new();

        let slot_a = slots.intern_task(a).unwrap();
        let slot_b = slots.intern_task(b).unwrap();
        assert_ne!(slot_a, slot_b);
        assert_eq!(slots.intern_task(a), Some(slot_a));
        assert_eq!(slots.task_id(slot_b), Some(b));

        let column_slot = slots.intern_column(column).unwrap();
        assert_eq!(column_slot.get(), 1);
        assert_eq!(slots.column_id(column_slot), Some(column));
        assert_eq!(slots.column_slot(&ColumnId::new()), None);
    }
}
