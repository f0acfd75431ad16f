use crate::domain::board::Column;
use crate::domain::task::Task;
use std::cmp::Ordering;

/// Sorts columns by position, breaking ties by id so the order is stable
/// across reloads.
pub fn sort_columns(columns: &mut [Column]) {
    columns.sort_by(compare_columns);
}

/// Sorts tasks by their rank within a column
///
/// Ties fall back to the task number, which follows creation order.
///
/// # Examples
/// ```
/// use cadence_core::domain::{sort_tasks, ColumnId, NewTask, Task, TaskCreate, TaskIdentifier};
///
/// let column = ColumnId::new();
/// let make = |n: u32, position: i32| {
///     Task::from_new(NewTask::new(
///         TaskCreate::new(column, format!("Task {n}")),
///         TaskIdentifier::compose("ABC", n),
///         position,
///     ))
/// };
///
/// let mut tasks = vec![make(1, 2), make(2, 0), make(3, 1)];
/// sort_tasks(&mut tasks);
/// assert_eq!(tasks[0].slug, "ABC-002");
/// assert_eq!(tasks[2].slug, "ABC-001");
/// ```
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

/// Position for a task appended to the end of a column.
///
/// Equals the task count while positions are contiguous and stays above the
/// current maximum when earlier moves left holes, so ranks remain unique.
pub fn append_position<I>(positions: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    let mut count: i32 = 0;
    let mut max: Option<i32> = None;
    for position in positions {
        count += 1;
        max = Some(max.map_or(position, |m| m.max(position)));
    }
    match max {
        Some(max) => count.max(max + 1),
        None => 0,
    }
}

fn compare_columns(a: &Column, b: &Column) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.id.cmp(&b.id))
}

pub(crate) fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.task_number.cmp(&b.task_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{BoardId, ColumnId};
    use crate::domain::task::{NewTask, TaskCreate, TaskIdentifier};

    fn task(number: u32, position: i32) -> Task {
        Task::from_new(NewTask::new(
            TaskCreate::new(ColumnId::new(), format!("Task {}", number)),
            TaskIdentifier::compose("ORD", number),
            position,
        ))
    }

    #[test]
    fn test_append_position_empty_column() {
        assert_eq!(append_position(Vec::<i32>::new()), 0);
    }

    #[test]
    fn test_append_position_contiguous_equals_count() {
        assert_eq!(append_position(vec![0, 1, 2]), 3);
    }

    #[test]
    fn test_append_position_with_holes_stays_unique() {
        // Task at position 1 was moved away, leaving 0 and 2
        assert_eq!(append_position(vec![0, 2]), 3);
        assert_eq!(append_position(vec![7]), 8);
    }

    #[test]
    fn test_sort_tasks_ties_broken_by_number() {
        let mut tasks = vec![task(3, 1), task(2, 1), task(1, 0)];
        sort_tasks(&mut tasks);
        assert_eq!(tasks[0].slug, "ORD-001");
        assert_eq!(tasks[1].slug, "ORD-002");
        assert_eq!(tasks[2].slug, "ORD-003");
    }

    #[test]
    fn test_sort_columns_by_position() {
        let board = BoardId::new();
        let mut columns = vec![
            Column::new(board, "Done".to_string(), 2),
            Column::new(board, "Todo".to_string(), 0),
            Column::new(board, "Doing".to_string(), 1),
        ];
        sort_columns(&mut columns);
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Todo", "Doing", "Done"]);
    }
}
