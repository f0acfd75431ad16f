//! WIP limit enforcement for columns.

use crate::domain::board::Column;
use crate::error::{CadenceError, Result};
use serde::Serialize;

/// Outcome of a capacity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CapacityDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn reject(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// How full a column is, for header badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnLoad {
    Unlimited,
    Normal,
    NearCapacity,
    AtCapacity,
}

/// Decides whether a column may take one more task.
///
/// The count passed in must be read at the same logical instant as the
/// check; a stale count lets two concurrent creations both pass.
pub struct CapacityGuard;

impl CapacityGuard {
    /// Fraction of the limit at which a column is reported as nearly full
    const NEAR_CAPACITY_RATIO: f64 = 0.8;

    pub fn can_accept(column: &Column, current_task_count: usize) -> CapacityDecision {
        match column.limit {
            None => CapacityDecision::allow(),
            Some(limit) if current_task_count < limit as usize => CapacityDecision::allow(),
            Some(limit) => CapacityDecision::reject(format!(
                "Column '{}' is at capacity ({} tasks)",
                column.name, limit
            )),
        }
    }

    /// [`Self::can_accept`] as an error, for stores that stop on rejection
    pub fn ensure_room(column: &Column, current_task_count: usize) -> Result<()> {
        let decision = Self::can_accept(column, current_task_count);
        if decision.allowed {
            return Ok(());
        }
        Err(CadenceError::CapacityExceeded {
            message: decision.reason.unwrap_or_default(),
        })
    }

    pub fn load(column: &Column, current_task_count: usize) -> ColumnLoad {
        match column.limit {
            None => ColumnLoad::Unlimited,
            Some(limit) if current_task_count >= limit as usize => ColumnLoad::AtCapacity,
            Some(limit) if current_task_count as f64 >= limit as f64 * Self::NEAR_CAPACITY_RATIO => {
                ColumnLoad::NearCapacity
            }
            Some(_) => ColumnLoad::Normal,
        }
    }
}
