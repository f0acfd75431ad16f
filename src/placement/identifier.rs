//! Project slug and task identifier allocation.

use crate::clock::{Clock, SystemClock};
use crate::domain::{ProjectId, TaskIdentifier};
use crate::error::{CadenceError, Result};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shortest slug ever handed out
const MIN_SLUG_LEN: usize = 3;
/// Base-36 digits taken from the timestamp on the fallback path
const FALLBACK_SUFFIX_LEN: usize = 3;

/// Hands out project slugs and per-project task numbers
#[derive(Clone)]
pub struct IdentifierAllocator {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl IdentifierAllocator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Derives a unique slug from a project name.
    ///
    /// Tries the first 3, 4, ... letters of the name until one is free. When
    /// every prefix is taken the result is the first three letters plus the
    /// last three base-36 digits of the current timestamp. That fallback is
    /// not checked against existing slugs, so two exhausted names created in
    /// the same timestamp bucket can collide.
    pub async fn allocate_project_slug(&self, name: &str) -> Result<String> {
        let letters = slug_letters(name);
        if letters.is_empty() {
            return Err(CadenceError::InvalidProjectName);
        }

        for length in MIN_SLUG_LEN..=letters.len() {
            let candidate = &letters[..length];
            if self.storage.find_project_by_slug(candidate).await?.is_none() {
                debug!(slug = candidate, "allocated project slug");
                return Ok(candidate.to_string());
            }
            debug!(slug = candidate, "project slug taken");
        }

        let millis = self.clock.now().timestamp_millis().max(0) as u64;
        let encoded = to_base36(millis);
        let suffix = &encoded[encoded.len().saturating_sub(FALLBACK_SUFFIX_LEN)..];
        let prefix = &letters[..letters.len().min(MIN_SLUG_LEN)];
        let slug = format!("{}{}", prefix, suffix).to_uppercase();
        warn!(slug = %slug, "every slug prefix taken, using timestamp fallback");
        Ok(slug)
    }

    /// Consumes the next task number of a project.
    ///
    /// This is the only path that advances the counter. Numbers are never
    /// handed back, even if the task that consumed one is never created.
    pub async fn allocate_task_identifier(&self, project_id: &ProjectId) -> Result<TaskIdentifier> {
        let tick = self.storage.increment_project_counter(project_id).await?;
        Ok(TaskIdentifier::compose(&tick.project_slug, tick.task_number))
    }
}

/// ASCII letters of the name, uppercased
pub fn slug_letters(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
