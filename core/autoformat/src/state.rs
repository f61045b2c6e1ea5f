//! Mutable scheduler state shared by the router, the gate, and the executor.

use chrono::{DateTime, Utc};

use crate::pending::PendingSet;

#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub pending: PendingSet,
    /// Nesting depth of compiling builds currently running.
    pub build_depth: u32,
    pub is_reformatting: bool,
    pub solution_active: bool,
    /// Start of the most recent batch pass; `None` until the first pass.
    pub last_reformat_at: Option<DateTime<Utc>>,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_building(&self) -> bool {
        self.build_depth > 0
    }
}
