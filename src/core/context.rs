//! Shared context passed to modules

use crate::domain::MAX_METRICS;

/// Snapshot of list state that modules may consult
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Number of metrics currently in the list
    pub metric_count: usize,

    /// Row with an open editor, if any
    pub editing: Option<usize>,

    /// Whether the list differs from what was last written
    pub changes_made: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another metric fits in the list
    pub fn can_add(&self) -> bool {
        self.metric_count < MAX_METRICS
    }
}
