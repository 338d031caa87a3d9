//! Confirmation step in front of metric deletion

use crate::domain::Metric;

pub const DELETE_TITLE: &str = "Are you sure you want to delete?";
pub const DELETE_CONFIRM_LABEL: &str = "Delete metric";

const DRAFT_MESSAGE: &str =
    "If you delete this metric, the values for it will not be collected for any future runs.";
const HISTORY_NOTE: &str = "You will still be able to access historical data for this metric.";

/// Which warning the confirmation prompt shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteWarning {
    /// Metric was never persisted
    Draft,
    /// Metric has an id, so collected history survives deletion
    Persisted,
}

impl DeleteWarning {
    pub fn for_metric(metric: &Metric) -> Self {
        if metric.is_persisted() {
            DeleteWarning::Persisted
        } else {
            DeleteWarning::Draft
        }
    }

    pub fn message(&self) -> String {
        match self {
            DeleteWarning::Draft => DRAFT_MESSAGE.to_string(),
            DeleteWarning::Persisted => format!("{DRAFT_MESSAGE} {HISTORY_NOTE}"),
        }
    }
}

/// Holds the row awaiting confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteGate {
    pending: Option<usize>,
}

impl DeleteGate {
    pub fn open(&mut self, index: usize) {
        self.pending = Some(index);
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take(&mut self) -> Option<usize> {
        self.pending.take()
    }
}
