//! Single edit slot with one deferred follow-up request

use serde::Deserialize;

use crate::domain::MetricType;

/// A user request held back until the open editor resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingTask {
    AddMetric(MetricType),
    EditMetric(usize),
    DeleteMetric(usize),
}

impl PendingTask {
    pub fn describe(&self) -> String {
        match self {
            PendingTask::AddMetric(metric_type) => format!("add {} metric", metric_type.as_str()),
            PendingTask::EditMetric(index) => format!("edit metric {}", index + 1),
            PendingTask::DeleteMetric(index) => format!("delete metric {}", index + 1),
        }
    }
}

/// What happens when a request arrives while another one is already queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingPolicy {
    /// Latest request wins
    #[default]
    Replace,
    /// Refuse the new request until the queued one resolves
    Reject,
}

impl PendingPolicy {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "replace" | "overwrite" => Some(PendingPolicy::Replace),
            "reject" | "busy" => Some(PendingPolicy::Reject),
            _ => None,
        }
    }
}

/// State of the edit slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditSlot {
    #[default]
    Idle,
    Editing {
        index: usize,
        pending: Option<PendingTask>,
    },
}

/// Result of routing a request through the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEffect {
    /// Nothing blocks the request; perform it now
    RunNow(PendingTask),
    /// Parked behind the open editor, possibly displacing an older request
    Queued { replaced: Option<PendingTask> },
    /// A request is already parked and the policy refuses another
    Busy { pending: PendingTask },
}

impl EditSlot {
    pub fn editing_index(&self) -> Option<usize> {
        match self {
            EditSlot::Idle => None,
            EditSlot::Editing { index, .. } => Some(*index),
        }
    }

    pub fn pending(&self) -> Option<PendingTask> {
        match self {
            EditSlot::Idle => None,
            EditSlot::Editing { pending, .. } => *pending,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditSlot::Idle)
    }

    /// Route a request. Deleting the row that is open is never deferred.
    pub fn request(self, task: PendingTask, policy: PendingPolicy) -> (EditSlot, SlotEffect) {
        match self {
            EditSlot::Idle => (self, SlotEffect::RunNow(task)),
            EditSlot::Editing { index, .. } if task == PendingTask::DeleteMetric(index) => {
                (self, SlotEffect::RunNow(task))
            }
            EditSlot::Editing { index, pending: None } => (
                EditSlot::Editing {
                    index,
                    pending: Some(task),
                },
                SlotEffect::Queued { replaced: None },
            ),
            EditSlot::Editing {
                index,
                pending: Some(previous),
            } => match policy {
                PendingPolicy::Replace => (
                    EditSlot::Editing {
                        index,
                        pending: Some(task),
                    },
                    SlotEffect::Queued {
                        replaced: Some(previous),
                    },
                ),
                PendingPolicy::Reject => (self, SlotEffect::Busy { pending: previous }),
            },
        }
    }

    /// Open an editor on `index`. Any state it replaces is dropped.
    pub fn open(self, index: usize) -> EditSlot {
        EditSlot::Editing {
            index,
            pending: None,
        }
    }

    /// Close the editor and hand back the queued request, if any
    pub fn close(self) -> (EditSlot, Option<PendingTask>) {
        (EditSlot::Idle, self.pending())
    }

    /// Keep the editor open but forget the queued request
    pub fn drop_pending(self) -> (EditSlot, Option<PendingTask>) {
        match self {
            EditSlot::Idle => (EditSlot::Idle, None),
            EditSlot::Editing { index, pending } => (
                EditSlot::Editing {
                    index,
                    pending: None,
                },
                pending,
            ),
        }
    }

    /// Close the editor if its row was the one removed. The gate only opens
    /// while the slot is idle or open on the deleted row, so no other index
    /// needs adjusting.
    pub fn after_removal(self, removed: usize) -> EditSlot {
        match self {
            EditSlot::Editing { index, .. } if index == removed => EditSlot::Idle,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing(index: usize, pending: Option<PendingTask>) -> EditSlot {
        EditSlot::Editing { index, pending }
    }

    #[test]
    fn test_idle_runs_everything_now() {
        let task = PendingTask::EditMetric(1);
        let (slot, effect) = EditSlot::Idle.request(task, PendingPolicy::Replace);
        assert_eq!(slot, EditSlot::Idle);
        assert_eq!(effect, SlotEffect::RunNow(task));
    }

    #[test]
    fn test_editing_queues_request() {
        let task = PendingTask::AddMetric(MetricType::Integer);
        let (slot, effect) = editing(2, None).request(task, PendingPolicy::Replace);
        assert_eq!(slot, editing(2, Some(task)));
        assert_eq!(effect, SlotEffect::Queued { replaced: None });
    }

    #[test]
    fn test_delete_of_open_row_is_not_deferred() {
        let task = PendingTask::DeleteMetric(1);
        let (slot, effect) = editing(1, None).request(task, PendingPolicy::Replace);
        assert_eq!(slot, editing(1, None));
        assert_eq!(effect, SlotEffect::RunNow(task));
    }

    #[test]
    fn test_replace_policy_overwrites_queued_task() {
        let first = PendingTask::EditMetric(0);
        let second = PendingTask::DeleteMetric(3);
        let (slot, effect) = editing(1, Some(first)).request(second, PendingPolicy::Replace);
        assert_eq!(slot.pending(), Some(second));
        assert_eq!(
            effect,
            SlotEffect::Queued {
                replaced: Some(first)
            }
        );
    }

    #[test]
    fn test_reject_policy_keeps_queued_task() {
        let first = PendingTask::EditMetric(0);
        let second = PendingTask::DeleteMetric(3);
        let (slot, effect) = editing(1, Some(first)).request(second, PendingPolicy::Reject);
        assert_eq!(slot.pending(), Some(first));
        assert_eq!(effect, SlotEffect::Busy { pending: first });
    }

    #[test]
    fn test_close_hands_back_pending() {
        let task = PendingTask::EditMetric(0);
        let (slot, pending) = editing(1, Some(task)).close();
        assert!(slot.is_idle());
        assert_eq!(pending, Some(task));
    }

    #[test]
    fn test_drop_pending_keeps_editor_open() {
        let (slot, dropped) = editing(1, Some(PendingTask::EditMetric(0))).drop_pending();
        assert_eq!(slot, editing(1, None));
        assert_eq!(dropped, Some(PendingTask::EditMetric(0)));
    }

    #[test]
    fn test_after_removal_closes_only_the_removed_row() {
        assert_eq!(editing(1, None).after_removal(1), EditSlot::Idle);
        assert_eq!(
            editing(1, Some(PendingTask::EditMetric(0))).after_removal(1),
            EditSlot::Idle
        );
        assert_eq!(EditSlot::Idle.after_removal(0), EditSlot::Idle);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(PendingPolicy::parse("Replace"), Some(PendingPolicy::Replace));
        assert_eq!(PendingPolicy::parse("reject"), Some(PendingPolicy::Reject));
        assert_eq!(PendingPolicy::parse("queue"), None);
    }
}
