//! Metric list editor
//!
//! Serializes add/edit/delete requests through a single edit slot. A request
//! made while a row is open is parked behind it; the open row is then asked
//! to save and, once it does, the parked request runs. Deletions always pass
//! through a confirmation gate first.

pub mod deletion;
pub mod slot;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Metric, MetricType, MAX_METRICS};

pub use deletion::{DeleteGate, DeleteWarning, DELETE_CONFIRM_LABEL, DELETE_TITLE};
pub use slot::{EditSlot, PendingPolicy, PendingTask, SlotEffect};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("a playbook can hold at most {max} metrics")]
    ListFull { max: usize },
    #[error("metric {index} does not exist (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("a delete confirmation is waiting for an answer")]
    ConfirmationPending,
    #[error("busy: '{}' is already waiting on the open editor", .pending.describe())]
    Busy { pending: PendingTask },
    #[error("no metric is being edited")]
    NotEditing,
    #[error("no deletion is waiting for confirmation")]
    NothingToConfirm,
}

/// Immediate result of an add/edit/delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// An editor is now open on the affected row
    Applied,
    /// The confirmation prompt must be shown
    ConfirmDelete(DeleteWarning),
    /// Parked behind the open editor; ask it to save
    Queued { replaced: Option<PendingTask> },
}

/// What ran after the open editor closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Nothing,
    Ran {
        task: PendingTask,
        outcome: RequestOutcome,
    },
    /// The parked request no longer applies to the list
    Dropped(PendingTask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub index: usize,
    pub follow_up: FollowUp,
}

/// Anything that can be asked to hand over a finished metric
pub trait SaveRequest {
    type Error;

    fn try_save(&mut self) -> Result<Metric, Self::Error>;
}

#[derive(Debug)]
pub enum CloseOutcome<E> {
    Saved(SaveOutcome),
    Rejected {
        error: E,
        dropped: Option<PendingTask>,
    },
}

#[derive(Debug, Clone)]
pub struct MetricListEditor {
    metrics: Vec<Metric>,
    slot: EditSlot,
    gate: DeleteGate,
    policy: PendingPolicy,
    changes_made: bool,
}

impl MetricListEditor {
    pub fn new(metrics: Vec<Metric>, policy: PendingPolicy) -> Self {
        Self {
            metrics,
            slot: EditSlot::Idle,
            gate: DeleteGate::default(),
            policy,
            changes_made: false,
        }
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.metrics.len() >= MAX_METRICS
    }

    pub fn editing_index(&self) -> Option<usize> {
        self.slot.editing_index()
    }

    pub fn pending_task(&self) -> Option<PendingTask> {
        self.slot.pending()
    }

    pub fn pending_deletion(&self) -> Option<usize> {
        self.gate.pending()
    }

    pub fn policy(&self) -> PendingPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: PendingPolicy) {
        self.policy = policy;
    }

    pub fn changes_made(&self) -> bool {
        self.changes_made
    }

    pub fn mark_saved(&mut self) {
        self.changes_made = false;
    }

    /// Titles of every other metric, for the open form's uniqueness check
    pub fn other_titles(&self, index: usize) -> Vec<String> {
        self.metrics
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, m)| m.title.clone())
            .collect()
    }

    /// Warning to show for the row awaiting confirmation
    pub fn pending_warning(&self) -> Option<DeleteWarning> {
        self.gate
            .pending()
            .and_then(|index| self.metrics.get(index))
            .map(DeleteWarning::for_metric)
    }

    pub fn request_add(&mut self, metric_type: MetricType) -> Result<RequestOutcome, EditorError> {
        self.ensure_unblocked()?;
        if self.is_full() {
            return Err(EditorError::ListFull { max: MAX_METRICS });
        }
        self.submit(PendingTask::AddMetric(metric_type))
    }

    pub fn request_edit(&mut self, index: usize) -> Result<RequestOutcome, EditorError> {
        self.ensure_unblocked()?;
        self.ensure_index(index)?;
        self.submit(PendingTask::EditMetric(index))
    }

    pub fn request_delete(&mut self, index: usize) -> Result<RequestOutcome, EditorError> {
        self.ensure_unblocked()?;
        self.ensure_index(index)?;
        self.submit(PendingTask::DeleteMetric(index))
    }

    /// The open editor produced `metric`: store it, close, then run the
    /// parked request if there is one.
    pub fn on_editor_saved(&mut self, metric: Metric) -> Result<SaveOutcome, EditorError> {
        let index = self.slot.editing_index().ok_or(EditorError::NotEditing)?;
        self.ensure_index(index)?;

        self.metrics[index] = metric;
        self.changes_made = true;
        let (slot, pending) = self.slot.close();
        self.slot = slot;
        debug!(index, "metric saved");

        let follow_up = match pending {
            None => FollowUp::Nothing,
            Some(task) => self.drain(task),
        };
        Ok(SaveOutcome { index, follow_up })
    }

    /// The open editor was abandoned; the parked request goes with it.
    pub fn on_editor_cancelled(&mut self) -> Option<PendingTask> {
        let index = self.slot.editing_index();
        let (slot, dropped) = self.slot.close();
        self.slot = slot;
        debug!(?index, ?dropped, "edit cancelled");
        dropped
    }

    /// The open editor refused to save; it stays open, the parked request is
    /// discarded.
    pub fn on_save_failed(&mut self) -> Option<PendingTask> {
        let (slot, dropped) = self.slot.drop_pending();
        self.slot = slot;
        if let Some(task) = dropped {
            debug!(task = %task.describe(), "save failed, dropping queued request");
        }
        dropped
    }

    /// Ask the open editor to save and settle the slot with its answer.
    pub fn close_active<F: SaveRequest>(
        &mut self,
        form: &mut F,
    ) -> Result<CloseOutcome<F::Error>, EditorError> {
        if self.slot.is_idle() {
            return Err(EditorError::NotEditing);
        }
        match form.try_save() {
            Ok(metric) => self.on_editor_saved(metric).map(CloseOutcome::Saved),
            Err(error) => Ok(CloseOutcome::Rejected {
                error,
                dropped: self.on_save_failed(),
            }),
        }
    }

    pub fn confirm_delete(&mut self) -> Result<Metric, EditorError> {
        let index = self.gate.take().ok_or(EditorError::NothingToConfirm)?;
        self.ensure_index(index)?;

        let removed = self.metrics.remove(index);
        self.slot = self.slot.after_removal(index);
        self.changes_made = true;
        debug!(index, title = %removed.title, "metric deleted");
        Ok(removed)
    }

    pub fn cancel_delete(&mut self) -> bool {
        let cancelled = self.gate.take();
        debug!(?cancelled, "delete cancelled");
        cancelled.is_some()
    }

    /// Take the ids a successful write gave to never-persisted metrics.
    /// `saved` is the list as written, row for row. Returns how many were set.
    pub fn adopt_ids(&mut self, saved: &[Metric]) -> usize {
        let mut adopted = 0;
        for (metric, stored) in self.metrics.iter_mut().zip(saved) {
            if !metric.is_persisted() && stored.is_persisted() {
                metric.id = stored.id.clone();
                adopted += 1;
            }
        }
        adopted
    }

    fn submit(&mut self, task: PendingTask) -> Result<RequestOutcome, EditorError> {
        let (slot, effect) = self.slot.request(task, self.policy);
        self.slot = slot;
        match effect {
            SlotEffect::RunNow(task) => Ok(self.run(task)),
            SlotEffect::Queued { replaced } => {
                if let Some(previous) = replaced {
                    debug!(
                        replaced = %previous.describe(),
                        queued = %task.describe(),
                        "queued request replaced"
                    );
                } else {
                    debug!(queued = %task.describe(), "request queued behind open editor");
                }
                Ok(RequestOutcome::Queued { replaced })
            }
            SlotEffect::Busy { pending } => Err(EditorError::Busy { pending }),
        }
    }

    fn run(&mut self, task: PendingTask) -> RequestOutcome {
        match task {
            PendingTask::AddMetric(metric_type) => {
                let index = self.metrics.len();
                self.metrics.push(Metric::new(metric_type));
                self.changes_made = true;
                self.slot = self.slot.open(index);
                debug!(index, metric_type = metric_type.as_str(), "metric added");
                RequestOutcome::Applied
            }
            PendingTask::EditMetric(index) => {
                self.slot = self.slot.open(index);
                debug!(index, "editing metric");
                RequestOutcome::Applied
            }
            PendingTask::DeleteMetric(index) => {
                self.gate.open(index);
                debug!(index, "delete awaiting confirmation");
                RequestOutcome::ConfirmDelete(DeleteWarning::for_metric(&self.metrics[index]))
            }
        }
    }

    fn drain(&mut self, task: PendingTask) -> FollowUp {
        let applies = match task {
            PendingTask::AddMetric(_) => !self.is_full(),
            PendingTask::EditMetric(index) | PendingTask::DeleteMetric(index) => {
                index < self.metrics.len()
            }
        };
        if !applies {
            warn!(task = %task.describe(), "queued request no longer applies");
            return FollowUp::Dropped(task);
        }
        let outcome = self.run(task);
        FollowUp::Ran { task, outcome }
    }

    fn ensure_unblocked(&self) -> Result<(), EditorError> {
        if self.gate.is_open() {
            return Err(EditorError::ConfirmationPending);
        }
        Ok(())
    }

    fn ensure_index(&self, index: usize) -> Result<(), EditorError> {
        if index >= self.metrics.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.metrics.len(),
            });
        }
        Ok(())
    }
}
