use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::core::{Action, Command, Context, Module, NotifyLevel};
use crate::domain::{MetricType, Playbook};
use crate::editor::{
    CloseOutcome, EditorError, FollowUp, MetricListEditor, PendingPolicy, RequestOutcome,
};
use crate::modules::export::{self, ExportFormat};
use crate::modules::{AddMenu, MetricForm};
use crate::store::{new_metric_id, PlaybookFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

#[derive(Debug)]
pub struct App {
    /// Shared context for modules
    pub ctx: Context,
    pub playbook_id: String,
    pub playbook_title: String,
    pub editor: MetricListEditor,
    /// Form for the row the editor has open
    pub form: Option<MetricForm>,
    pub add_menu: Option<AddMenu>,
    pub selected: usize,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub status: Option<StatusMessage>,
    pub store: Option<PlaybookFile>,
    pub export_dir: PathBuf,
    pub help_open: bool,
    pub should_quit: bool,
    quit_armed: bool,
}

impl App {
    pub fn new(playbook: Playbook, policy: PendingPolicy) -> Self {
        let mut app = Self {
            ctx: Context::new(),
            playbook_id: playbook.id,
            playbook_title: playbook.title,
            editor: MetricListEditor::new(playbook.metrics, policy),
            form: None,
            add_menu: None,
            selected: 0,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            status: None,
            store: None,
            export_dir: PathBuf::from("exports"),
            help_open: false,
            should_quit: false,
            quit_armed: false,
        };
        app.sync_context();
        app
    }

    pub fn with_store(mut self, store: PlaybookFile) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// Sync context with app state
    pub fn sync_context(&mut self) {
        self.ctx.metric_count = self.editor.len();
        self.ctx.editing = self.editor.editing_index();
        self.ctx.changes_made = self.editor.changes_made();
    }

    pub fn playbook(&self) -> Playbook {
        Playbook {
            id: self.playbook_id.clone(),
            title: self.playbook_title.clone(),
            metrics: self.editor.metrics().to_vec(),
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        self.form.is_some()
    }

    pub fn is_confirming(&self) -> bool {
        self.editor.pending_deletion().is_some()
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if self.selected + 1 < self.editor.len() {
            self.selected += 1;
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.editor.len().saturating_sub(1));
    }

    /// Bring the form in line with the editor's edit slot
    fn settle(&mut self) {
        match self.editor.editing_index() {
            None => self.form = None,
            Some(index) => {
                let stale = self.form.as_ref().map_or(true, |form| form.index() != index);
                if stale {
                    let metric = &self.editor.metrics()[index];
                    self.form = Some(MetricForm::new(
                        index,
                        metric,
                        self.editor.other_titles(index),
                    ));
                    self.selected = index;
                }
            }
        }
        self.clamp_selection();
        self.sync_context();
    }

    pub fn open_add_menu(&mut self) {
        if !self.ctx.can_add() {
            self.set_status(
                EditorError::ListFull {
                    max: crate::domain::MAX_METRICS,
                }
                .to_string(),
                StatusLevel::Warn,
            );
            return;
        }
        self.add_menu = Some(AddMenu::new());
    }

    pub fn request_add(&mut self, metric_type: MetricType) {
        self.add_menu = None;
        let result = self.editor.request_add(metric_type);
        self.after_request(result);
    }

    pub fn request_edit(&mut self, index: usize) {
        let result = self.editor.request_edit(index);
        self.after_request(result);
    }

    pub fn request_delete(&mut self, index: usize) {
        let result = self.editor.request_delete(index);
        self.after_request(result);
    }

    fn after_request(&mut self, result: Result<RequestOutcome, EditorError>) {
        match result {
            Ok(RequestOutcome::Applied) | Ok(RequestOutcome::ConfirmDelete(_)) => {}
            Ok(RequestOutcome::Queued { replaced }) => {
                let closed = self.close_active_form();
                if let (true, Some(previous)) = (closed, replaced) {
                    self.set_status(
                        format!("Replaced queued request: {}", previous.describe()),
                        StatusLevel::Warn,
                    );
                }
            }
            Err(err) => self.set_status(err.to_string(), StatusLevel::Warn),
        }
        self.settle();
    }

    /// Ask the open form to save. Returns whether the row closed.
    pub fn close_active_form(&mut self) -> bool {
        let Some(mut form) = self.form.take() else {
            return false;
        };
        let closed = match self.editor.close_active(&mut form) {
            Ok(CloseOutcome::Saved(outcome)) => {
                self.report_follow_up(outcome.follow_up);
                true
            }
            Ok(CloseOutcome::Rejected { error, dropped }) => {
                let mut text = error.to_string();
                if let Some(task) = dropped {
                    text.push_str(&format!(" (discarded: {})", task.describe()));
                }
                self.set_status(text, StatusLevel::Error);
                self.form = Some(form);
                false
            }
            Err(err) => {
                warn!(%err, "form open without an edit session");
                false
            }
        };
        self.settle();
        closed
    }

    fn report_follow_up(&mut self, follow_up: FollowUp) {
        match follow_up {
            FollowUp::Nothing | FollowUp::Ran { .. } => {
                self.set_status("Metric saved", StatusLevel::Info)
            }
            FollowUp::Dropped(task) => self.set_status(
                format!("Metric saved; skipped {}", task.describe()),
                StatusLevel::Warn,
            ),
        }
    }

    pub fn save_form(&mut self) {
        self.close_active_form();
    }

    pub fn cancel_form(&mut self) {
        if self.form.take().is_none() {
            return;
        }
        let dropped = self.editor.on_editor_cancelled();
        let text = match dropped {
            Some(task) => format!("Edit cancelled (discarded: {})", task.describe()),
            None => "Edit cancelled".to_string(),
        };
        self.set_status(text, StatusLevel::Info);
        self.settle();
    }

    pub fn confirm_delete(&mut self) {
        match self.editor.confirm_delete() {
            Ok(removed) => {
                let title = if removed.title.is_empty() {
                    "untitled metric".to_string()
                } else {
                    removed.title
                };
                self.set_status(format!("Deleted {title}"), StatusLevel::Info);
            }
            Err(err) => self.set_status(err.to_string(), StatusLevel::Warn),
        }
        self.settle();
    }

    pub fn cancel_delete(&mut self) {
        self.editor.cancel_delete();
        self.settle();
    }

    /// Persist the playbook, closing the open form first
    pub fn write_playbook(&mut self) {
        if self.is_editing() && !self.close_active_form() {
            self.set_status(
                "Fix or cancel the open metric before saving",
                StatusLevel::Error,
            );
            return;
        }
        let Some(store) = self.store.clone() else {
            self.set_status("No playbook file to save to", StatusLevel::Error);
            return;
        };

        // Ids reach the live list only once the write has succeeded.
        let mut playbook = self.playbook();
        let assigned = playbook.assign_missing_ids(new_metric_id);
        match store.save(&playbook) {
            Ok(()) => {
                self.editor.adopt_ids(&playbook.metrics);
                self.editor.mark_saved();
                self.quit_armed = false;
                info!(assigned, path = %store.path().display(), "playbook written");
                self.set_status(
                    format!(
                        "Saved {} metrics to {}",
                        playbook.metrics.len(),
                        store.path().display()
                    ),
                    StatusLevel::Info,
                );
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "playbook write failed");
                self.set_status(format!("Save failed: {err:#}"), StatusLevel::Error);
            }
        }
        self.sync_context();
    }

    pub fn export(&mut self, format: ExportFormat) {
        let action = export::export_metrics(&self.export_dir, self.editor.metrics(), format);
        self.apply_action(action);
    }

    pub fn reload_config(&mut self) {
        match crate::config::load() {
            Ok(config) => {
                self.editor.set_policy(config.pending_policy);
                self.export_dir = config.export_dir();
                self.set_status(
                    format!("Reloaded config: pending policy {:?}", config.pending_policy),
                    StatusLevel::Info,
                );
            }
            Err(err) => self.set_status(format!("Config error: {err:#}"), StatusLevel::Error),
        }
    }

    /// Quit, asking once for confirmation when there are unsaved changes
    pub fn request_quit(&mut self) {
        if self.editor.changes_made() && !self.quit_armed {
            self.quit_armed = true;
            self.set_status(
                "Unsaved changes: q again to quit, w to save",
                StatusLevel::Warn,
            );
            return;
        }
        self.should_quit = true;
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    /// Put the previous command back on the command line
    pub fn recall_last_command(&mut self) {
        if let Some(last) = self.command.last.as_ref() {
            self.command.input = last.clone();
        }
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }

        let cmd = crate::core::parse_command(&input);
        self.command.last = Some(input);
        self.exit_command();
        let action = self.execute_command(&cmd);
        self.apply_action(action);
    }

    /// Forward a key to the open form
    pub fn handle_form_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let action = form.handle_key(key, &self.ctx);
        self.apply_action(action);
    }

    /// Forward a key to the add menu
    pub fn handle_add_menu_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some(menu) = self.add_menu.as_mut() else {
            return;
        };
        let action = menu.handle_key(key, &self.ctx);
        self.apply_action(action);
    }
}

impl App {
    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Add(None) => Action::OpenAddMenu,
            Command::Add(Some(metric_type)) => Action::AddMetric(*metric_type),
            Command::Edit(index) => Action::EditMetric(*index),
            Command::Delete(index) => Action::DeleteMetric(*index),
            Command::Write => Action::WritePlaybook,
            Command::Export(format) => Action::Export(*format),
            Command::Reload => Action::ReloadConfig,
            Command::Help => Action::OpenHelp,
            Command::Quit => Action::Quit,
            Command::Unknown(s) => {
                Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn)
            }
        }
    }

    /// Apply an action returned by a command or module
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Save => self.save_form(),
            Action::Cancel => self.cancel_form(),
            Action::OpenAddMenu => self.open_add_menu(),
            Action::AddMetric(metric_type) => self.request_add(metric_type),
            Action::EditMetric(index) => self.request_edit(index),
            Action::DeleteMetric(index) => self.request_delete(index),
            Action::WritePlaybook => self.write_playbook(),
            Action::Export(format) => self.export(format),
            Action::ReloadConfig => self.reload_config(),
            Action::Notify(msg, level) => self.set_status(msg, level.into()),
            Action::OpenHelp => self.help_open = true,
            Action::CloseOverlay => {
                self.add_menu = None;
                self.help_open = false;
            }
            Action::Quit => self.request_quit(),
        }
    }
}
