//! Actions that modules can return to communicate with the app

use crate::domain::MetricType;
use crate::modules::export::ExportFormat;

/// Actions returned by modules and commands to communicate state changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// The open metric form wants to be saved
    Save,

    /// The open metric form abandons its edits
    Cancel,

    /// Open the metric type picker
    OpenAddMenu,

    /// Add a metric of the given type
    AddMetric(MetricType),

    /// Edit the metric at a row
    EditMetric(usize),

    /// Delete the metric at a row
    DeleteMetric(usize),

    /// Write the playbook back to its file
    WritePlaybook,

    /// Export the metric list
    Export(ExportFormat),

    /// Re-read the config file
    ReloadConfig,

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Open the help popup
    OpenHelp,

    /// Close current overlay/popup
    CloseOverlay,

    /// Request quit
    Quit,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}
