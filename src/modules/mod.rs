//! UI Modules
//!
//! Interactive pieces that take key input and answer with an Action:
//! - metric_form: inline editor for the open metric row
//! - add_menu: metric type picker
//! - export: CSV/JSON export of the metric list

pub mod add_menu;
pub mod export;
pub mod metric_form;

pub use add_menu::AddMenu;
pub use metric_form::{FormError, FormField, MetricForm};
