pub mod playbook_file;

pub use playbook_file::{new_metric_id, PlaybookFile};
