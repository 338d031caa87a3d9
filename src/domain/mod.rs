pub mod metric;
pub mod target;

pub use metric::{Metric, MetricType, Playbook, MAX_METRICS};
pub use target::{format_target, parse_target, validate_target, TargetError};
