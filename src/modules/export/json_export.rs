//! JSON Export
//!
//! Writes the metric list to a JSON file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{format_target, Metric};

/// Exportable metric with its display form alongside the raw target
#[derive(Serialize)]
struct ExportableMetric<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    metric_type: &'static str,
    target: i64,
    target_display: String,
    description: &'a str,
}

impl<'a> From<&'a Metric> for ExportableMetric<'a> {
    fn from(metric: &'a Metric) -> Self {
        Self {
            id: &metric.id,
            title: &metric.title,
            metric_type: metric.metric_type.as_str(),
            target: metric.target,
            target_display: format_target(metric.target, metric.metric_type),
            description: &metric.description,
        }
    }
}

/// Write metrics to JSON file
pub fn write_metrics(path: &Path, metrics: &[Metric]) -> Result<usize> {
    let exportable: Vec<ExportableMetric> = metrics.iter().map(ExportableMetric::from).collect();

    let json = serde_json::to_string_pretty(&exportable)?;

    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    file.write_all(json.as_bytes())?;

    Ok(metrics.len())
}
