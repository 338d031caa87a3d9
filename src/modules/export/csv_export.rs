//! CSV Export
//!
//! Writes the metric list to a CSV file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::{format_target, Metric};

/// Write metrics to CSV file
pub fn write_metrics(path: &Path, metrics: &[Metric]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;

    // Write header
    wtr.write_record([
        "id",
        "title",
        "type",
        "target",
        "target_display",
        "description",
    ])?;

    // Write data rows
    for metric in metrics {
        wtr.write_record([
            metric.id.clone(),
            metric.title.clone(),
            metric.metric_type.as_str().to_string(),
            metric.target.to_string(),
            format_target(metric.target, metric.metric_type),
            metric.description.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(metrics.len())
}
