//! Export Module
//!
//! Writes the metric list to the export directory.
//!
//! - `:export csv` → one row per metric
//! - `:export json` → array of metric objects
//! - Files are timestamped; a numeric suffix keeps exports made within the
//!   same second apart

mod csv_export;
mod json_export;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::core::{Action, NotifyLevel};
use crate::domain::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

/// First path under `dir` for `filename` that does not exist yet
fn unused_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, extension) = filename.rsplit_once('.').unwrap_or((filename, ""));
    (1u32..)
        .map(|n| dir.join(format!("{stem}-{n}.{extension}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Write `metrics` into `export_dir`, returning the file written
pub fn write_export(export_dir: &Path, metrics: &[Metric], format: ExportFormat) -> Result<PathBuf> {
    fs::create_dir_all(export_dir)
        .with_context(|| format!("create export directory {}", export_dir.display()))?;

    let path = unused_path(export_dir, &generate_filename("metrics", format.extension()));
    match format {
        ExportFormat::Csv => csv_export::write_metrics(&path, metrics)?,
        ExportFormat::Json => json_export::write_metrics(&path, metrics)?,
    };
    tracing::info!(path = %path.display(), count = metrics.len(), "exported metrics");
    Ok(path)
}

/// Export the metric list and report the result as a notification
pub fn export_metrics(export_dir: &Path, metrics: &[Metric], format: ExportFormat) -> Action {
    if metrics.is_empty() {
        return Action::Notify("No metrics to export".to_string(), NotifyLevel::Warn);
    }

    match write_export(export_dir, metrics, format) {
        Ok(path) => Action::Notify(
            format!("Exported {} metrics to {}", metrics.len(), path.display()),
            NotifyLevel::Info,
        ),
        Err(e) => Action::Notify(format!("Export failed: {:#}", e), NotifyLevel::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricType;

    fn sample() -> Vec<Metric> {
        vec![
            Metric {
                id: "a1".to_string(),
                title: "Time to acknowledge".to_string(),
                description: "First response".to_string(),
                metric_type: MetricType::Duration,
                target: 90_000_000,
            },
            Metric {
                title: "Cost, total".to_string(),
                target: 1200,
                ..Metric::new(MetricType::Currency)
            },
        ]
    }

    #[test]
    fn test_csv_export_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), &sample(), ExportFormat::Csv).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("csv"));

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,title,type,target,target_display,description");
        assert_eq!(
            lines[1],
            "a1,Time to acknowledge,duration,90000000,01:01:00,First response"
        );
        assert_eq!(lines[2], ",\"Cost, total\",currency,1200,1200,");
    }

    #[test]
    fn test_json_export_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), &sample(), ExportFormat::Json).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["target_display"], "01:01:00");
        assert_eq!(items[1]["type"], "currency");
        assert_eq!(items[1]["description"], "");
    }

    #[test]
    fn test_repeated_exports_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..3)
            .map(|_| write_export(dir.path(), &sample(), ExportFormat::Csv).unwrap())
            .collect();
        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[1], paths[2]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_unused_path_adds_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("metrics-x.csv"), "").unwrap();
        fs::write(dir.path().join("metrics-x-1.csv"), "").unwrap();
        assert_eq!(
            unused_path(dir.path(), "metrics-x.csv"),
            dir.path().join("metrics-x-2.csv")
        );
        assert_eq!(
            unused_path(dir.path(), "metrics-y.csv"),
            dir.path().join("metrics-y.csv")
        );
    }

    #[test]
    fn test_empty_list_is_not_exported() {
        let dir = tempfile::tempdir().unwrap();
        let action = export_metrics(dir.path(), &[], ExportFormat::Csv);
        assert!(matches!(action, Action::Notify(_, NotifyLevel::Warn)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
