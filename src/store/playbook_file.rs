use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use crate::domain::{Playbook, MAX_METRICS};

/// A playbook kept as a JSON document on disk
#[derive(Debug, Clone)]
pub struct PlaybookFile {
    path: PathBuf,
}

impl PlaybookFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the playbook. A missing file is a new, empty playbook named
    /// after the file.
    pub fn load(&self) -> Result<Playbook> {
        if !self.path.exists() {
            let title = self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::info!(path = %self.path.display(), "starting new playbook");
            return Ok(Playbook::new(title));
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("read playbook {}", self.path.display()))?;
        let playbook: Playbook = serde_json::from_str(&content)
            .with_context(|| format!("parse playbook {}", self.path.display()))?;
        if playbook.metrics.len() > MAX_METRICS {
            bail!(
                "playbook {} has {} metrics, at most {} are supported",
                self.path.display(),
                playbook.metrics.len(),
                MAX_METRICS
            );
        }
        tracing::info!(
            path = %self.path.display(),
            metrics = playbook.metrics.len(),
            "loaded playbook"
        );
        Ok(playbook)
    }

    /// Write the playbook, replacing the file in one rename
    pub fn save(&self, playbook: &Playbook) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(playbook)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace {}", self.path.display()))?;
        tracing::info!(
            path = %self.path.display(),
            metrics = playbook.metrics.len(),
            "saved playbook"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Fresh id for a metric that is being persisted for the first time
pub fn new_metric_id() -> String {
    Uuid::new_v4().to_string()
}
