//! Admission and output policy for submitted logs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Policy knobs for the ingestion pipeline.
///
/// Every field ships with the product default and can be overridden from a
/// TOML file via [`Policy::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Largest decompressed archive entry we will hand to the analyzer.
    #[serde(default = "default_max_entry_size")]
    pub max_entry_size: u64,
    /// Upper bound on artifacts produced for one archive submission.
    #[serde(default = "default_max_artifacts")]
    pub max_artifacts: usize,
    /// Extension a log file must carry, both standalone and inside archives.
    #[serde(default = "default_log_extension")]
    pub log_extension: String,
    /// Extension an archive submission must carry.
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,
    /// Labels that mark a log as a failure and color its artifact as alert.
    #[serde(default = "default_alert_labels")]
    pub alert_labels: Vec<String>,
}

fn default_max_entry_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_artifacts() -> usize {
    3
}

fn default_log_extension() -> String {
    ".p7d".to_string()
}

fn default_archive_extension() -> String {
    ".zip".to_string()
}

fn default_alert_labels() -> Vec<String> {
    vec![
        "exception".to_string(),
        "badgpu".to_string(),
        "graphics".to_string(),
    ]
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_entry_size: default_max_entry_size(),
            max_artifacts: default_max_artifacts(),
            log_extension: default_log_extension(),
            archive_extension: default_archive_extension(),
            alert_labels: default_alert_labels(),
        }
    }
}

impl Policy {
    /// Load policy from a TOML file, or return defaults if it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read policy file: {:?}", path))?;
            let policy: Policy = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse policy file: {:?}", path))?;
            Ok(policy)
        } else {
            Ok(Policy::default())
        }
    }

    /// Whether a declared name passes the single-log extension check.
    pub fn admits_log_name(&self, name: &str) -> bool {
        name.ends_with(&self.log_extension)
    }

    /// Whether a declared name passes the archive extension check.
    pub fn admits_archive_name(&self, name: &str) -> bool {
        name.ends_with(&self.archive_extension)
    }

    /// Whether any of the given labels is in the alert set.
    pub fn is_alert(&self, labels: &[String]) -> bool {
        labels
            .iter()
            .any(|label| self.alert_labels.iter().any(|alert| alert == label))
    }
}
