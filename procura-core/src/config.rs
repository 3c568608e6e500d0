/// Reconciliation settings for the board view.
/// Reads reconcile.json from ~/.config/procura/reconcile.json (or platform equivalent).
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{PLACEHOLDER_CREATOR, TEMP_ID_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileConfig {
    #[serde(default = "default_temp_id_prefix")]
    pub temp_id_prefix: String,
    #[serde(default = "default_placeholder_creator")]
    pub placeholder_creator: String,
    /// Consecutive merge passes an entry may be skipped before the session warns about it.
    /// Zero disables the warning.
    #[serde(default = "default_miss_report_threshold")]
    pub miss_report_threshold: u32,
}

fn default_temp_id_prefix() -> String {
    TEMP_ID_PREFIX.to_string()
}

fn default_placeholder_creator() -> String {
    PLACEHOLDER_CREATOR.to_string()
}

fn default_miss_report_threshold() -> u32 {
    3
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            temp_id_prefix: default_temp_id_prefix(),
            placeholder_creator: default_placeholder_creator(),
            miss_report_threshold: default_miss_report_threshold(),
        }
    }
}

/// Default config path: ~/.config/procura/reconcile.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("procura")
        .join("reconcile.json")
}

/// Load config from path. Returns defaults if the file is missing or unreadable.
pub fn load_config(path: &Path) -> ReconcileConfig {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<ReconcileConfig>(&content) {
            Ok(config) if config.temp_id_prefix.is_empty() => {
                log::warn!(
                    "[procura.config] Empty tempIdPrefix in {}, using default",
                    path.display()
                );
                ReconcileConfig {
                    temp_id_prefix: default_temp_id_prefix(),
                    ..config
                }
            }
            Ok(config) => config,
            Err(e) => {
                log::warn!("[procura.config] Failed to parse {}: {}", path.display(), e);
                ReconcileConfig::default()
            }
        },
        Err(_) => {
            log::info!("[procura.config] No config at {}, using defaults", path.display());
            ReconcileConfig::default()
        }
    }
}
