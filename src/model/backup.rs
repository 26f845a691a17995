// file: src/model/backup.rs
// version: 1.0.0
// guid: b82d4f17-65c3-48ae-9201-7de8a1c45f3b

//! Backup settings and archived file handles

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and whether configuration backups are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    pub enabled: bool,
    /// Root of the dated backup tree
    pub backup_dir: PathBuf,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backup_dir: PathBuf::from("/var/backups/hardn"),
        }
    }
}

impl BackupConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.enabled && !self.backup_dir.is_absolute() {
            return Err(crate::error::HardnError::Validation(format!(
                "backup directory must be an absolute path: {}",
                self.backup_dir.display()
            )));
        }
        Ok(())
    }
}

/// Handle to one archived copy inside the dated backup tree.
///
/// The backup path encodes capture date and time:
/// `<backupDir>/<YYYY-MM-DD>/<basename>.<HHMMSS>.bak`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupFile {
    /// File the backup was taken of
    pub original_path: PathBuf,
    /// Archived copy
    pub backup_path: PathBuf,
    pub created: DateTime<Local>,
    pub size: u64,
}

impl BackupFile {
    /// True when `backup_path` follows the `<basename>.<HHMMSS>.bak`
    /// naming scheme for the given source file name.
    pub fn matches_source(backup_name: &str, source_name: &str) -> bool {
        let Some(stem) = backup_name.strip_suffix(".bak") else {
            return false;
        };
        let Some(rest) = stem.strip_prefix(source_name) else {
            return false;
        };
        let Some(timestamp) = rest.strip_prefix('.') else {
            return false;
        };
        timestamp.len() == 6 && timestamp.chars().all(|c| c.is_ascii_digit())
    }
}
