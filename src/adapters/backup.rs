// file: src/adapters/backup.rs
// version: 1.0.0
// guid: c4f91a62-8b05-4d37-92e8-5a1c6d03f7b9

//! Dated backup tree under the configured backup directory

use crate::model::{BackupConfig, BackupFile};
use crate::platform::FileSystem;
use crate::ports::BackupPort;
use crate::Result;
use chrono::{DateTime, Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stores byte copies as `<backupDir>/<YYYY-MM-DD>/<name>.<HHMMSS>.bak`
pub struct BackupAdapter {
    fs: Arc<dyn FileSystem>,
    config: BackupConfig,
}

impl BackupAdapter {
    pub fn new(fs: Arc<dyn FileSystem>, config: BackupConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    fn file_name_of(path: &Path) -> Result<String> {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                crate::error::HardnError::Validation(format!(
                    "path has no file name: {}",
                    path.display()
                ))
            })
    }
}

#[async_trait::async_trait]
impl BackupPort for BackupAdapter {
    async fn backup_file(&self, path: &Path) -> Result<Option<BackupFile>> {
        if !self.config.enabled {
            debug!("Backups disabled, skipping {}", path.display());
            return Ok(None);
        }
        if !self.fs.exists(path) {
            debug!("Nothing to back up, {} does not exist", path.display());
            return Ok(None);
        }

        let now = Local::now();
        let day_dir = self
            .config
            .backup_dir
            .join(now.format("%Y-%m-%d").to_string());
        self.fs.create_dir_all(&day_dir, 0o755)?;

        let name = Self::file_name_of(path)?;
        let target = day_dir.join(format!("{}.{}.bak", name, now.format("%H%M%S")));

        let bytes = self.fs.read_bytes(path)?;
        let size = bytes.len() as u64;
        self.fs.write(&target, &bytes, 0o644)?;
        info!("Backed up {} to {}", path.display(), target.display());

        Ok(Some(BackupFile {
            original_path: path.to_path_buf(),
            backup_path: target,
            created: now,
            size,
        }))
    }

    async fn list_backups(&self, path: &Path) -> Result<Vec<BackupFile>> {
        let name = Self::file_name_of(path)?;
        if !self.fs.exists(&self.config.backup_dir) {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for day_dir in self.fs.list_dir(&self.config.backup_dir)? {
            if !self.fs.is_dir(&day_dir) {
                continue;
            }
            for entry in self.fs.list_dir(&day_dir)? {
                let entry_name = match entry.file_name() {
                    Some(n) => n.to_string_lossy().to_string(),
                    None => continue,
                };
                if !BackupFile::matches_source(&entry_name, &name) {
                    continue;
                }
                let meta = self.fs.metadata(&entry)?;
                backups.push(BackupFile {
                    original_path: path.to_path_buf(),
                    backup_path: entry,
                    created: DateTime::from(meta.modified),
                    size: meta.size,
                });
            }
        }

        // Date directory plus HHMMSS suffix sort chronologically
        backups.sort_by(|a, b| a.backup_path.cmp(&b.backup_path));
        Ok(backups)
    }

    async fn restore_backup(&self, backup_path: &Path, original_path: &Path) -> Result<()> {
        if !self.fs.exists(backup_path) {
            return Err(crate::error::HardnError::not_found(format!(
                "backup does not exist: {}",
                backup_path.display()
            )));
        }
        if self.fs.is_dir(backup_path) {
            return Err(crate::error::HardnError::Validation(format!(
                "backup path is a directory: {}",
                backup_path.display()
            )));
        }

        if let Some(parent) = original_path.parent() {
            if !self.fs.exists(parent) {
                self.fs.create_dir_all(parent, 0o755)?;
            }
        }

        let bytes = self.fs.read_bytes(backup_path)?;
        self.fs.write(original_path, &bytes, 0o644)?;
        info!(
            "Restored {} from {}",
            original_path.display(),
            backup_path.display()
        );
        Ok(())
    }

    async fn cleanup_old_backups(&self, before: NaiveDate) -> Result<Vec<PathBuf>> {
        if !self.fs.exists(&self.config.backup_dir) {
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        for entry in self.fs.list_dir(&self.config.backup_dir)? {
            if !self.fs.is_dir(&entry) {
                // Stray top-level files are left alone
                continue;
            }
            let dir_name = match entry.file_name() {
                Some(n) => n.to_string_lossy().to_string(),
                None => continue,
            };
            let Ok(date) = NaiveDate::parse_from_str(&dir_name, "%Y-%m-%d") else {
                continue;
            };
            if date < before {
                self.fs.remove_dir_all(&entry)?;
                info!("Removed backup day {}", entry.display());
                removed.push(entry);
            }
        }
        Ok(removed)
    }

    async fn verify_directory(&self) -> Result<()> {
        if !self.fs.exists(&self.config.backup_dir) {
            self.fs.create_dir_all(&self.config.backup_dir, 0o755)?;
        }

        let probe = self.config.backup_dir.join(".write_test");
        self.fs.write(&probe, b"", 0o644).map_err(|e| {
            crate::error::HardnError::Mutation(format!(
                "backup directory {} is not writable: {}",
                self.config.backup_dir.display(),
                e
            ))
        })?;

        if let Err(e) = self.fs.remove_file(&probe) {
            warn!("Could not remove write-test file: {}", e);
        }
        Ok(())
    }
}
