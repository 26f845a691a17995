// file: src/manager/backup.rs
// version: 1.0.0
// guid: e17c4b62-8d05-4f39-a6e1-3c98d25f07b4

//! Backup tree intents

use crate::model::BackupFile;
use crate::service::BackupService;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct BackupManager {
    service: Arc<BackupService>,
}

impl BackupManager {
    pub fn new(service: Arc<BackupService>) -> Self {
        Self { service }
    }

    pub async fn backup_file(&self, path: &Path) -> Result<Option<BackupFile>> {
        self.service.backup_file(path).await
    }

    /// All archived copies of one original path, oldest first
    pub async fn list(&self, path: &Path) -> Result<Vec<BackupFile>> {
        self.service.list_backups(path).await
    }

    pub async fn restore(&self, backup_path: &Path, original_path: &Path) -> Result<()> {
        self.service.restore(backup_path, original_path).await
    }

    /// Drop day-directories older than the retention window
    pub async fn cleanup(&self, keep_days: u32) -> Result<Vec<PathBuf>> {
        self.service.cleanup_older_than(keep_days).await
    }

    pub async fn verify(&self) -> Result<()> {
        self.service.verify().await
    }
}
