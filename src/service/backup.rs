// file: src/service/backup.rs
// version: 1.0.0
// guid: d16f8a43-5c20-4e97-b8d4-a3710f92c5e8

//! Backup listing, restore and retention

use crate::model::BackupFile;
use crate::ports::BackupPort;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct BackupService {
    port: Arc<dyn BackupPort>,
}

impl BackupService {
    pub fn new(port: Arc<dyn BackupPort>) -> Self {
        Self { port }
    }

    pub async fn backup_file(&self, path: &Path) -> Result<Option<BackupFile>> {
        self.port.backup_file(path).await
    }

    pub async fn list_backups(&self, path: &Path) -> Result<Vec<BackupFile>> {
        self.port.list_backups(path).await
    }

    pub async fn restore(&self, backup_path: &Path, original_path: &Path) -> Result<()> {
        self.port.restore_backup(backup_path, original_path).await?;
        info!(
            "Restored {} from {}",
            original_path.display(),
            backup_path.display()
        );
        Ok(())
    }

    /// Remove day-directories older than the retention window.
    pub async fn cleanup_older_than(&self, keep_days: u32) -> Result<Vec<PathBuf>> {
        let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(keep_days as i64);
        let removed = self.port.cleanup_old_backups(cutoff).await?;
        if !removed.is_empty() {
            info!("Removed {} expired backup day(s)", removed.len());
        }
        Ok(removed)
    }

    pub async fn verify(&self) -> Result<()> {
        self.port.verify_directory().await
    }
}
