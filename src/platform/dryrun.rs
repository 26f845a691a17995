// file: src/platform/dryrun.rs
// version: 1.0.0
// guid: 9d3b7e50-a148-4c26-b795-3f60e2c84da1

//! Dry-run decorators that let reads through and announce writes

use super::command::Commander;
use super::fs::{FileMeta, FileSystem};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Filesystem wrapper: reads delegate, mutations are logged and skipped
pub struct DryRunFileSystem {
    inner: Arc<dyn FileSystem>,
}

impl DryRunFileSystem {
    pub fn new(inner: Arc<dyn FileSystem>) -> Self {
        Self { inner }
    }
}

impl FileSystem for DryRunFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read_bytes(path)
    }

    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        info!(
            "[dry-run] would write {} ({} bytes, mode {:o})",
            path.display(),
            contents.len(),
            mode
        );
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        info!(
            "[dry-run] would create directory {} (mode {:o})",
            path.display(),
            mode
        );
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        info!("[dry-run] would remove {}", path.display());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        info!("[dry-run] would remove directory {}", path.display());
        Ok(())
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        self.inner.metadata(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.inner.list_dir(path)
    }
}

/// Commander wrapper: read-only probes run, everything else is
/// announced and reported as an empty success.
pub struct DryRunCommander {
    inner: Arc<dyn Commander>,
}

impl DryRunCommander {
    pub fn new(inner: Arc<dyn Commander>) -> Self {
        Self { inner }
    }

    /// Conservative classifier: only commands known not to change
    /// system state pass through. Anything unknown is treated as a
    /// mutation and blocked.
    fn is_read_only(program: &str, args: &[&str]) -> bool {
        match program {
            "id" | "which" | "getent" | "lastlog" | "last" | "hostname" | "domainname"
            | "uname" | "df" | "cat" | "groups" | "rc-status" | "aa-status" | "su" => true,
            "ufw" => args.first() == Some(&"status"),
            "systemctl" => matches!(
                args.first(),
                Some(&"is-active") | Some(&"is-enabled") | Some(&"status")
            ),
            "dpkg" => args.first() == Some(&"-l"),
            "dpkg-query" => true,
            "apk" => args.first() == Some(&"info"),
            _ => false,
        }
    }
}

#[async_trait::async_trait]
impl Commander for DryRunCommander {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<String> {
        if Self::is_read_only(program, args) {
            return self.inner.execute(program, args).await;
        }
        info!("[dry-run] would run: {} {}", program, args.join(" "));
        Ok(String::new())
    }

    async fn execute_with_input(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<String> {
        if Self::is_read_only(program, args) {
            return self.inner.execute_with_input(program, args, input).await;
        }
        info!(
            "[dry-run] would run with stdin: {} {}",
            program,
            args.join(" ")
        );
        Ok(String::new())
    }

    async fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        if Self::is_read_only(program, args) {
            return self.inner.succeeds(program, args).await;
        }
        // Mutations are assumed to work in a dry run
        info!("[dry-run] would run: {} {}", program, args.join(" "));
        true
    }
}
