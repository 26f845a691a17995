// file: src/adapters/logfile.rs
// version: 1.0.0
// guid: b28e4c95-1d60-4f37-a8b2-c70d5e93f148

//! Timestamped operation journal on disk

use crate::platform::FileSystem;
use crate::ports::LogPort;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct LogFileAdapter {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl LogFileAdapter {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }
}

#[async_trait::async_trait]
impl LogPort for LogFileAdapter {
    async fn append(&self, line: &str) -> Result<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!("[{}] {}\n", timestamp, line);

        if let Some(parent) = self.path.parent() {
            if !self.fs.exists(parent) {
                self.fs.create_dir_all(parent, 0o755)?;
            }
        }
        let mut content = if self.fs.exists(&self.path) {
            self.fs.read_to_string(&self.path)?
        } else {
            String::new()
        };
        content.push_str(&entry);
        self.fs.write(&self.path, content.as_bytes(), 0o644)?;
        Ok(())
    }

    async fn read_recent(&self, count: usize) -> Result<Vec<String>> {
        if !self.fs.exists(&self.path) {
            return Ok(Vec::new());
        }
        let content = self.fs.read_to_string(&self.path)?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let start = lines.len().saturating_sub(count);
        Ok(lines[start..].to_vec())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
