// file: src/platform/fs.rs
// version: 1.0.0
// guid: 8f14b6d2-37a9-4e85-bc01-d52e9a74c368

//! Filesystem seam with a real and an in-memory implementation

use crate::Result;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;
use tracing::debug;

/// Subset of file metadata the adapters care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Permission bits only
    pub mode: u32,
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

/// Narrow filesystem interface consumed by every adapter.
///
/// Writes always carry an explicit mode; the implementation applies it
/// even when the file already exists, so repeated runs converge on the
/// declared permissions.
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn metadata(&self, path: &Path) -> Result<FileMeta>;
    /// Immediate children of a directory, sorted by path
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Live filesystem backed by std::fs
#[derive(Debug, Default, Clone)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }

    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        debug!("Writing {} ({} bytes, mode {:o})", path.display(), contents.len(), mode);
        std::fs::write(path, contents)?;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(mode)
            .create(path)?;
        // umask may have masked bits during creation
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        Ok(std::fs::remove_file(path)?)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        Ok(std::fs::remove_dir_all(path)?)
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        use std::os::unix::fs::PermissionsExt;

        let meta = std::fs::metadata(path)?;
        Ok(FileMeta {
            mode: meta.permissions().mode() & 0o7777,
            size: meta.len(),
            modified: meta.modified()?,
            is_dir: meta.is_dir(),
        })
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            entries.push(entry?.path());
        }
        entries.sort();
        Ok(entries)
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    mode: u32,
    modified: SystemTime,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, MemoryFile>,
    dirs: BTreeMap<PathBuf, u32>,
    /// Paths whose next access fails with the stored message
    errors: BTreeMap<PathBuf, String>,
}

/// In-memory filesystem double: a path → bytes map with modes and
/// per-path error injection.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<MemoryState>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without going through the trait
    pub fn insert_file(&self, path: impl Into<PathBuf>, contents: &str, mode: u32) {
        let mut state = self.state.lock().unwrap();
        state.files.insert(
            path.into(),
            MemoryFile {
                data: contents.as_bytes().to_vec(),
                mode,
                modified: SystemTime::now(),
            },
        );
    }

    /// Seed an empty directory
    pub fn insert_dir(&self, path: impl Into<PathBuf>, mode: u32) {
        let mut state = self.state.lock().unwrap();
        state.dirs.insert(path.into(), mode);
    }

    /// Make every future access to `path` fail
    pub fn inject_error(&self, path: impl Into<PathBuf>, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.errors.insert(path.into(), message.to_string());
    }

    pub fn contents_of(&self, path: impl AsRef<Path>) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(path.as_ref())
            .map(|f| String::from_utf8_lossy(&f.data).to_string())
    }

    pub fn mode_of(&self, path: impl AsRef<Path>) -> Option<u32> {
        let state = self.state.lock().unwrap();
        let path = path.as_ref();
        state
            .files
            .get(path)
            .map(|f| f.mode)
            .or_else(|| state.dirs.get(path).copied())
    }

    /// All file paths currently stored, sorted
    pub fn file_paths(&self) -> Vec<PathBuf> {
        let state = self.state.lock().unwrap();
        state.files.keys().cloned().collect()
    }

    fn check_error(state: &MemoryState, path: &Path) -> Result<()> {
        if let Some(message) = state.errors.get(path) {
            return Err(io::Error::new(io::ErrorKind::Other, message.clone()).into());
        }
        Ok(())
    }

    fn not_found(path: &Path) -> crate::error::HardnError {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file or directory: {}", path.display()),
        )
        .into()
    }

    /// A path is an implicit directory when some stored entry lives below it
    fn is_implicit_dir(state: &MemoryState, path: &Path) -> bool {
        state
            .files
            .keys()
            .any(|p| p != path && p.starts_with(path))
            || state.dirs.keys().any(|p| p != path && p.starts_with(path))
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.state.lock().unwrap();
        Self::check_error(&state, path)?;
        state
            .files
            .get(path)
            .map(|f| String::from_utf8_lossy(&f.data).to_string())
            .ok_or_else(|| Self::not_found(path))
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let state = self.state.lock().unwrap();
        Self::check_error(&state, path)?;
        state
            .files
            .get(path)
            .map(|f| f.data.clone())
            .ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_error(&state, path)?;
        state.files.insert(
            path.to_path_buf(),
            MemoryFile {
                data: contents.to_vec(),
                mode,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.files.contains_key(path)
            || state.dirs.contains_key(path)
            || Self::is_implicit_dir(&state, path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.dirs.contains_key(path) || Self::is_implicit_dir(&state, path)
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_error(&state, path)?;
        state.dirs.insert(path.to_path_buf(), mode);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_error(&state, path)?;
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_error(&state, path)?;
        let prefix = path.to_path_buf();
        state.files.retain(|p, _| !p.starts_with(&prefix));
        state.dirs.retain(|p, _| !p.starts_with(&prefix));
        Ok(())
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        let state = self.state.lock().unwrap();
        Self::check_error(&state, path)?;
        if let Some(file) = state.files.get(path) {
            return Ok(FileMeta {
                mode: file.mode,
                size: file.data.len() as u64,
                modified: file.modified,
                is_dir: false,
            });
        }
        if let Some(mode) = state.dirs.get(path) {
            return Ok(FileMeta {
                mode: *mode,
                size: 0,
                modified: SystemTime::UNIX_EPOCH,
                is_dir: true,
            });
        }
        if Self::is_implicit_dir(&state, path) {
            return Ok(FileMeta {
                mode: 0o755,
                size: 0,
                modified: SystemTime::UNIX_EPOCH,
                is_dir: true,
            });
        }
        Err(Self::not_found(path))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        Self::check_error(&state, path)?;
        if !state.dirs.contains_key(path) && !Self::is_implicit_dir(&state, path) {
            return Err(Self::not_found(path));
        }
        let mut entries: Vec<PathBuf> = Vec::new();
        for candidate in state.files.keys().chain(state.dirs.keys()) {
            if candidate.parent() == Some(path) && !entries.contains(candidate) {
                entries.push(candidate.clone());
            }
        }
        // Implicit intermediate directories show up as children too
        for file in state.files.keys() {
            let mut ancestor = file.parent();
            while let Some(dir) = ancestor {
                if dir.parent() == Some(path) && !entries.contains(&dir.to_path_buf()) {
                    entries.push(dir.to_path_buf());
                }
                ancestor = dir.parent();
            }
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/etc/test.conf");

        assert!(!fs.exists(path));
        fs.write(path, b"hello\n", 0o644).unwrap();
        assert!(fs.exists(path));
        assert_eq!(fs.read_to_string(path).unwrap(), "hello\n");
        assert_eq!(fs.mode_of(path), Some(0o644));

        // Rewriting with a different mode updates the stored mode
        fs.write(path, b"bye\n", 0o600).unwrap();
        assert_eq!(fs.mode_of(path), Some(0o600));
    }

    #[test]
    fn test_memory_missing_file() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_to_string(Path::new("/nope")).unwrap_err();
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn test_memory_error_injection() {
        let fs = MemoryFileSystem::new();
        fs.insert_file("/etc/flaky", "data", 0o644);
        fs.inject_error("/etc/flaky", "disk on fire");

        let err = fs.read_to_string(Path::new("/etc/flaky")).unwrap_err();
        assert!(err.to_string().contains("disk on fire"));
        assert!(fs.write(Path::new("/etc/flaky"), b"x", 0o644).is_err());
    }

    #[test]
    fn test_memory_implicit_dirs() {
        let fs = MemoryFileSystem::new();
        fs.insert_file("/home/ops/.ssh/authorized_keys", "key\n", 0o600);

        assert!(fs.is_dir(Path::new("/home/ops/.ssh")));
        assert!(fs.is_dir(Path::new("/home/ops")));
        assert!(!fs.is_dir(Path::new("/home/ops/.ssh/authorized_keys")));
    }

    #[test]
    fn test_memory_list_and_remove_dir() {
        let fs = MemoryFileSystem::new();
        fs.insert_dir("/backups/2024-03-01", 0o755);
        fs.insert_file("/backups/2024-03-01/a.120000.bak", "a", 0o644);
        fs.insert_file("/backups/2024-03-02/b.130000.bak", "b", 0o644);

        let days = fs.list_dir(Path::new("/backups")).unwrap();
        assert_eq!(
            days,
            vec![
                PathBuf::from("/backups/2024-03-01"),
                PathBuf::from("/backups/2024-03-02"),
            ]
        );

        fs.remove_dir_all(Path::new("/backups/2024-03-01")).unwrap();
        assert!(!fs.exists(Path::new("/backups/2024-03-01/a.120000.bak")));
        assert!(fs.exists(Path::new("/backups/2024-03-02/b.130000.bak")));
    }

    #[test]
    fn test_real_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFileSystem::new();
        let path = dir.path().join("file.txt");

        fs.write(&path, b"content\n", 0o600).unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "content\n");

        let meta = fs.metadata(&path).unwrap();
        assert_eq!(meta.mode, 0o600);
        assert_eq!(meta.size, 8);
        assert!(!meta.is_dir);

        fs.remove_file(&path).unwrap();
        assert!(!fs.exists(&path));
    }

    #[test]
    fn test_real_fs_create_dir_with_mode() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFileSystem::new();
        let nested = dir.path().join("a/b/.ssh");

        fs.create_dir_all(&nested, 0o700).unwrap();
        assert!(fs.is_dir(&nested));
        assert_eq!(fs.metadata(&nested).unwrap().mode, 0o700);
    }
}
