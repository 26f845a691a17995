// file: src/adapters/mod.rs
// version: 1.0.0
// guid: 1a5e8d20-4c7b-49f3-b6d1-82e0a97c53f4

//! Adapters: distribution-aware implementations of the ports
//!
//! Every adapter holds the platform seams plus the detected OS and
//! branches on the distro where file names, tools or group conventions
//! differ. Destructive writes go through the backup port first.

pub mod backup;
pub mod dns;
pub mod environment;
pub mod firewall;
pub mod host;
pub mod lastlog;
pub mod logfile;
pub mod package;
pub mod ssh;
pub mod user;

pub use backup::BackupAdapter;
pub use dns::DnsAdapter;
pub use environment::EnvironmentAdapter;
pub use firewall::FirewallAdapter;
pub use host::HostAdapter;
pub use lastlog::LastLoginAdapter;
pub use logfile::LogFileAdapter;
pub use package::{PackageAdapter, PROXMOX_HELD_PACKAGES};
pub use ssh::SshAdapter;
pub use user::UserAdapter;

use crate::model::OsInfo;
use crate::platform::{Commander, FileSystem};
use crate::ports::BackupPort;
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identify the running distribution from `/etc/os-release`.
///
/// `/etc/pve` marks a Proxmox VE installation on top of Debian, which
/// changes repository layout and package holds.
pub fn detect_os(fs: &Arc<dyn FileSystem>) -> Result<OsInfo> {
    let release = fs.read_to_string(Path::new("/etc/os-release")).map_err(|e| {
        crate::error::HardnError::Config(format!("could not read /etc/os-release: {}", e))
    })?;
    let has_pve = fs.is_dir(Path::new("/etc/pve"));
    OsInfo::from_os_release(&release, has_pve)
}

/// Append a public key to `<home>/.ssh/authorized_keys`.
///
/// Creates the directory (0700) and file (0600) as needed, leaves the
/// file byte-identical when the key is already present, and resets
/// ownership of the whole `.ssh` directory to the user. Returns true
/// when the file changed.
pub(crate) async fn append_authorized_key(
    fs: &Arc<dyn FileSystem>,
    commander: &Arc<dyn Commander>,
    home: &Path,
    username: &str,
    public_key: &str,
) -> Result<bool> {
    let key = public_key.trim();
    let ssh_dir = home.join(".ssh");
    let auth_file = ssh_dir.join("authorized_keys");

    if !fs.exists(&ssh_dir) {
        fs.create_dir_all(&ssh_dir, 0o700)?;
    }

    let changed = if fs.exists(&auth_file) {
        let existing = fs.read_to_string(&auth_file)?;
        if existing.contains(key) {
            debug!("Key already present in {}", auth_file.display());
            false
        } else {
            let mut content = existing;
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            content.push_str(key);
            content.push('\n');
            fs.write(&auth_file, content.as_bytes(), 0o600)?;
            true
        }
    } else {
        fs.write(&auth_file, format!("{}\n", key).as_bytes(), 0o600)?;
        true
    };

    let owner = format!("{}:{}", username, username);
    let dir = ssh_dir.to_string_lossy().to_string();
    commander
        .execute("chown", &["-R", &owner, &dir])
        .await?;

    Ok(changed)
}

/// Install sudoers content through a visudo-validated temporary file.
///
/// A malformed sudoers file locks administrators out, so the real
/// target is only touched after `visudo -c` accepts the candidate.
pub(crate) async fn write_validated_sudoers(
    fs: &Arc<dyn FileSystem>,
    commander: &Arc<dyn Commander>,
    backup: &Arc<dyn BackupPort>,
    target: &Path,
    content: &str,
) -> Result<()> {
    let tmp = std::env::temp_dir().join(format!(
        "hardn-sudoers-{}",
        target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "candidate".to_string())
    ));

    fs.write(&tmp, content.as_bytes(), 0o440)?;
    let tmp_str = tmp.to_string_lossy().to_string();
    if let Err(e) = commander.execute("visudo", &["-c", "-f", &tmp_str]).await {
        if let Err(cleanup) = fs.remove_file(&tmp) {
            warn!("Could not remove rejected sudoers candidate: {}", cleanup);
        }
        return Err(crate::error::HardnError::Validation(format!(
            "sudoers validation failed for {}: {}",
            target.display(),
            e
        )));
    }

    backup.backup_file(target).await?;
    fs.write(target, content.as_bytes(), 0o440)?;
    if let Err(e) = fs.remove_file(&tmp) {
        warn!("Could not remove sudoers candidate: {}", e);
    }
    Ok(())
}
