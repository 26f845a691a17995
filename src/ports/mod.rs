// file: src/ports/mod.rs
// version: 1.0.0
// guid: 7e2d9c46-b831-4f5a-8d07-6a94c2e15b83

//! Ports: distribution-agnostic interfaces implemented by the adapters
//!
//! Each concern gets one port. The live adapter for a port is selected
//! once at startup from the detected OS and never switched mid-run.

use crate::model::{
    BackupFile, DnsConfig, FirewallConfig, FirewallStatus, Group, LocaleSettings,
    PackageInstallRequest, PackageSources, SshConfig, User,
};
use crate::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Account lookup and mutation
#[async_trait::async_trait]
pub trait UserPort: Send + Sync {
    /// True when `id <username>` succeeds
    async fn exists(&self, username: &str) -> bool;

    /// Create the account with the distro's adduser flavor
    async fn create(&self, username: &str) -> Result<()>;

    /// Add the account to the distro's admin group (sudo or wheel)
    async fn grant_admin_group(&self, username: &str) -> Result<()>;

    /// Write the one-line sudoers drop-in for the account
    async fn write_sudo_policy(&self, username: &str, no_password: bool) -> Result<()>;

    /// Append a public key to the account's authorized_keys
    async fn add_ssh_key(&self, username: &str, public_key: &str) -> Result<()>;

    /// Keys currently present in the account's authorized_keys
    async fn list_ssh_keys(&self, username: &str) -> Result<Vec<String>>;

    /// UID, GID and home directory from the passwd database
    async fn lookup(&self, username: &str) -> Result<User>;

    /// Whether the account has sudo through group, drop-in or sudoers
    async fn has_sudo(&self, username: &str) -> Result<bool>;

    /// Interactive accounts with UID >= 1000
    async fn non_system_users(&self) -> Result<Vec<User>>;

    /// Groups with GID >= 1000
    async fn non_system_groups(&self) -> Result<Vec<Group>>;
}

/// Secure-shell daemon configuration
#[async_trait::async_trait]
pub trait SshPort: Send + Sync {
    /// Parse the daemon policy currently on disk
    async fn read_config(&self) -> Result<SshConfig>;

    /// Render the policy, install it at the distro path, restart sshd
    async fn apply_config(&self, config: &SshConfig) -> Result<()>;

    /// Append a public key, choosing /root or /home/<user> as home
    async fn add_authorized_key(&self, username: &str, public_key: &str) -> Result<()>;
}

/// Host firewall front-end
#[async_trait::async_trait]
pub trait FirewallPort: Send + Sync {
    /// True when the firewall tool is installed
    async fn is_available(&self) -> bool;

    /// Reset and reapply the whole configuration
    async fn apply(&self, config: &FirewallConfig) -> Result<()>;

    /// Parse the live status
    async fn status(&self) -> Result<FirewallStatus>;
}

/// Resolver configuration
#[async_trait::async_trait]
pub trait DnsPort: Send + Sync {
    /// Write the resolver settings through the active back-end
    async fn configure(&self, config: &DnsConfig) -> Result<()>;

    /// Parse /etc/resolv.conf, the canonical view
    async fn current(&self) -> Result<DnsConfig>;
}

/// Package installation and repository sources
#[async_trait::async_trait]
pub trait PackagePort: Send + Sync {
    async fn install(&self, request: &PackageInstallRequest) -> Result<()>;

    async fn is_installed(&self, package: &str) -> bool;

    /// Rewrite the repository source files from templates
    async fn update_sources(&self, sources: &PackageSources) -> Result<()>;

    /// Turn on automatic security updates the distro way: the
    /// unattended-upgrades service on Debian/Ubuntu, a daily periodic
    /// script on Alpine.
    async fn enable_auto_updates(&self) -> Result<()>;
}

/// Dated backups of configuration files
#[async_trait::async_trait]
pub trait BackupPort: Send + Sync {
    /// Archive one file; None when backups are disabled or the source
    /// does not exist.
    async fn backup_file(&self, path: &Path) -> Result<Option<BackupFile>>;

    /// All backups taken of `path`, oldest first
    async fn list_backups(&self, path: &Path) -> Result<Vec<BackupFile>>;

    /// Copy an archived file back over its original location
    async fn restore_backup(&self, backup_path: &Path, original_path: &Path) -> Result<()>;

    /// Remove whole day-directories older than the cutoff; returns the
    /// directories removed.
    async fn cleanup_old_backups(&self, before: NaiveDate) -> Result<Vec<PathBuf>>;

    /// Ensure the backup root exists and is writable
    async fn verify_directory(&self) -> Result<()>;
}

/// Sudo environment preservation and host-wide environment files
#[async_trait::async_trait]
pub trait EnvironmentPort: Send + Sync {
    /// Install the env_keep sudoers rule for the account, validated
    /// with visudo before the real file is touched.
    async fn preserve_config_var(&self, username: &str) -> Result<()>;

    /// Value of a variable in the user's login environment, via
    /// `su - <user> -c 'echo $VAR'`.
    async fn probe_user_env_var(&self, username: &str, var: &str) -> Result<String>;

    /// Write locale and timezone variables to /etc/environment and run
    /// locale-gen where the distro has it.
    async fn configure_locale(&self, locale: &LocaleSettings) -> Result<()>;
}

/// Read-only host facts for the info display
#[async_trait::async_trait]
pub trait HostPort: Send + Sync {
    async fn hostname(&self) -> Result<String>;

    async fn domain(&self) -> Result<String>;

    async fn kernel(&self) -> Result<String>;

    /// `df -h` style usage summary
    async fn disk_usage(&self) -> Result<String>;

    /// "used MiB / total MiB" summary
    async fn memory_summary(&self) -> Result<String>;

    async fn uptime_seconds(&self) -> Result<u64>;
}

/// Most recent login lookup
#[async_trait::async_trait]
pub trait LastLoginPort: Send + Sync {
    /// Timestamp and source address of the user's last login, or None
    /// when the user has never logged in.
    async fn last_login(&self, username: &str) -> Result<Option<(String, Option<String>)>>;
}

/// Operation journal on disk
#[async_trait::async_trait]
pub trait LogPort: Send + Sync {
    /// Append one timestamped line
    async fn append(&self, line: &str) -> Result<()>;

    /// Up to `count` most recent lines, oldest first
    async fn read_recent(&self, count: usize) -> Result<Vec<String>>;

    fn path(&self) -> &Path;
}
