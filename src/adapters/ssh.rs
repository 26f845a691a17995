// file: src/adapters/ssh.rs
// version: 1.0.0
// guid: f3a8d591-6c24-4e07-b9a3-71d5f82c04e6

//! sshd policy rendering, installation and parsing

use crate::model::{OsInfo, OsType, SshConfig};
use crate::platform::{Commander, FileSystem};
use crate::ports::{BackupPort, SshPort};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const CANONICAL_CONFIG: &str = "/etc/ssh/sshd_config";
const DROP_IN_CONFIG: &str = "/etc/ssh/sshd_config.d/hardn.conf";

/// Where the rendered policy lives: the canonical file on Alpine, a
/// drop-in on Debian/Ubuntu.
pub fn sshd_config_path(os: &OsInfo) -> PathBuf {
    match os.os_type {
        OsType::Alpine => PathBuf::from(CANONICAL_CONFIG),
        OsType::Debian | OsType::Ubuntu => PathBuf::from(DROP_IN_CONFIG),
    }
}

/// The file that currently declares the daemon policy on this host:
/// the drop-in if present, the canonical file otherwise.
pub fn effective_config_path(fs: &Arc<dyn FileSystem>, os: &OsInfo) -> PathBuf {
    let preferred = sshd_config_path(os);
    if fs.exists(&preferred) {
        preferred
    } else {
        PathBuf::from(CANONICAL_CONFIG)
    }
}

/// Render the policy fragment. Line order is stable so repeated runs
/// produce byte-identical files.
pub fn render_config(config: &SshConfig) -> String {
    let mut out = String::new();
    out.push_str("Protocol 2\n");
    out.push_str("StrictModes yes\n");
    out.push_str(&format!("Port {}\n", config.port));
    for addr in &config.listen_addresses {
        out.push_str(&format!("ListenAddress {}\n", addr));
    }
    out.push_str(&format!(
        "AuthenticationMethods {}\n",
        config.effective_auth_methods()
    ));
    out.push_str("PubkeyAuthentication yes\n");
    out.push_str(&format!(
        "PermitRootLogin {}\n",
        if config.permit_root_login { "yes" } else { "no" }
    ));
    if !config.allowed_users.is_empty() {
        out.push_str(&format!("AllowUsers {}\n", config.allowed_users.join(" ")));
    }
    out.push_str("PasswordAuthentication no\n");
    out.push_str("PermitEmptyPasswords no\n");
    for path in config.effective_key_paths() {
        out.push_str(&format!("AuthorizedKeysFile {}\n", path));
    }
    out
}

/// Parse an sshd config fragment. Directives are case-insensitive;
/// anything absent keeps the daemon's vulnerable defaults (port 22,
/// root login permitted).
pub fn parse_config(content: &str) -> SshConfig {
    let mut config = SshConfig {
        listen_addresses: Vec::new(),
        permit_root_login: true,
        ..Default::default()
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            continue;
        };
        let rest: Vec<&str> = tokens.collect();
        let value = rest.join(" ");

        match directive.to_ascii_lowercase().as_str() {
            "port" => {
                if let Ok(port) = value.parse() {
                    config.port = port;
                }
            }
            "listenaddress" => config.listen_addresses.push(value),
            "permitrootlogin" => {
                config.permit_root_login = !value.eq_ignore_ascii_case("no");
            }
            "allowusers" => config
                .allowed_users
                .extend(rest.iter().map(|s| s.to_string())),
            "authenticationmethods" => {
                config.auth_methods = value.split(',').map(str::to_string).collect();
            }
            "authorizedkeysfile" => config
                .key_paths
                .extend(rest.iter().map(|s| s.to_string())),
            _ => {}
        }
    }
    config
}

pub struct SshAdapter {
    fs: Arc<dyn FileSystem>,
    commander: Arc<dyn Commander>,
    backup: Arc<dyn BackupPort>,
    os: OsInfo,
}

impl SshAdapter {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        commander: Arc<dyn Commander>,
        backup: Arc<dyn BackupPort>,
        os: OsInfo,
    ) -> Self {
        Self {
            fs,
            commander,
            backup,
            os,
        }
    }

    async fn restart_daemon(&self) -> Result<()> {
        match self.os.os_type {
            OsType::Alpine => {
                self.commander
                    .execute("rc-service", &["sshd", "restart"])
                    .await?;
            }
            OsType::Debian | OsType::Ubuntu => {
                self.commander
                    .execute("systemctl", &["restart", "ssh"])
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SshPort for SshAdapter {
    async fn read_config(&self) -> Result<SshConfig> {
        let path = effective_config_path(&self.fs, &self.os);
        let content = if self.fs.exists(&path) {
            self.fs.read_to_string(&path)?
        } else {
            String::new()
        };
        let mut config = parse_config(&content);
        config.config_file_path = path;
        Ok(config)
    }

    async fn apply_config(&self, config: &SshConfig) -> Result<()> {
        let path = if config.config_file_path.as_os_str().is_empty() {
            sshd_config_path(&self.os)
        } else {
            config.config_file_path.clone()
        };

        if let Some(parent) = path.parent() {
            if !self.fs.exists(parent) {
                self.fs.create_dir_all(parent, 0o755)?;
            }
        }

        self.backup.backup_file(&path).await?;
        let content = render_config(config);
        self.fs.write(&path, content.as_bytes(), 0o644)?;
        info!("Installed sshd policy at {}", path.display());

        self.restart_daemon().await
    }

    async fn add_authorized_key(&self, username: &str, public_key: &str) -> Result<()> {
        let home = if username == "root" {
            PathBuf::from("/root")
        } else {
            Path::new("/home").join(username)
        };
        super::append_authorized_key(&self.fs, &self.commander, &home, username, public_key)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BackupConfig;
    use crate::platform::{MemoryFileSystem, MockCommander};

    fn os(os_type: OsType) -> OsInfo {
        OsInfo {
            os_type,
            version: "test".to_string(),
            codename: "test".to_string(),
            is_proxmox: false,
        }
    }

    fn adapter(
        os_type: OsType,
        backups: bool,
    ) -> (Arc<MemoryFileSystem>, Arc<MockCommander>, SshAdapter) {
        let mem = Arc::new(MemoryFileSystem::new());
        let mock = Arc::new(MockCommander::new());
        let backup = Arc::new(crate::adapters::BackupAdapter::new(
            mem.clone(),
            BackupConfig {
                enabled: backups,
                backup_dir: PathBuf::from("/var/backups/hardn"),
            },
        ));
        let adapter = SshAdapter::new(mem.clone(), mock.clone(), backup, os(os_type));
        (mem, mock, adapter)
    }

    fn hardened_config() -> SshConfig {
        SshConfig {
            port: 2222,
            listen_addresses: vec!["0.0.0.0".to_string()],
            permit_root_login: false,
            allowed_users: vec!["ops".to_string()],
            key_paths: Vec::new(),
            auth_methods: Vec::new(),
            config_file_path: PathBuf::new(),
        }
    }

    #[test]
    fn test_render_is_stable_and_ordered() {
        let content = render_config(&hardened_config());
        let expected = "Protocol 2\n\
                        StrictModes yes\n\
                        Port 2222\n\
                        ListenAddress 0.0.0.0\n\
                        AuthenticationMethods publickey\n\
                        PubkeyAuthentication yes\n\
                        PermitRootLogin no\n\
                        AllowUsers ops\n\
                        PasswordAuthentication no\n\
                        PermitEmptyPasswords no\n\
                        AuthorizedKeysFile .ssh/authorized_keys\n";
        assert_eq!(content, expected);

        // No AllowUsers line when the list is empty
        let mut config = hardened_config();
        config.allowed_users.clear();
        assert!(!render_config(&config).contains("AllowUsers"));
    }

    #[test]
    fn test_parse_vulnerable_defaults() {
        let config = parse_config("");
        assert_eq!(config.port, 22);
        assert!(config.permit_root_login);
        assert!(config.listen_addresses.is_empty());
    }

    #[test]
    fn test_parse_is_case_insensitive_and_skips_comments() {
        let config = parse_config(
            "# hardened by hand\n\
             PORT 2022\n\
             permitrootlogin No\n\
             AllowUsers ops backup\n",
        );
        assert_eq!(config.port, 2022);
        assert!(!config.permit_root_login);
        assert_eq!(config.allowed_users, vec!["ops", "backup"]);
    }

    #[tokio::test]
    async fn test_apply_targets_drop_in_on_debian() {
        let (mem, mock, adapter) = adapter(OsType::Debian, false);

        adapter.apply_config(&hardened_config()).await.unwrap();

        let written = mem.contents_of(DROP_IN_CONFIG).unwrap();
        assert!(written.contains("Port 2222"));
        assert!(written.contains("PermitRootLogin no"));
        assert_eq!(mem.mode_of(DROP_IN_CONFIG), Some(0o644));
        assert!(mock.was_called("systemctl restart ssh"));
    }

    #[tokio::test]
    async fn test_apply_targets_canonical_on_alpine() {
        let (mem, mock, adapter) = adapter(OsType::Alpine, false);

        adapter.apply_config(&hardened_config()).await.unwrap();

        assert!(mem.contents_of(CANONICAL_CONFIG).is_some());
        assert!(mem.contents_of(DROP_IN_CONFIG).is_none());
        assert!(mock.was_called("rc-service sshd restart"));
    }

    #[tokio::test]
    async fn test_apply_backs_up_existing_config() {
        let (mem, _, adapter) = adapter(OsType::Alpine, true);
        mem.insert_file(CANONICAL_CONFIG, "Port 22\n", 0o644);

        adapter.apply_config(&hardened_config()).await.unwrap();

        let backed_up = mem
            .file_paths()
            .into_iter()
            .any(|p| p.to_string_lossy().contains("sshd_config.") && p.to_string_lossy().ends_with(".bak"));
        assert!(backed_up);
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let (_, _, adapter) = adapter(OsType::Debian, false);
        let config = hardened_config();

        adapter.apply_config(&config).await.unwrap();
        let read_back = adapter.read_config().await.unwrap();

        assert_eq!(read_back.port, config.port);
        assert_eq!(read_back.listen_addresses, config.listen_addresses);
        assert_eq!(read_back.allowed_users, config.allowed_users);
        assert!(!read_back.permit_root_login);
        assert_eq!(
            read_back.effective_auth_methods(),
            config.effective_auth_methods()
        );
        assert_eq!(read_back.effective_key_paths(), config.effective_key_paths());
    }

    #[tokio::test]
    async fn test_authorized_key_home_selection() {
        let (mem, _, adapter) = adapter(OsType::Debian, false);

        adapter
            .add_authorized_key("root", "ssh-ed25519 AAAA root@h")
            .await
            .unwrap();
        adapter
            .add_authorized_key("ops", "ssh-ed25519 BBBB ops@h")
            .await
            .unwrap();

        assert!(mem.contents_of("/root/.ssh/authorized_keys").is_some());
        assert!(mem.contents_of("/home/ops/.ssh/authorized_keys").is_some());
    }
}
