// file: src/service/ssh.rs
// version: 1.0.0
// guid: 1c9e4b72-d385-46a0-9f1c-e62d70a84b35

//! Secure-shell daemon policy decisions

use crate::model::{validate_public_key, SshConfig};
use crate::ports::SshPort;
use crate::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct SshService {
    port: Arc<dyn SshPort>,
}

impl SshService {
    pub fn new(port: Arc<dyn SshPort>) -> Self {
        Self { port }
    }

    pub async fn configure(&self, config: &SshConfig) -> Result<()> {
        config.validate()?;
        self.port.apply_config(config).await
    }

    pub async fn current(&self) -> Result<SshConfig> {
        self.port.read_config().await
    }

    /// Rewrite the live policy with root login off and root removed
    /// from AllowUsers.
    pub async fn disable_root_access(&self) -> Result<()> {
        let mut config = self.port.read_config().await?;
        config.permit_root_login = false;
        config.allowed_users.retain(|user| user != "root");
        // The probe may have read the canonical file; the rewrite
        // always targets the managed fragment.
        config.config_file_path = PathBuf::new();
        self.port.apply_config(&config).await?;
        info!("Root SSH access disabled");
        Ok(())
    }

    pub async fn add_authorized_key(&self, username: &str, public_key: &str) -> Result<()> {
        validate_public_key(public_key)?;
        self.port.add_authorized_key(username, public_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BackupAdapter, SshAdapter};
    use crate::model::{BackupConfig, OsInfo, OsType};
    use crate::platform::{MemoryFileSystem, MockCommander};

    fn service(os_type: OsType) -> (Arc<MemoryFileSystem>, Arc<MockCommander>, SshService) {
        let mem = Arc::new(MemoryFileSystem::new());
        let mock = Arc::new(MockCommander::new());
        let backup = Arc::new(BackupAdapter::new(
            mem.clone(),
            BackupConfig {
                enabled: false,
                backup_dir: PathBuf::from("/var/backups/hardn"),
            },
        ));
        let os = OsInfo {
            os_type,
            version: "12".to_string(),
            codename: "bookworm".to_string(),
            is_proxmox: false,
        };
        let adapter = Arc::new(SshAdapter::new(mem.clone(), mock.clone(), backup, os));
        (mem, mock, SshService::new(adapter))
    }

    #[tokio::test]
    async fn test_configure_rejects_invalid_policy() {
        let (_, mock, service) = service(OsType::Debian);
        let config = SshConfig {
            port: 0,
            ..Default::default()
        };

        assert!(service.configure(&config).await.is_err());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_disable_root_rewrites_managed_fragment() {
        let (mem, mock, service) = service(OsType::Debian);
        mem.insert_file(
            "/etc/ssh/sshd_config",
            "Port 22\nPermitRootLogin yes\nAllowUsers root ops\n",
            0o644,
        );

        service.disable_root_access().await.unwrap();

        // Written to the drop-in, not back over the canonical file
        let written = mem
            .contents_of("/etc/ssh/sshd_config.d/hardn.conf")
            .unwrap();
        assert!(written.contains("PermitRootLogin no"));
        assert!(written.contains("AllowUsers ops\n"));
        assert!(!written.contains("root"));
        assert!(mock.was_called("systemctl restart ssh"));
    }

    #[tokio::test]
    async fn test_add_authorized_key_validates_first() {
        let (mem, _, service) = service(OsType::Debian);

        assert!(service
            .add_authorized_key("ops", "junk")
            .await
            .is_err());
        assert!(mem.contents_of("/home/ops/.ssh/authorized_keys").is_none());

        service
            .add_authorized_key("ops", "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIedb ops@host")
            .await
            .unwrap();
        assert!(mem.contents_of("/home/ops/.ssh/authorized_keys").is_some());
    }
}
