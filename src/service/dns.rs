// file: src/service/dns.rs
// version: 1.0.0
// guid: e8b05d29-4a71-4c36-9e84-f2d61c03a875

//! Resolver policy decisions

use crate::model::DnsConfig;
use crate::ports::DnsPort;
use crate::Result;
use std::sync::Arc;

pub struct DnsService {
    port: Arc<dyn DnsPort>,
}

impl DnsService {
    pub fn new(port: Arc<dyn DnsPort>) -> Self {
        Self { port }
    }

    pub async fn configure(&self, config: &DnsConfig) -> Result<()> {
        config.validate()?;
        self.port.configure(config).await
    }

    /// Apply the given nameservers with the `lan` local domain, or the
    /// secure default resolvers when none are supplied.
    pub async fn configure_nameservers(&self, nameservers: &[String]) -> Result<()> {
        let config = if nameservers.is_empty() {
            DnsConfig::secure_default()
        } else {
            DnsConfig {
                nameservers: nameservers.to_vec(),
                domain: "lan".to_string(),
                search: Vec::new(),
            }
        };
        self.configure(&config).await
    }

    pub async fn current(&self) -> Result<DnsConfig> {
        self.port.current().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BackupAdapter, DnsAdapter};
    use crate::model::BackupConfig;
    use crate::platform::{MemoryFileSystem, MockCommander};
    use std::path::PathBuf;

    fn service() -> (Arc<MemoryFileSystem>, Arc<MockCommander>, DnsService) {
        let mem = Arc::new(MemoryFileSystem::new());
        let mock = Arc::new(MockCommander::new());
        let backup = Arc::new(BackupAdapter::new(
            mem.clone(),
            BackupConfig {
                enabled: false,
                backup_dir: PathBuf::from("/var/backups/hardn"),
            },
        ));
        let adapter = Arc::new(DnsAdapter::new(mem.clone(), mock.clone(), backup));
        (mem, mock, DnsService::new(adapter))
    }

    #[tokio::test]
    async fn test_invalid_nameserver_rejected() {
        let (mem, _, service) = service();

        let err = service
            .configure_nameservers(&["not-an-ip".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid nameserver"));
        assert!(mem.contents_of("/etc/systemd/resolved.conf").is_none());
    }

    #[tokio::test]
    async fn test_empty_list_uses_secure_default() {
        let (mem, _, service) = service();

        service.configure_nameservers(&[]).await.unwrap();

        let written = mem.contents_of("/etc/systemd/resolved.conf").unwrap();
        assert!(written.contains("DNS=1.1.1.1 1.0.0.1"));
        assert!(written.contains("Domains=lan"));
    }
}
