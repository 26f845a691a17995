// file: src/manager/ssh.rs
// version: 1.0.0
// guid: 9d4b7e20-5c18-4f62-a3d9-07e5b28c41f7

//! Secure-shell daemon intents

use crate::model::SshConfig;
use crate::service::SshService;
use crate::Result;
use std::path::PathBuf;
use std::sync::Arc;

pub struct SshManager {
    service: Arc<SshService>,
}

impl SshManager {
    pub fn new(service: Arc<SshService>) -> Self {
        Self { service }
    }

    /// Apply the hardening baseline to the daemon.
    ///
    /// Root login is disabled here unconditionally; callers cannot opt
    /// out of that through this path.
    pub async fn harden_daemon(
        &self,
        port: u16,
        listen_addresses: Vec<String>,
        allowed_users: Vec<String>,
        key_paths: Vec<String>,
    ) -> Result<()> {
        let config = SshConfig {
            port,
            listen_addresses,
            permit_root_login: false,
            allowed_users,
            key_paths,
            auth_methods: Vec::new(),
            config_file_path: PathBuf::new(),
        };
        self.service.configure(&config).await
    }

    /// Apply an explicit daemon policy as given
    pub async fn apply(&self, config: &SshConfig) -> Result<()> {
        self.service.configure(config).await
    }

    /// Rewrite the managed config fragment with root login refused
    pub async fn disable_root(&self) -> Result<()> {
        self.service.disable_root_access().await
    }

    pub async fn current(&self) -> Result<SshConfig> {
        self.service.current().await
    }

    pub async fn add_authorized_key(&self, username: &str, public_key: &str) -> Result<()> {
        self.service.add_authorized_key(username, public_key).await
    }
}
