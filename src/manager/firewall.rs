// file: src/manager/firewall.rs
// version: 1.0.0
// guid: 6a2e8f14-9c37-4d51-b8e0-25f4a9d17c63

//! Firewall intents

use crate::model::{FirewallConfig, FirewallProfile, FirewallStatus};
use crate::service::FirewallService;
use crate::Result;
use std::sync::Arc;

pub struct FirewallManager {
    service: Arc<FirewallService>,
}

impl FirewallManager {
    pub fn new(service: Arc<FirewallService>) -> Self {
        Self { service }
    }

    /// Apply an explicit firewall configuration
    pub async fn apply(&self, config: &FirewallConfig) -> Result<()> {
        self.service.apply(config).await
    }

    /// Deny-all-incoming baseline keeping ssh plus the listed tcp ports open
    pub async fn apply_baseline(
        &self,
        ssh_port: u16,
        allowed_ports: &[u16],
        profiles: Vec<FirewallProfile>,
    ) -> Result<()> {
        self.service
            .apply_secure_baseline(ssh_port, allowed_ports, profiles)
            .await
    }

    pub async fn status(&self) -> Result<FirewallStatus> {
        self.service.status().await
    }
}
