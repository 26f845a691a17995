// file: src/service/firewall.rs
// version: 1.0.0
// guid: 7f2a8c14-93e6-4b50-a7d2-c41e85f09b63

//! Firewall policy decisions

use crate::model::{FirewallConfig, FirewallProfile, FirewallStatus};
use crate::ports::FirewallPort;
use crate::Result;
use std::sync::Arc;

pub struct FirewallService {
    port: Arc<dyn FirewallPort>,
}

impl FirewallService {
    pub fn new(port: Arc<dyn FirewallPort>) -> Self {
        Self { port }
    }

    pub async fn apply(&self, config: &FirewallConfig) -> Result<()> {
        config.validate()?;
        if !self.port.is_available().await {
            return Err(crate::error::HardnError::missing_command("ufw"));
        }
        self.port.apply(config).await
    }

    /// Deny-all-incoming baseline permitting the ssh port plus extras
    pub async fn apply_secure_baseline(
        &self,
        ssh_port: u16,
        allowed_ports: &[u16],
        profiles: Vec<FirewallProfile>,
    ) -> Result<()> {
        let config = FirewallConfig::secure_baseline(ssh_port, allowed_ports, profiles);
        self.apply(&config).await
    }

    pub async fn status(&self) -> Result<FirewallStatus> {
        self.port.status().await
    }
}
