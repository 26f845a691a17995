// file: src/model/harden.rs
// version: 1.0.0
// guid: 91c7e2a4-d58f-4b36-a0c1-2e84f7d93b65

//! Composite request for the end-to-end hardening run

use serde::{Deserialize, Serialize};

/// Everything `harden` needs to bring a host to the secure baseline.
///
/// Root login over SSH is not part of the request on purpose: the
/// orchestrator always disables it, whatever the configuration says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardeningConfig {
    /// Create (or augment) the admin account named below
    pub create_user: bool,
    pub username: String,
    pub sudo_no_password: bool,
    /// Public keys installed for the admin account
    pub ssh_keys: Vec<String>,
    pub ssh_port: u16,
    pub ssh_listen_addresses: Vec<String>,
    pub ssh_allowed_users: Vec<String>,
    pub ssh_key_paths: Vec<String>,
    pub enable_firewall: bool,
    /// Extra tcp ports kept open besides the SSH port
    pub allowed_ports: Vec<u16>,
    pub configure_dns: bool,
    pub nameservers: Vec<String>,
    pub enable_app_armor: bool,
    pub enable_lynis: bool,
    pub enable_unattended_upgrades: bool,
}

impl Default for HardeningConfig {
    fn default() -> Self {
        Self {
            create_user: false,
            username: String::new(),
            sudo_no_password: true,
            ssh_keys: Vec::new(),
            ssh_port: 22,
            ssh_listen_addresses: vec!["0.0.0.0".to_string()],
            ssh_allowed_users: Vec::new(),
            ssh_key_paths: Vec::new(),
            enable_firewall: true,
            allowed_ports: Vec::new(),
            configure_dns: false,
            nameservers: Vec::new(),
            enable_app_armor: false,
            enable_lynis: false,
            enable_unattended_upgrades: false,
        }
    }
}

impl HardeningConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.create_user && self.username.trim().is_empty() {
            return Err(crate::error::HardnError::validation(
                "createUser requires a username",
            ));
        }
        if self.ssh_port == 0 {
            return Err(crate::error::HardnError::validation(
                "ssh port must be between 1 and 65535",
            ));
        }
        if self.allowed_ports.iter().any(|&p| p == 0) {
            return Err(crate::error::HardnError::validation(
                "allowed ports must be between 1 and 65535",
            ));
        }
        if self.configure_dns {
            if self.nameservers.is_empty() {
                return Err(crate::error::HardnError::validation(
                    "configureDns requires at least one nameserver",
                ));
            }
            for ns in &self.nameservers {
                if ns.parse::<std::net::IpAddr>().is_err() {
                    return Err(crate::error::HardnError::Validation(format!(
                        "invalid nameserver address: {}",
                        ns
                    )));
                }
            }
        }
        Ok(())
    }
}
