// file: src/model/firewall.rs
// version: 1.0.0
// guid: 8a4c6e29-1f5d-4b83-97a0-c2d5e8b13f46

//! Firewall rules, profiles and desired configuration

use serde::{Deserialize, Serialize};

/// Rule verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallAction {
    Allow,
    Deny,
}

impl FirewallAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirewallAction::Allow => "allow",
            FirewallAction::Deny => "deny",
        }
    }
}

/// Transport protocol a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallProtocol {
    Tcp,
    Udp,
    Icmp,
}

impl FirewallProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirewallProtocol::Tcp => "tcp",
            FirewallProtocol::Udp => "udp",
            FirewallProtocol::Icmp => "icmp",
        }
    }
}

/// Default policy direction value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallPolicy {
    Allow,
    Deny,
}

impl FirewallPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirewallPolicy::Allow => "allow",
            FirewallPolicy::Deny => "deny",
        }
    }
}

impl std::str::FromStr for FirewallPolicy {
    type Err = crate::error::HardnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(FirewallPolicy::Allow),
            "deny" => Ok(FirewallPolicy::Deny),
            _ => Err(crate::error::HardnError::Validation(format!(
                "unknown firewall policy: {}",
                s
            ))),
        }
    }
}

/// A single firewall rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallRule {
    pub action: FirewallAction,
    pub protocol: FirewallProtocol,
    /// Destination port; unused for icmp
    pub port: u16,
    /// Source address restriction; empty means any source
    #[serde(default)]
    pub source_ip: String,
    /// Free-text comment recorded with the rule
    #[serde(default)]
    pub description: String,
}

impl FirewallRule {
    /// Allow one tcp port from anywhere with a comment
    pub fn allow_tcp(port: u16, description: impl Into<String>) -> Self {
        Self {
            action: FirewallAction::Allow,
            protocol: FirewallProtocol::Tcp,
            port,
            source_ip: String::new(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        match self.protocol {
            FirewallProtocol::Tcp | FirewallProtocol::Udp => {
                if self.port == 0 {
                    return Err(crate::error::HardnError::validation(
                        "tcp/udp rules require a non-zero port",
                    ));
                }
            }
            FirewallProtocol::Icmp => {}
        }
        Ok(())
    }
}

/// A named group of ports installed as a ufw application profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallProfile {
    pub name: String,
    pub title: String,
    pub description: String,
    /// Port specs in ufw notation, e.g. "22/tcp" or "60000:61000/udp"
    pub ports: Vec<String>,
}

/// Desired state for the host firewall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallConfig {
    pub enabled: bool,
    pub default_incoming: FirewallPolicy,
    pub default_outgoing: FirewallPolicy,
    pub rules: Vec<FirewallRule>,
    pub application_profiles: Vec<FirewallProfile>,
}

impl FirewallConfig {
    /// Deny-all-incoming baseline permitting the ssh port plus extra tcp ports
    pub fn secure_baseline(
        ssh_port: u16,
        allowed_ports: &[u16],
        profiles: Vec<FirewallProfile>,
    ) -> Self {
        let mut rules = vec![FirewallRule::allow_tcp(ssh_port, "SSH access")];
        for port in allowed_ports {
            if *port != ssh_port {
                rules.push(FirewallRule::allow_tcp(
                    *port,
                    format!("Allowed service port {}", port),
                ));
            }
        }
        Self {
            enabled: true,
            default_incoming: FirewallPolicy::Deny,
            default_outgoing: FirewallPolicy::Allow,
            rules,
            application_profiles: profiles,
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        for rule in &self.rules {
            rule.validate()?;
        }
        let mut seen = std::collections::HashSet::new();
        for profile in &self.application_profiles {
            if profile.name.trim().is_empty() {
                return Err(crate::error::HardnError::validation(
                    "application profile name cannot be empty",
                ));
            }
            if !seen.insert(profile.name.clone()) {
                return Err(crate::error::HardnError::Validation(format!(
                    "duplicate application profile: {}",
                    profile.name
                )));
            }
        }
        Ok(())
    }
}

/// Observed state parsed from `ufw status verbose`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirewallStatus {
    /// `Status: active`
    pub enabled: bool,
    /// Deny-incoming/allow-outgoing defaults with at least one tcp allow rule
    pub configured: bool,
    pub default_incoming: Option<FirewallPolicy>,
    pub default_outgoing: Option<FirewallPolicy>,
    /// Raw rule lines following the column separator
    pub rules: Vec<String>,
}
