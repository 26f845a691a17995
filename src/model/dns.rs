// file: src/model/dns.rs
// version: 1.0.0
// guid: 6d1f8a35-9b27-4c04-8d2e-f05a3c71b698

//! DNS resolver configuration

use serde::{Deserialize, Serialize};

/// Desired or observed resolver state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Resolver addresses in priority order
    pub nameservers: Vec<String>,
    /// Local domain, if any
    pub domain: String,
    /// Search suffixes in order
    pub search: Vec<String>,
}

impl DnsConfig {
    /// Cloudflare resolvers with the `lan` local domain
    pub fn secure_default() -> Self {
        Self {
            nameservers: vec!["1.1.1.1".to_string(), "1.0.0.1".to_string()],
            domain: "lan".to_string(),
            search: Vec::new(),
        }
    }

    /// A host counts as configured once at least one nameserver is present
    pub fn is_configured(&self) -> bool {
        !self.nameservers.is_empty()
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.nameservers.is_empty() {
            return Err(crate::error::HardnError::validation(
                "at least one nameserver is required",
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
        Ok(())
    }
}
