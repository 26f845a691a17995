// file: src/platform/network.rs
// version: 1.0.0
// guid: 4a6c1d89-f237-4b50-9e14-c8d25a93e671

//! Network interface enumeration seam

use crate::Result;
use std::net::Ipv4Addr;

/// Read-only view of the host's interface addresses
pub trait NetworkInfo: Send + Sync {
    /// IPv4 addresses assigned to any interface, loopback included
    fn ipv4_addresses(&self) -> Result<Vec<Ipv4Addr>>;

    /// True when any interface address falls under the dotted prefix,
    /// e.g. prefix "192.168.7" matches 192.168.7.20.
    fn has_subnet_prefix(&self, prefix: &str) -> Result<bool> {
        let prefix = prefix.trim_end_matches('.');
        if prefix.is_empty() {
            return Ok(false);
        }
        let needle = format!("{}.", prefix);
        Ok(self
            .ipv4_addresses()?
            .iter()
            .any(|addr| addr.to_string().starts_with(&needle)))
    }
}

/// Live implementation backed by the OS interface table
#[derive(Debug, Default, Clone)]
pub struct SystemNetworkInfo;

impl SystemNetworkInfo {
    pub fn new() -> Self {
        Self
    }
}

impl NetworkInfo for SystemNetworkInfo {
    fn ipv4_addresses(&self) -> Result<Vec<Ipv4Addr>> {
        use network_interface::{NetworkInterface, NetworkInterfaceConfig};

        let interfaces = NetworkInterface::show()
            .map_err(|e| crate::error::HardnError::probe(format!("interface listing: {}", e)))?;

        let mut addresses = Vec::new();
        for interface in interfaces {
            for addr in interface.addr {
                if let std::net::IpAddr::V4(v4) = addr.ip() {
                    addresses.push(v4);
                }
            }
        }
        Ok(addresses)
    }
}

/// Fixed-address double for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryNetworkInfo {
    addresses: Vec<Ipv4Addr>,
}

impl MemoryNetworkInfo {
    pub fn new(addresses: Vec<Ipv4Addr>) -> Self {
        Self { addresses }
    }
}

impl NetworkInfo for MemoryNetworkInfo {
    fn ipv4_addresses(&self) -> Result<Vec<Ipv4Addr>> {
        Ok(self.addresses.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_prefix_match() {
        let net = MemoryNetworkInfo::new(vec![
            Ipv4Addr::new(127, 0, 0, 1),
            Ipv4Addr::new(192, 168, 7, 20),
        ]);

        assert!(net.has_subnet_prefix("192.168.7").unwrap());
        assert!(net.has_subnet_prefix("192.168.7.").unwrap());
        assert!(!net.has_subnet_prefix("192.168.70").unwrap());
        assert!(!net.has_subnet_prefix("10.0.0").unwrap());
        assert!(!net.has_subnet_prefix("").unwrap());
    }

    #[test]
    fn test_prefix_is_octet_aligned() {
        // "192.168.7" must not match 192.168.71.x
        let net = MemoryNetworkInfo::new(vec![Ipv4Addr::new(192, 168, 71, 5)]);
        assert!(!net.has_subnet_prefix("192.168.7").unwrap());
    }
}
