// file: src/manager/dns.rs
// version: 1.0.0
// guid: 3f8c1d72-6b49-4e05-92a8-d41e7f30b5c9

//! Resolver intents

use crate::model::DnsConfig;
use crate::service::DnsService;
use crate::Result;
use std::sync::Arc;

pub struct DnsManager {
    service: Arc<DnsService>,
}

impl DnsManager {
    pub fn new(service: Arc<DnsService>) -> Self {
        Self { service }
    }

    pub async fn apply(&self, config: &DnsConfig) -> Result<()> {
        self.service.configure(config).await
    }

    /// Apply the given nameservers under the `lan` local domain
    pub async fn apply_nameservers(&self, nameservers: &[String]) -> Result<()> {
        self.service.configure_nameservers(nameservers).await
    }

    pub async fn current(&self) -> Result<DnsConfig> {
        self.service.current().await
    }
}
