// file: src/adapters/host.rs
// version: 1.0.0
// guid: 4f8b2d69-0e17-4a53-9c28-b6d41e07f395

//! Read-only host facts for the info display

use crate::platform::Commander;
use crate::ports::HostPort;
use crate::Result;
use std::sync::Arc;
use sysinfo::System;

pub struct HostAdapter {
    commander: Arc<dyn Commander>,
}

impl HostAdapter {
    pub fn new(commander: Arc<dyn Commander>) -> Self {
        Self { commander }
    }
}

#[async_trait::async_trait]
impl HostPort for HostAdapter {
    async fn hostname(&self) -> Result<String> {
        let output = self.commander.execute("hostname", &[]).await?;
        Ok(output.trim().to_string())
    }

    async fn domain(&self) -> Result<String> {
        let output = self.commander.execute("domainname", &[]).await?;
        let domain = output.trim();
        // nis prints "(none)" when no domain is set
        if domain == "(none)" {
            Ok(String::new())
        } else {
            Ok(domain.to_string())
        }
    }

    async fn kernel(&self) -> Result<String> {
        let output = self.commander.execute("uname", &["-r"]).await?;
        Ok(output.trim().to_string())
    }

    async fn disk_usage(&self) -> Result<String> {
        self.commander.execute("df", &["-h"]).await
    }

    async fn memory_summary(&self) -> Result<String> {
        let mut system = System::new();
        system.refresh_memory();
        let to_mib = |bytes: u64| bytes / (1024 * 1024);
        Ok(format!(
            "{} MiB / {} MiB",
            to_mib(system.used_memory()),
            to_mib(system.total_memory())
        ))
    }

    async fn uptime_seconds(&self) -> Result<u64> {
        Ok(System::uptime())
    }
}
