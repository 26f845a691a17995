// file: src/adapters/dns.rs
// version: 1.0.0
// guid: 2e7c9f48-3a61-4d25-8b0f-d194c6e83a57

//! Resolver configuration across the three common back-ends

use crate::model::DnsConfig;
use crate::platform::{Commander, FileSystem};
use crate::ports::{BackupPort, DnsPort};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const RESOLV_CONF: &str = "/etc/resolv.conf";
const RESOLVED_CONF: &str = "/etc/systemd/resolved.conf";
const RESOLVCONF_HEAD: &str = "/etc/resolvconf/resolv.conf.d/head";

/// Render classic resolv.conf directives in stable order.
fn render_resolv(config: &DnsConfig) -> String {
    let mut out = String::new();
    if !config.domain.is_empty() {
        out.push_str(&format!("domain {}\n", config.domain));
    }
    if !config.search.is_empty() {
        out.push_str(&format!("search {}\n", config.search.join(" ")));
    }
    for ns in &config.nameservers {
        out.push_str(&format!("nameserver {}\n", ns));
    }
    out
}

/// Parse resolv.conf contents; comment lines start with `#` or `;`.
pub fn parse_resolv(content: &str) -> DnsConfig {
    let mut config = DnsConfig::default();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("nameserver") => {
                if let Some(addr) = tokens.next() {
                    config.nameservers.push(addr.to_string());
                }
            }
            Some("domain") => {
                if let Some(domain) = tokens.next() {
                    config.domain = domain.to_string();
                }
            }
            Some("search") => {
                config.search = tokens.map(str::to_string).collect();
            }
            _ => {}
        }
    }
    config
}

pub struct DnsAdapter {
    fs: Arc<dyn FileSystem>,
    commander: Arc<dyn Commander>,
    backup: Arc<dyn BackupPort>,
}

impl DnsAdapter {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        commander: Arc<dyn Commander>,
        backup: Arc<dyn BackupPort>,
    ) -> Self {
        Self {
            fs,
            commander,
            backup,
        }
    }

    async fn write_resolver_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !self.fs.exists(parent) {
                self.fs.create_dir_all(parent, 0o755)?;
            }
        }
        self.backup.backup_file(path).await?;
        self.fs.write(path, content.as_bytes(), 0o644)?;
        Ok(())
    }

    async fn configure_systemd_resolved(&self, config: &DnsConfig) -> Result<()> {
        let mut content = String::from("[Resolve]\n");
        content.push_str(&format!("DNS={}\n", config.nameservers.join(" ")));
        if !config.domain.is_empty() {
            content.push_str(&format!("Domains={}\n", config.domain));
        }
        self.write_resolver_file(Path::new(RESOLVED_CONF), &content)
            .await?;
        self.commander
            .execute("systemctl", &["restart", "systemd-resolved"])
            .await?;
        info!("Resolver configured through systemd-resolved");
        Ok(())
    }

    async fn configure_resolvconf(&self, config: &DnsConfig) -> Result<()> {
        self.write_resolver_file(Path::new(RESOLVCONF_HEAD), &render_resolv(config))
            .await?;
        self.commander.execute("resolvconf", &["-u"]).await?;
        info!("Resolver configured through resolvconf");
        Ok(())
    }

    async fn configure_plain(&self, config: &DnsConfig) -> Result<()> {
        self.write_resolver_file(Path::new(RESOLV_CONF), &render_resolv(config))
            .await?;
        info!("Resolver configured through {}", RESOLV_CONF);
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsPort for DnsAdapter {
    async fn configure(&self, config: &DnsConfig) -> Result<()> {
        if self
            .commander
            .succeeds("systemctl", &["is-active", "systemd-resolved"])
            .await
        {
            self.configure_systemd_resolved(config).await
        } else if self.commander.succeeds("which", &["resolvconf"]).await {
            self.configure_resolvconf(config).await
        } else {
            self.configure_plain(config).await
        }
    }

    async fn current(&self) -> Result<DnsConfig> {
        if !self.fs.exists(Path::new(RESOLV_CONF)) {
            debug!("{} not present, reporting empty resolver state", RESOLV_CONF);
            return Ok(DnsConfig::default());
        }
        let content = self.fs.read_to_string(Path::new(RESOLV_CONF))?;
        Ok(parse_resolv(&content))
    }
}
