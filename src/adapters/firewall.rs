// file: src/adapters/firewall.rs
// version: 1.0.0
// guid: 8b1f6c27-94da-45e8-b0c1-3f9ae65d218a

//! ufw-backed firewall adapter

use crate::model::{FirewallConfig, FirewallPolicy, FirewallProtocol, FirewallRule, FirewallStatus};
use crate::platform::{Commander, FileSystem};
use crate::ports::{BackupPort, FirewallPort};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const APP_PROFILES_FILE: &str = "/etc/ufw/applications.d/hardn";

/// Target token for a rule: `2222/tcp` for port rules, bare protocol
/// for icmp.
fn rule_target(rule: &FirewallRule) -> String {
    match rule.protocol {
        FirewallProtocol::Icmp => rule.protocol.as_str().to_string(),
        _ => format!("{}/{}", rule.port, rule.protocol.as_str()),
    }
}

/// Parse `ufw status verbose` output into a status snapshot.
pub fn parse_ufw_status(output: &str) -> FirewallStatus {
    let mut status = FirewallStatus::default();
    let mut in_rules = false;

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("Status:") {
            status.enabled = trimmed.contains("active");
        } else if trimmed.starts_with("Default:") {
            status.default_incoming = if trimmed.contains("deny (incoming)") {
                Some(FirewallPolicy::Deny)
            } else if trimmed.contains("allow (incoming)") {
                Some(FirewallPolicy::Allow)
            } else {
                None
            };
            status.default_outgoing = if trimmed.contains("allow (outgoing)") {
                Some(FirewallPolicy::Allow)
            } else if trimmed.contains("deny (outgoing)") {
                Some(FirewallPolicy::Deny)
            } else {
                None
            };
        } else if trimmed.starts_with("--") {
            in_rules = true;
        } else if in_rules && !trimmed.is_empty() {
            status.rules.push(trimmed.to_string());
        }
    }

    status.configured = status.default_incoming == Some(FirewallPolicy::Deny)
        && status.default_outgoing == Some(FirewallPolicy::Allow)
        && status
            .rules
            .iter()
            .any(|rule| rule.contains("/tcp") && rule.contains("ALLOW IN"));
    status
}

fn render_profiles(config: &FirewallConfig) -> String {
    let mut out = String::new();
    for profile in &config.application_profiles {
        out.push_str(&format!(
            "[{}]\ntitle={}\ndescription={}\nports={}\n\n",
            profile.name,
            profile.title,
            profile.description,
            profile.ports.join(",")
        ));
    }
    out
}

pub struct FirewallAdapter {
    fs: Arc<dyn FileSystem>,
    commander: Arc<dyn Commander>,
    backup: Arc<dyn BackupPort>,
}

impl FirewallAdapter {
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

    async fn install_profiles(&self, config: &FirewallConfig) -> Result<()> {
        if config.application_profiles.is_empty() {
            return Ok(());
        }
        let path = Path::new(APP_PROFILES_FILE);
        if let Some(parent) = path.parent() {
            if !self.fs.exists(parent) {
                self.fs.create_dir_all(parent, 0o755)?;
            }
        }
        self.backup.backup_file(path).await?;
        self.fs
            .write(path, render_profiles(config).as_bytes(), 0o644)?;

        for profile in &config.application_profiles {
            self.commander
                .execute(
                    "ufw",
                    &["allow", "from", "any", "to", "any", "app", &profile.name],
                )
                .await?;
        }
        Ok(())
    }

    async fn apply_rule(&self, rule: &FirewallRule) -> Result<()> {
        let target = rule_target(rule);
        let mut args: Vec<&str> = vec![rule.action.as_str(), &target];
        if !rule.source_ip.is_empty() {
            args.push("from");
            args.push(&rule.source_ip);
        }
        if !rule.description.is_empty() {
            args.push("comment");
            args.push(&rule.description);
        }
        self.commander.execute("ufw", &args).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FirewallPort for FirewallAdapter {
    async fn is_available(&self) -> bool {
        self.commander.succeeds("which", &["ufw"]).await
    }

    async fn apply(&self, config: &FirewallConfig) -> Result<()> {
        debug!(
            "Applying firewall config: {} rules, {} profiles",
            config.rules.len(),
            config.application_profiles.len()
        );

        self.commander
            .execute("ufw", &["default", config.default_incoming.as_str(), "incoming"])
            .await?;
        self.commander
            .execute("ufw", &["default", config.default_outgoing.as_str(), "outgoing"])
            .await?;

        // Start from a clean slate so removed rules do not linger.
        self.commander.execute("ufw", &["disable"]).await?;
        self.commander
            .execute_with_input("ufw", &["reset"], "y\n")
            .await?;

        self.install_profiles(config).await?;

        for rule in &config.rules {
            self.apply_rule(rule).await?;
        }

        if config.enabled {
            self.commander
                .execute_with_input("ufw", &["enable"], "y\n")
                .await?;
            info!("Firewall enabled");
        }
        Ok(())
    }

    async fn status(&self) -> Result<FirewallStatus> {
        let output = self
            .commander
            .execute("ufw", &["status", "verbose"])
            .await?;
        Ok(parse_ufw_status(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BackupConfig, FirewallProfile};
    use crate::platform::{MemoryFileSystem, MockCommander};
    use std::path::PathBuf;

    const ACTIVE_STATUS: &str = "Status: active\n\
         Logging: on (low)\n\
         Default: deny (incoming), allow (outgoing), disabled (routed)\n\
         New profiles: skip\n\
         \n\
         To                         Action      From\n\
         --                         ------      ----\n\
         2222/tcp                   ALLOW IN    Anywhere\n\
         80/tcp                     ALLOW IN    Anywhere\n";

    fn adapter() -> (Arc<MemoryFileSystem>, Arc<MockCommander>, FirewallAdapter) {
        let mem = Arc::new(MemoryFileSystem::new());
        let mock = Arc::new(MockCommander::new());
        let backup = Arc::new(crate::adapters::BackupAdapter::new(
            mem.clone(),
            BackupConfig {
                enabled: false,
                backup_dir: PathBuf::from("/var/backups/hardn"),
            },
        ));
        let adapter = FirewallAdapter::new(mem.clone(), mock.clone(), backup);
        (mem, mock, adapter)
    }

    #[tokio::test]
    async fn test_apply_command_sequence() {
        let (_, mock, adapter) = adapter();
        let config = FirewallConfig::secure_baseline(2222, &[80], Vec::new());

        adapter.apply(&config).await.unwrap();

        let calls: Vec<String> = mock.recorded().into_iter().map(|c| c.command).collect();
        assert_eq!(calls[0], "ufw default deny incoming");
        assert_eq!(calls[1], "ufw default allow outgoing");
        assert_eq!(calls[2], "ufw disable");
        assert_eq!(calls[3], "ufw reset");
        assert!(calls[4].starts_with("ufw allow 2222/tcp"));
        assert!(calls[5].starts_with("ufw allow 80/tcp"));
        assert_eq!(calls.last().map(String::as_str), Some("ufw enable"));
    }

    #[tokio::test]
    async fn test_reset_and_enable_are_confirmed() {
        let (_, mock, adapter) = adapter();
        let config = FirewallConfig::secure_baseline(22, &[], Vec::new());

        adapter.apply(&config).await.unwrap();

        let confirmed: Vec<_> = mock
            .recorded()
            .into_iter()
            .filter(|call| call.input.as_deref() == Some("y\n"))
            .map(|call| call.command)
            .collect();
        assert_eq!(confirmed, vec!["ufw reset", "ufw enable"]);
    }

    #[tokio::test]
    async fn test_disabled_config_skips_enable() {
        let (_, mock, adapter) = adapter();
        let mut config = FirewallConfig::secure_baseline(22, &[], Vec::new());
        config.enabled = false;

        adapter.apply(&config).await.unwrap();

        assert!(!mock.was_called("ufw enable"));
    }

    #[tokio::test]
    async fn test_profiles_written_and_allowed() {
        let (mem, mock, adapter) = adapter();
        let profiles = vec![FirewallProfile {
            name: "WebServer".to_string(),
            title: "Web server".to_string(),
            description: "http and https".to_string(),
            ports: vec!["80/tcp".to_string(), "443/tcp".to_string()],
        }];
        let config = FirewallConfig::secure_baseline(22, &[], profiles);

        adapter.apply(&config).await.unwrap();

        let written = mem.contents_of(APP_PROFILES_FILE).unwrap();
        assert!(written.contains("[WebServer]"));
        assert!(written.contains("ports=80/tcp,443/tcp"));
        assert_eq!(mem.mode_of(APP_PROFILES_FILE), Some(0o644));
        assert!(mock.was_called("ufw allow from any to any app WebServer"));
    }

    #[tokio::test]
    async fn test_rule_with_source_and_comment() {
        let (_, mock, adapter) = adapter();
        let rule = FirewallRule {
            action: crate::model::FirewallAction::Deny,
            protocol: FirewallProtocol::Udp,
            port: 53,
            source_ip: "10.0.0.0/8".to_string(),
            description: "no lan dns".to_string(),
        };
        adapter.apply_rule(&rule).await.unwrap();

        assert!(mock.was_called("ufw deny 53/udp from 10.0.0.0/8 comment no lan dns"));
    }

    #[tokio::test]
    async fn test_status_parses_active_output() {
        let (_, mock, adapter) = adapter();
        mock.respond("ufw status verbose", ACTIVE_STATUS);

        let status = adapter.status().await.unwrap();
        assert!(status.enabled);
        assert!(status.configured);
        assert_eq!(status.default_incoming, Some(FirewallPolicy::Deny));
        assert_eq!(status.rules.len(), 2);
    }

    #[test]
    fn test_parse_inactive_output() {
        let status = parse_ufw_status("Status: inactive\n");
        assert!(!status.enabled);
        assert!(!status.configured);
        assert!(status.rules.is_empty());
    }

    #[test]
    fn test_icmp_rule_renders_without_port() {
        let rule = FirewallRule {
            action: crate::model::FirewallAction::Allow,
            protocol: FirewallProtocol::Icmp,
            port: 0,
            source_ip: String::new(),
            description: String::new(),
        };
        assert_eq!(rule_target(&rule), "icmp");
    }
}
