// file: src/manager/security.rs
// version: 1.0.0
// guid: f82a5d17-4c09-4e63-b1f8-60d3c7a92e45

//! End-to-end hardening orchestration
//!
//! `SecurityManager` owns the one composite operation: bring a host to
//! the secure baseline in a fixed order. The user must exist before the
//! daemon policy references it, the daemon must listen on its final
//! port before the firewall closes everything else, and the resolver
//! comes last because a bad resolver disrupts the package operations
//! the earlier steps depend on. A failing step aborts the run; partial
//! state persists and can be rolled back through the backup tree.

use super::{DnsManager, FirewallManager, PackageManager, SshManager, UserManager};
use crate::model::{FirewallProfile, HardeningConfig, OsInfo, OsType};
use crate::platform::Commander;
use crate::ports::LogPort;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SecurityManager {
    users: Arc<UserManager>,
    ssh: Arc<SshManager>,
    firewall: Arc<FirewallManager>,
    dns: Arc<DnsManager>,
    packages: Arc<PackageManager>,
    commander: Arc<dyn Commander>,
    journal: Arc<dyn LogPort>,
    os: OsInfo,
    /// Application profiles installed alongside the firewall baseline
    profiles: Vec<FirewallProfile>,
}

impl SecurityManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<UserManager>,
        ssh: Arc<SshManager>,
        firewall: Arc<FirewallManager>,
        dns: Arc<DnsManager>,
        packages: Arc<PackageManager>,
        commander: Arc<dyn Commander>,
        journal: Arc<dyn LogPort>,
        os: OsInfo,
        profiles: Vec<FirewallProfile>,
    ) -> Self {
        Self {
            users,
            ssh,
            firewall,
            dns,
            packages,
            commander,
            journal,
            os,
            profiles,
        }
    }

    /// Apply the full hardening plan.
    ///
    /// Root login over SSH ends up disabled regardless of the plan; the
    /// daemon step does not offer the permissive option.
    pub async fn harden_system(&self, config: &HardeningConfig) -> Result<()> {
        config.validate()?;
        self.journal_note("Hardening started").await;

        let result = self.run_steps(config).await;
        match &result {
            Ok(()) => {
                self.journal_note("Hardening completed").await;
                info!("Hardening run complete");
            }
            Err(e) => {
                self.journal_note(&format!("Hardening aborted: {}", e)).await;
            }
        }
        result
    }

    async fn run_steps(&self, config: &HardeningConfig) -> Result<()> {
        if config.create_user && !config.username.trim().is_empty() {
            info!("Step 1/4: admin account {}", config.username);
            self.users
                .create_admin(
                    &config.username,
                    config.sudo_no_password,
                    config.ssh_keys.clone(),
                )
                .await?;
        } else {
            debug!("Step 1/4 skipped: no admin account requested");
        }

        info!("Step 2/4: secure-shell daemon on port {}", config.ssh_port);
        self.ssh
            .harden_daemon(
                config.ssh_port,
                config.ssh_listen_addresses.clone(),
                config.ssh_allowed_users.clone(),
                config.ssh_key_paths.clone(),
            )
            .await?;

        if config.enable_firewall {
            info!("Step 3/4: firewall baseline");
            self.firewall
                .apply_baseline(config.ssh_port, &config.allowed_ports, self.profiles.clone())
                .await?;
        } else {
            debug!("Step 3/4 skipped: firewall not requested");
        }

        if config.configure_dns {
            info!("Step 4/4: resolver");
            self.dns.apply_nameservers(&config.nameservers).await?;
        } else {
            debug!("Step 4/4 skipped: resolver left alone");
        }

        if config.enable_app_armor {
            self.enable_app_armor().await?;
        }
        if config.enable_unattended_upgrades {
            info!("Enabling automatic security updates");
            self.packages.enable_auto_updates().await?;
        }
        if config.enable_lynis {
            self.run_lynis_audit().await?;
        }

        Ok(())
    }

    /// Install, start and enforce the AppArmor profile set
    async fn enable_app_armor(&self) -> Result<()> {
        info!("Enabling AppArmor enforcement");
        let packages: Vec<String> = match self.os.os_type {
            OsType::Alpine => vec!["apparmor".to_string()],
            _ => vec!["apparmor".to_string(), "apparmor-utils".to_string()],
        };
        self.packages.install_packages(&packages).await?;

        match self.os.os_type {
            OsType::Alpine => {
                self.commander
                    .execute("rc-update", &["add", "apparmor", "boot"])
                    .await?;
                self.commander
                    .execute("rc-service", &["apparmor", "start"])
                    .await?;
            }
            _ => {
                self.commander
                    .execute("systemctl", &["enable", "apparmor"])
                    .await?;
                self.commander
                    .execute("systemctl", &["start", "apparmor"])
                    .await?;
            }
        }

        // A fresh host may ship no profiles yet; that is not fatal
        if let Err(e) = self
            .commander
            .execute("sh", &["-c", "aa-enforce /etc/apparmor.d/*"])
            .await
        {
            warn!("Could not enforce AppArmor profiles: {}", e);
        }
        Ok(())
    }

    /// Install lynis if needed and record the resulting hardening index
    async fn run_lynis_audit(&self) -> Result<()> {
        info!("Running lynis system audit");
        if !self.packages.is_installed("lynis").await {
            self.packages.install_single("lynis").await?;
        }

        let output = self
            .commander
            .execute("lynis", &["audit", "system", "--quiet", "--no-colors"])
            .await?;
        if let Some(line) = output.lines().find(|l| l.contains("Hardening index")) {
            info!("{}", line.trim());
            self.journal_note(line.trim()).await;
        }
        Ok(())
    }

    /// Journal writes never fail an operation
    async fn journal_note(&self, line: &str) {
        if let Err(e) = self.journal.append(line).await {
            warn!("Could not write to the operation journal: {}", e);
        }
    }
}
