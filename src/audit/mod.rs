// file: src/audit/mod.rs
// version: 1.0.0
// guid: d38f6a01-7e54-4b29-9c03-1f86b4d27e50

//! Read-only security-posture probes
//!
//! Every probe degrades instead of failing: an unreadable sshd config
//! counts as vulnerable, a missing tool counts as unconfigured. The
//! evaluator therefore always produces a complete `SecurityStatus`,
//! never an error, and requires no privileges.

use crate::adapters::firewall::parse_ufw_status;
use crate::adapters::ssh::{effective_config_path, parse_config};
use crate::model::{OsInfo, OsType, SecurityStatus};
use crate::platform::{Commander, FileSystem};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Sudoers drop-in names that do not indicate an admin account
const IGNORED_SUDOERS_ENTRIES: [&str; 2] = ["README", "root"];

pub struct PostureEvaluator {
    fs: Arc<dyn FileSystem>,
    commander: Arc<dyn Commander>,
    os: OsInfo,
}

impl PostureEvaluator {
    pub fn new(fs: Arc<dyn FileSystem>, commander: Arc<dyn Commander>, os: OsInfo) -> Self {
        Self { fs, commander, os }
    }

    /// Probe the host and grade its posture
    pub async fn evaluate(&self) -> SecurityStatus {
        let mut status = SecurityStatus::default();

        self.probe_sshd(&mut status);
        self.probe_firewall(&mut status).await;
        status.secure_users = self.probe_secure_users();
        status.app_armor_enabled = self.probe_app_armor().await;
        status.unattended_upgrades = self.probe_unattended_upgrades().await;
        status.sudo_configured = self.probe_sudo().await;

        status
    }

    /// Root login, password auth and port, from the effective sshd config.
    ///
    /// sshd permits root login and password auth unless told otherwise,
    /// so an absent or unreadable config reads as vulnerable.
    fn probe_sshd(&self, status: &mut SecurityStatus) {
        let path = effective_config_path(&self.fs, &self.os);
        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("sshd config probe failed for {}: {}", path.display(), e);
                status.root_login_enabled = true;
                status.password_auth_disabled = false;
                status.ssh_port_non_default = false;
                return;
            }
        };

        let parsed = parse_config(&content);
        status.root_login_enabled = parsed.permit_root_login;
        status.ssh_port_non_default = parsed.port != 22;
        status.password_auth_disabled = password_auth_disabled(&content);
    }

    async fn probe_firewall(&self, status: &mut SecurityStatus) {
        match self.commander.execute("ufw", &["status", "verbose"]).await {
            Ok(output) => {
                let firewall = parse_ufw_status(&output);
                status.firewall_enabled = firewall.enabled;
                status.firewall_configured = firewall.configured;
            }
            Err(e) => {
                debug!("ufw probe failed: {}", e);
            }
        }
    }

    /// A non-root admin exists: either a sudoers drop-in beyond the
    /// stock entries, or a non-root member of the admin group.
    fn probe_secure_users(&self) -> bool {
        if let Ok(entries) = self.fs.list_dir(Path::new("/etc/sudoers.d")) {
            let admin_entry = entries.iter().any(|path| {
                path.file_name()
                    .map(|name| {
                        let name = name.to_string_lossy();
                        !IGNORED_SUDOERS_ENTRIES.contains(&name.as_ref())
                    })
                    .unwrap_or(false)
            });
            if admin_entry {
                return true;
            }
        }

        self.admin_group_has_non_root_member()
    }

    fn admin_group_has_non_root_member(&self) -> bool {
        let Ok(content) = self.fs.read_to_string(Path::new("/etc/group")) else {
            return false;
        };
        let group = self.os.os_type.sudo_group();
        for line in content.lines() {
            let mut fields = line.split(':');
            if fields.next() != Some(group) {
                continue;
            }
            // name:password:gid:member,member
            let members = fields.nth(2).unwrap_or("");
            return members
                .split(',')
                .map(|m| m.trim())
                .any(|m| !m.is_empty() && m != "root");
        }
        false
    }

    async fn probe_app_armor(&self) -> bool {
        match self.commander.execute("aa-status", &[]).await {
            Ok(output) => {
                output.contains("apparmor module is loaded") && enforced_profiles(&output) > 0
            }
            Err(e) => {
                debug!("aa-status probe failed: {}", e);
                false
            }
        }
    }

    async fn probe_unattended_upgrades(&self) -> bool {
        match self.os.os_type {
            OsType::Alpine => self.fs.exists(Path::new("/etc/periodic/daily/apk-upgrade")),
            OsType::Debian | OsType::Ubuntu => {
                self.commander
                    .succeeds("dpkg", &["-l", "unattended-upgrades"])
                    .await
                    && self
                        .commander
                        .succeeds("systemctl", &["is-enabled", "unattended-upgrades"])
                        .await
            }
        }
    }

    async fn probe_sudo(&self) -> bool {
        self.commander.succeeds("which", &["sudo"]).await
            && self.fs.exists(Path::new("/etc/sudoers"))
    }
}

/// `PasswordAuthentication no` appears as an effective directive
fn password_auth_disabled(content: &str) -> bool {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(directive), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        if directive.eq_ignore_ascii_case("passwordauthentication") {
            return value.eq_ignore_ascii_case("no");
        }
    }
    false
}

/// Count from the "N profiles are in enforce mode" line, 0 when absent
fn enforced_profiles(output: &str) -> usize {
    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_suffix("profiles are in enforce mode.") {
            if let Ok(count) = rest.trim().parse::<usize>() {
                return count;
            }
        }
        // Some releases print without the trailing period
        if line.ends_with("profiles are in enforce mode") {
            if let Some(first) = line.split_whitespace().next() {
                if let Ok(count) = first.parse::<usize>() {
                    return count;
                }
            }
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryFileSystem, MockCommander};

    const AA_STATUS_ENFORCING: &str = "apparmor module is loaded.\n\
36 profiles are loaded.\n\
34 profiles are in enforce mode.\n\
2 profiles are in complain mode.\n";

    const UFW_ACTIVE: &str = "Status: active\n\
Default: deny (incoming), allow (outgoing), disabled (routed)\n\
\n\
To                         Action      From\n\
--                         ------      ----\n\
2222/tcp                   ALLOW IN    Anywhere\n";

    fn debian() -> OsInfo {
        OsInfo {
            os_type: OsType::Debian,
            version: "12".to_string(),
            codename: "bookworm".to_string(),
            is_proxmox: false,
        }
    }

    fn evaluator(
        mem: Arc<MemoryFileSystem>,
        mock: Arc<MockCommander>,
        os: OsInfo,
    ) -> PostureEvaluator {
        PostureEvaluator::new(mem, mock, os)
    }

    #[tokio::test]
    async fn test_unhardened_host_grades_critical() {
        let mem = Arc::new(MemoryFileSystem::new());
        let mock = Arc::new(MockCommander::new());
        // Nothing on disk, ufw absent, apparmor absent, no unattended timer
        mock.fail_program("ufw", 1, "ufw: command not found");
        mock.fail_program("aa-status", 127, "not found");
        mock.fail("systemctl is-enabled unattended-upgrades", 1, "disabled");
        mock.fail("which sudo", 1, "");

        let status = evaluator(mem, mock, debian()).evaluate().await;
        assert!(status.root_login_enabled);
        assert!(!status.firewall_enabled);
        assert!(!status.secure_users);
        assert!(!status.password_auth_disabled);
        assert!(!status.unattended_upgrades);
        assert_eq!(status.risk_level().as_str(), "Critical");
    }

    #[tokio::test]
    async fn test_hardened_host_grades_minimal() {
        let mem = Arc::new(MemoryFileSystem::new());
        mem.insert_file(
            "/etc/ssh/sshd_config.d/hardn.conf",
            "Port 2222\nPermitRootLogin no\nPasswordAuthentication no\n",
            0o644,
        );
        mem.insert_file("/etc/sudoers.d/ops", "ops ALL=(ALL) ALL\n", 0o440);
        mem.insert_file("/etc/sudoers", "root ALL=(ALL:ALL) ALL\n", 0o440);

        let mock = Arc::new(MockCommander::new());
        mock.respond("ufw status verbose", UFW_ACTIVE);
        mock.respond("aa-status", AA_STATUS_ENFORCING);
        // dpkg, systemctl and which succeed unscripted

        let status = evaluator(mem, mock, debian()).evaluate().await;
        assert!(!status.root_login_enabled);
        assert!(status.firewall_enabled);
        assert!(status.firewall_configured);
        assert!(status.secure_users);
        assert!(status.app_armor_enabled);
        assert!(status.unattended_upgrades);
        assert!(status.sudo_configured);
        assert!(status.ssh_port_non_default);
        assert!(status.password_auth_disabled);
        assert_eq!(status.score(), 9);
        assert_eq!(status.risk_level().as_str(), "Minimal");
    }

    #[tokio::test]
    async fn test_readme_and_root_entries_do_not_count() {
        let mem = Arc::new(MemoryFileSystem::new());
        mem.insert_file("/etc/sudoers.d/README", "#\n", 0o440);
        mem.insert_file("/etc/sudoers.d/root", "root ALL=(ALL) ALL\n", 0o440);
        mem.insert_file("/etc/group", "sudo:x:27:root\n", 0o644);

        let mock = Arc::new(MockCommander::new());
        let status = evaluator(mem.clone(), mock, debian()).evaluate().await;
        assert!(!status.secure_users);

        // A non-root group member flips the indicator
        mem.insert_file("/etc/group", "sudo:x:27:root,ops\n", 0o644);
        let mock = Arc::new(MockCommander::new());
        let status = evaluator(mem, mock, debian()).evaluate().await;
        assert!(status.secure_users);
    }

    #[tokio::test]
    async fn test_wheel_group_on_alpine() {
        let mem = Arc::new(MemoryFileSystem::new());
        mem.insert_file("/etc/group", "wheel:x:10:ops\n", 0o644);
        let alpine = OsInfo {
            os_type: OsType::Alpine,
            version: "3.19.1".to_string(),
            codename: "3.19.1".to_string(),
            is_proxmox: false,
        };

        let mock = Arc::new(MockCommander::new());
        let status = evaluator(mem, mock, alpine).evaluate().await;
        assert!(status.secure_users);
    }

    #[tokio::test]
    async fn test_alpine_unattended_is_the_periodic_script() {
        let mem = Arc::new(MemoryFileSystem::new());
        mem.insert_file(
            "/etc/periodic/daily/apk-upgrade",
            "#!/bin/sh\napk upgrade --no-cache\n",
            0o755,
        );
        let alpine = OsInfo {
            os_type: OsType::Alpine,
            version: "3.19.1".to_string(),
            codename: "3.19.1".to_string(),
            is_proxmox: false,
        };

        let mock = Arc::new(MockCommander::new());
        let status = evaluator(mem, mock.clone(), alpine).evaluate().await;
        assert!(status.unattended_upgrades);
        // The Debian probes were never used
        assert!(!mock.was_called("dpkg -l unattended-upgrades"));
    }

    #[tokio::test]
    async fn test_complain_mode_only_is_not_enforcing() {
        let output = "apparmor module is loaded.\n\
5 profiles are loaded.\n\
0 profiles are in enforce mode.\n\
5 profiles are in complain mode.\n";
        assert_eq!(enforced_profiles(output), 0);
        assert_eq!(enforced_profiles(AA_STATUS_ENFORCING), 34);

        let mem = Arc::new(MemoryFileSystem::new());
        let mock = Arc::new(MockCommander::new());
        mock.respond("aa-status", output);
        let status = evaluator(mem, mock, debian()).evaluate().await;
        assert!(!status.app_armor_enabled);
    }

    #[test]
    fn test_password_auth_scan_skips_comments() {
        assert!(password_auth_disabled("PasswordAuthentication no\n"));
        assert!(password_auth_disabled("passwordauthentication NO\n"));
        assert!(!password_auth_disabled("# PasswordAuthentication no\n"));
        assert!(!password_auth_disabled("PasswordAuthentication yes\n"));
        assert!(!password_auth_disabled("Port 22\n"));
    }
}
