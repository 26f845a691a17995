// file: tests/harden_scenarios.rs
// version: 1.0.0
// guid: 1f5a8c03-7d62-4b91-ae45-c28f90d61b37

//! End-to-end hardening runs over the in-memory platform seams.
//!
//! Every test assembles the full manager stack the way the binary does
//! and drives it against a simulated host, so the whole pipeline from
//! plan to file contents and tool invocations is covered without root.

use hardn::config::HardnConfig;
use hardn::manager::MenuManager;
use hardn::model::{OsInfo, OsType, RiskLevel};
use hardn::platform::{
    Commander, FileSystem, MemoryFileSystem, MemoryNetworkInfo, MockCommander, NetworkInfo,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

const OPS_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIedb ops@host";

fn debian() -> OsInfo {
    OsInfo {
        os_type: OsType::Debian,
        version: "11".to_string(),
        codename: "bullseye".to_string(),
        is_proxmox: false,
    }
}

fn alpine() -> OsInfo {
    OsInfo {
        os_type: OsType::Alpine,
        version: "3.19.1".to_string(),
        codename: "3.19.1".to_string(),
        is_proxmox: false,
    }
}

/// The secure-baseline input: admin account `ops`, sshd on 2222, ufw
/// with two extra service ports, resolver pointed at the defaults.
/// Supplementary steps are off so the four core steps stay visible.
fn baseline_config() -> HardnConfig {
    let mut config = HardnConfig::default();
    config.username = "ops".to_string();
    config.sudo_no_password = false;
    config.ssh_keys = vec![OPS_KEY.to_string()];
    config.ssh_port = 2222;
    config.ssh_allowed_users = vec!["ops".to_string()];
    config.ufw_allowed_ports = vec![80, 443];
    config.configure_dns = true;
    config.enable_app_armor = false;
    config.enable_unattended_upgrades = false;
    config.enable_lynis = false;
    config
}

fn assemble(
    os: OsInfo,
    config: &HardnConfig,
) -> (MenuManager, Arc<MemoryFileSystem>, Arc<MockCommander>) {
    let mem = Arc::new(MemoryFileSystem::new());
    let mock = Arc::new(MockCommander::new());
    let fs: Arc<dyn FileSystem> = mem.clone();
    let commander: Arc<dyn Commander> = mock.clone();
    let network: Arc<dyn NetworkInfo> = Arc::new(MemoryNetworkInfo::new(Vec::new()));
    let menu = MenuManager::assemble(fs, commander, network, os, config, false);
    (menu, mem, mock)
}

/// Route the resolver through plain /etc/resolv.conf
fn script_plain_resolver(mock: &MockCommander) {
    mock.fail("systemctl is-active systemd-resolved", 3, "inactive");
    mock.fail("which resolvconf", 1, "");
}

#[tokio::test]
async fn test_fresh_debian_host_gets_the_full_baseline() {
    let config = baseline_config();
    let (menu, mem, mock) = assemble(debian(), &config);
    mock.fail("id ops", 1, "no such user");
    script_plain_resolver(&mock);

    menu.security
        .harden_system(&config.hardening_config())
        .await
        .unwrap();

    // Admin account with a password-protected sudo policy
    assert!(mock.was_called("adduser --disabled-password --gecos  ops"));
    assert!(mock.was_called("usermod -aG sudo ops"));
    assert_eq!(
        mem.contents_of("/etc/sudoers.d/ops").unwrap(),
        "ops ALL=(ALL) ALL\n"
    );

    // The key lands in the ops account, not root's
    assert_eq!(
        mem.contents_of("/home/ops/.ssh/authorized_keys").unwrap(),
        format!("{}\n", OPS_KEY)
    );
    assert_eq!(mem.mode_of("/home/ops/.ssh/authorized_keys"), Some(0o600));
    assert!(mem.contents_of("/root/.ssh/authorized_keys").is_none());

    // Daemon policy in the Debian drop-in, daemon restarted
    let sshd = mem
        .contents_of("/etc/ssh/sshd_config.d/hardn.conf")
        .unwrap();
    assert!(sshd.contains("Port 2222\n"));
    assert!(sshd.contains("PermitRootLogin no\n"));
    assert!(sshd.contains("AllowUsers ops\n"));
    assert!(mock.was_called("systemctl restart ssh"));

    // Deny-incoming baseline opens the moved ssh port plus extras,
    // never port 22
    assert!(mock.was_called("ufw default deny incoming"));
    assert!(mock.was_called("ufw default allow outgoing"));
    assert!(mock.was_called("ufw allow 2222/tcp comment SSH access"));
    assert!(mock.was_called("ufw allow 80/tcp comment Allowed service port 80"));
    assert!(mock.was_called("ufw allow 443/tcp comment Allowed service port 443"));
    assert!(mock.was_called("ufw enable"));
    assert!(!mock.calls().iter().any(|c| c.starts_with("ufw allow 22/")));

    // Resolver lists the nameservers in configured order
    let resolv = mem.contents_of("/etc/resolv.conf").unwrap();
    let nameservers: Vec<&str> = resolv
        .lines()
        .filter(|l| l.starts_with("nameserver"))
        .collect();
    assert_eq!(
        nameservers,
        vec!["nameserver 1.1.1.1", "nameserver 1.0.0.1"]
    );

    // Account, daemon and firewall steps ran in that order
    let calls = mock.calls();
    let position = |needle: &str| calls.iter().position(|c| c == needle).unwrap();
    assert!(
        position("adduser --disabled-password --gecos  ops")
            < position("systemctl restart ssh")
    );
    assert!(position("systemctl restart ssh") < position("ufw default deny incoming"));
}

#[tokio::test]
async fn test_second_run_reproduces_identical_contents() {
    let config = baseline_config();
    let (menu, mem, mock) = assemble(debian(), &config);
    script_plain_resolver(&mock);
    let plan = config.hardening_config();

    menu.security.harden_system(&plan).await.unwrap();
    let sshd_first = mem
        .contents_of("/etc/ssh/sshd_config.d/hardn.conf")
        .unwrap();
    let keys_first = mem.contents_of("/home/ops/.ssh/authorized_keys").unwrap();
    let sudoers_first = mem.contents_of("/etc/sudoers.d/ops").unwrap();
    let resolv_first = mem.contents_of("/etc/resolv.conf").unwrap();
    let posture_first = menu.posture.evaluate().await;

    menu.security.harden_system(&plan).await.unwrap();

    assert_eq!(
        mem.contents_of("/etc/ssh/sshd_config.d/hardn.conf").unwrap(),
        sshd_first
    );
    assert_eq!(
        mem.contents_of("/home/ops/.ssh/authorized_keys").unwrap(),
        keys_first
    );
    assert_eq!(mem.contents_of("/etc/sudoers.d/ops").unwrap(), sudoers_first);
    assert_eq!(mem.contents_of("/etc/resolv.conf").unwrap(), resolv_first);
    assert_eq!(menu.posture.evaluate().await, posture_first);
}

#[tokio::test]
async fn test_blocked_ufw_stops_the_run_before_dns() {
    let config = baseline_config();
    let (menu, mem, mock) = assemble(debian(), &config);
    mock.fail("id ops", 1, "no such user");
    mock.fail_program("ufw", 1, "ERROR: problem running ufw");

    let err = menu
        .security
        .harden_system(&config.hardening_config())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ufw"));

    // Earlier steps stuck
    assert!(mem.contents_of("/etc/sudoers.d/ops").is_some());
    assert!(mem.contents_of("/home/ops/.ssh/authorized_keys").is_some());
    assert!(mem
        .contents_of("/etc/ssh/sshd_config.d/hardn.conf")
        .is_some());

    // The resolver step never started
    assert!(!mock.was_called("systemctl is-active systemd-resolved"));
    assert!(mem.contents_of("/etc/resolv.conf").is_none());
    assert!(mem.contents_of("/etc/systemd/resolved.conf").is_none());

    let posture = menu.posture.evaluate().await;
    assert!(!posture.firewall_enabled);
}

#[tokio::test]
async fn test_alpine_run_translates_every_tool_invocation() {
    let mut config = baseline_config();
    config.enable_app_armor = true;
    let (menu, mem, mock) = assemble(alpine(), &config);
    mock.fail("id ops", 1, "no such user");
    script_plain_resolver(&mock);

    menu.security
        .harden_system(&config.hardening_config())
        .await
        .unwrap();

    // BusyBox adduser and the wheel group instead of sudo
    assert!(mock.was_called("adduser -D -g  ops"));
    assert!(mock.was_called("addgroup ops wheel"));

    // Policy goes into the canonical file, OpenRC restarts the daemon
    let sshd = mem.contents_of("/etc/ssh/sshd_config").unwrap();
    assert!(sshd.contains("Port 2222\n"));
    assert!(mem
        .contents_of("/etc/ssh/sshd_config.d/hardn.conf")
        .is_none());
    assert!(mock.was_called("rc-service sshd restart"));

    // Supplementary packages arrive through apk
    assert!(mock.was_called("apk add --no-cache apparmor"));
    assert!(mock.was_called("rc-update add apparmor boot"));
    assert!(!mock.calls().iter().any(|c| c.starts_with("apt-get")));
}

#[tokio::test]
async fn test_untouched_host_grades_critical() {
    let (menu, _, mock) = assemble(debian(), &HardnConfig::default());
    mock.fail("ufw status verbose", 1, "ERROR: problem running ufw");
    mock.fail_program("aa-status", 1, "");
    mock.fail("systemctl is-enabled unattended-upgrades", 1, "disabled");
    mock.fail("which sudo", 1, "");

    let status = menu.posture.evaluate().await;

    assert!(status.root_login_enabled);
    assert!(!status.firewall_enabled);
    assert!(!status.secure_users);
    assert!(!status.password_auth_disabled);
    assert!(!status.ssh_port_non_default);
    assert_eq!(status.risk_level(), RiskLevel::Critical);
}

#[tokio::test]
async fn test_dropped_config_variable_is_noticed_and_preserved() {
    let config = baseline_config();
    let (menu, mem, mock) = assemble(debian(), &config);
    mock.respond("su - ops -c echo $HARDN_CONFIG", "/etc/hardn/hardn.yml\n");

    let mut env = HashMap::new();
    env.insert("SUDO_UID".to_string(), "1000".to_string());
    env.insert("SUDO_USER".to_string(), "ops".to_string());

    let notice = menu.environment.check(&env).await.unwrap().unwrap();
    assert!(notice.contains("HARDN_CONFIG"));
    assert!(notice.contains("env setup"));

    mem.insert_dir("/etc/sudoers.d", 0o750);
    menu.environment
        .setup(&config.environment_config(PathBuf::from("/etc/hardn/hardn.yml")))
        .await
        .unwrap();
    assert_eq!(
        mem.contents_of("/etc/sudoers.d/ops").unwrap(),
        "Defaults:ops env_keep += \"HARDN_CONFIG\"\n"
    );
}

#[tokio::test]
async fn test_harden_disables_root_login_even_when_config_permits_it() {
    let mut config = baseline_config();
    config.permit_root_login = true;
    config.disable_root = false;
    let (menu, mem, mock) = assemble(debian(), &config);
    script_plain_resolver(&mock);

    menu.security
        .harden_system(&config.hardening_config())
        .await
        .unwrap();
    let hardened = mem
        .contents_of("/etc/ssh/sshd_config.d/hardn.conf")
        .unwrap();
    assert!(hardened.contains("PermitRootLogin no\n"));

    // The standalone ssh surface honors the same configuration
    menu.ssh.apply(&config.ssh_config()).await.unwrap();
    let applied = mem
        .contents_of("/etc/ssh/sshd_config.d/hardn.conf")
        .unwrap();
    assert!(applied.contains("PermitRootLogin yes\n"));
}

#[tokio::test]
async fn test_existing_authorized_key_leaves_file_bytes_alone() {
    let config = baseline_config();
    let (menu, mem, _) = assemble(debian(), &config);
    let seeded = format!("# managed\n{}\n", OPS_KEY);
    mem.insert_file("/home/ops/.ssh/authorized_keys", &seeded, 0o600);

    menu.users
        .create_admin("ops", false, vec![OPS_KEY.to_string()])
        .await
        .unwrap();

    assert_eq!(
        mem.contents_of("/home/ops/.ssh/authorized_keys").unwrap(),
        seeded
    );
}
