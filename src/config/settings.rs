// file: src/config/settings.rs
// version: 1.0.0
// guid: 8f2c6d14-a93b-4e70-b5d8-1c47e0a92f63

//! The YAML-backed settings document and its mappings into domain requests
//!
//! Every option has a default, so an absent config file and an empty one
//! behave the same. Unknown keys are ignored, which lets one file serve
//! several tool versions.

use crate::model::{
    BackupConfig, DnsConfig, EnvironmentConfig, FirewallConfig, FirewallPolicy, FirewallProfile,
    FirewallRule, HardeningConfig, LocaleSettings, PackageSources, SshConfig,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete settings document for one invocation.
///
/// Field names follow the YAML key spelling (`camelCase`). The struct-level
/// default supplies every value, so partial documents are always valid
/// input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HardnConfig {
    /// Admin account to create or augment; empty disables the user step
    pub username: String,

    /// Operation journal location
    pub log_file: PathBuf,
    /// Log every mutation instead of performing it
    pub dry_run: bool,

    /// Copy files into the dated backup tree before overwriting them
    pub enable_backups: bool,
    /// Root of the dated backup tree
    pub backup_path: PathBuf,

    /// Third-octet subnet prefix marking a DMZ interface, e.g. "192.168.100"
    pub dmz_subnet: String,
    /// Resolver addresses in priority order
    pub nameservers: Vec<String>,

    pub ssh_port: u16,
    /// Honored by direct ssh configuration only; the hardening run always
    /// disables root login
    pub permit_root_login: bool,
    /// AllowUsers entries; empty omits the directive
    pub ssh_allowed_users: Vec<String>,
    pub ssh_listen_address: String,
    /// AuthorizedKeysFile pattern; `%u` is replaced with the username
    pub ssh_key_path: String,
    /// Overrides the distro-default sshd config location when non-empty
    pub ssh_config_file: String,

    /// Sudo without password prompt for the admin account
    pub sudo_no_password: bool,
    /// Public keys installed for the admin account
    pub ssh_keys: Vec<String>,

    pub linux_core_packages: Vec<String>,
    pub linux_dmz_packages: Vec<String>,
    pub linux_lab_packages: Vec<String>,
    pub python_packages: Vec<String>,
    pub non_wsl_python_packages: Vec<String>,
    pub python_pip_packages: Vec<String>,
    pub alpine_core_packages: Vec<String>,
    pub alpine_dmz_packages: Vec<String>,
    pub alpine_lab_packages: Vec<String>,
    pub alpine_python_packages: Vec<String>,

    pub debian_repos: Vec<String>,
    pub proxmox_src_repos: Vec<String>,
    pub proxmox_ceph_repo: String,
    pub proxmox_enterprise_repo: String,
    /// Packages held across apt runs on Proxmox hosts
    pub proxmox_package_patterns: Vec<String>,
    pub alpine_testing_repo: String,

    pub ufw_app_profiles: Vec<FirewallProfile>,
    pub ufw_default_incoming_policy: String,
    pub ufw_default_outgoing_policy: String,
    /// Extra tcp ports kept open besides the SSH port
    pub ufw_allowed_ports: Vec<u16>,

    /// Install pip packages through uv instead of pip3
    pub use_uv_package_manager: bool,
    pub enable_app_armor: bool,
    pub enable_lynis: bool,
    pub enable_unattended_upgrades: bool,
    /// Apply the firewall baseline (SSH port plus allowed ports) when hardening
    pub enable_ufw_ssh_policy: bool,
    pub configure_dns: bool,
    /// Refuse root SSH login in direct ssh configuration
    pub disable_root: bool,

    pub lang: String,
    pub language: String,
    pub lc_all: String,
    pub tz: String,
    pub python_unbuffered: String,
}

impl Default for HardnConfig {
    fn default() -> Self {
        Self {
            username: String::new(),

            log_file: PathBuf::from("/var/log/hardn.log"),
            dry_run: false,

            enable_backups: true,
            backup_path: PathBuf::from("/var/backups/hardn"),

            dmz_subnet: String::new(),
            nameservers: vec!["1.1.1.1".to_string(), "1.0.0.1".to_string()],

            ssh_port: 22,
            permit_root_login: false,
            ssh_allowed_users: Vec::new(),
            ssh_listen_address: "0.0.0.0".to_string(),
            ssh_key_path: ".ssh_%u".to_string(),
            ssh_config_file: String::new(),

            sudo_no_password: true,
            ssh_keys: Vec::new(),

            linux_core_packages: string_vec(&[
                "curl",
                "git",
                "htop",
                "openssh-server",
                "sudo",
                "ufw",
                "vim",
            ]),
            linux_dmz_packages: string_vec(&[
                "curl",
                "fail2ban",
                "openssh-server",
                "rkhunter",
                "sudo",
                "ufw",
            ]),
            linux_lab_packages: string_vec(&[
                "build-essential",
                "curl",
                "git",
                "htop",
                "tmux",
                "vim",
            ]),
            python_packages: string_vec(&["python3", "python3-pip", "python3-venv"]),
            non_wsl_python_packages: string_vec(&["python3-dev"]),
            python_pip_packages: string_vec(&["ansible"]),
            alpine_core_packages: string_vec(&[
                "curl",
                "git",
                "htop",
                "openssh",
                "sudo",
                "ufw",
            ]),
            alpine_dmz_packages: string_vec(&["curl", "fail2ban", "openssh", "sudo", "ufw"]),
            alpine_lab_packages: string_vec(&["alpine-sdk", "curl", "git", "tmux"]),
            alpine_python_packages: string_vec(&["python3"]),

            debian_repos: string_vec(&[
                "deb http://deb.debian.org/debian CODENAME main contrib non-free-firmware",
                "deb http://deb.debian.org/debian CODENAME-updates main contrib non-free-firmware",
                "deb http://security.debian.org/debian-security CODENAME-security main contrib non-free-firmware",
            ]),
            proxmox_src_repos: string_vec(&[
                "deb http://deb.debian.org/debian CODENAME main contrib",
                "deb http://deb.debian.org/debian CODENAME-updates main contrib",
                "deb http://security.debian.org/debian-security CODENAME-security main contrib",
                "deb http://download.proxmox.com/debian/pve CODENAME pve-no-subscription",
            ]),
            proxmox_ceph_repo: "deb http://download.proxmox.com/debian/ceph-quincy CODENAME no-subscription"
                .to_string(),
            // Commented out so apt ignores it until a subscription key exists
            proxmox_enterprise_repo:
                "# deb https://enterprise.proxmox.com/debian/pve CODENAME pve-enterprise"
                    .to_string(),
            proxmox_package_patterns: crate::adapters::PROXMOX_HELD_PACKAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            alpine_testing_repo: "https://dl-cdn.alpinelinux.org/alpine/edge/testing".to_string(),

            ufw_app_profiles: Vec::new(),
            ufw_default_incoming_policy: "deny".to_string(),
            ufw_default_outgoing_policy: "allow".to_string(),
            ufw_allowed_ports: Vec::new(),

            use_uv_package_manager: false,
            enable_app_armor: true,
            enable_lynis: false,
            enable_unattended_upgrades: true,
            enable_ufw_ssh_policy: true,
            configure_dns: false,
            disable_root: true,

            lang: "en_US.UTF-8".to_string(),
            language: "en_US:en".to_string(),
            lc_all: "en_US.UTF-8".to_string(),
            tz: "UTC".to_string(),
            python_unbuffered: "1".to_string(),
        }
    }
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl HardnConfig {
    /// Validate the settings document
    pub fn validate(&self) -> crate::Result<()> {
        if self.ssh_port == 0 {
            return Err(crate::error::HardnError::config(
                "sshPort must be between 1 and 65535",
            ));
        }
        if self.ufw_allowed_ports.iter().any(|&p| p == 0) {
            return Err(crate::error::HardnError::config(
                "ufwAllowedPorts entries must be between 1 and 65535",
            ));
        }
        self.ufw_default_incoming_policy
            .parse::<FirewallPolicy>()
            .map_err(|_| {
                crate::error::HardnError::Config(format!(
                    "ufwDefaultIncomingPolicy must be \"allow\" or \"deny\", got {:?}",
                    self.ufw_default_incoming_policy
                ))
            })?;
        self.ufw_default_outgoing_policy
            .parse::<FirewallPolicy>()
            .map_err(|_| {
                crate::error::HardnError::Config(format!(
                    "ufwDefaultOutgoingPolicy must be \"allow\" or \"deny\", got {:?}",
                    self.ufw_default_outgoing_policy
                ))
            })?;
        if self.configure_dns {
            if self.nameservers.is_empty() {
                return Err(crate::error::HardnError::config(
                    "configureDns requires at least one nameserver",
                ));
            }
            for ns in &self.nameservers {
                if ns.parse::<std::net::IpAddr>().is_err() {
                    return Err(crate::error::HardnError::Config(format!(
                        "invalid nameserver address: {}",
                        ns
                    )));
                }
            }
        }
        if self.enable_backups && !self.backup_path.is_absolute() {
            return Err(crate::error::HardnError::Config(format!(
                "backupPath must be an absolute path: {}",
                self.backup_path.display()
            )));
        }
        if !self.log_file.as_os_str().is_empty() && !self.log_file.is_absolute() {
            return Err(crate::error::HardnError::Config(format!(
                "logFile must be an absolute path: {}",
                self.log_file.display()
            )));
        }
        self.firewall_config().validate()?;
        Ok(())
    }

    /// AuthorizedKeysFile entries with `%u` substituted.
    ///
    /// Without a username the pattern cannot resolve, so the list is left
    /// empty and sshd falls back to its stock key path.
    pub fn ssh_key_paths(&self) -> Vec<String> {
        if self.ssh_key_path.is_empty() {
            return Vec::new();
        }
        if self.ssh_key_path.contains("%u") && self.username.trim().is_empty() {
            return Vec::new();
        }
        vec![self.ssh_key_path.replace("%u", self.username.trim())]
    }

    /// Hardening plan for `SecurityManager::harden_system`
    pub fn hardening_config(&self) -> HardeningConfig {
        HardeningConfig {
            create_user: !self.username.trim().is_empty(),
            username: self.username.trim().to_string(),
            sudo_no_password: self.sudo_no_password,
            ssh_keys: self.ssh_keys.clone(),
            ssh_port: self.ssh_port,
            ssh_listen_addresses: vec![self.ssh_listen_address.clone()],
            ssh_allowed_users: self.ssh_allowed_users.clone(),
            ssh_key_paths: self.ssh_key_paths(),
            enable_firewall: self.enable_ufw_ssh_policy,
            allowed_ports: self.ufw_allowed_ports.clone(),
            configure_dns: self.configure_dns,
            nameservers: self.nameservers.clone(),
            enable_app_armor: self.enable_app_armor,
            enable_lynis: self.enable_lynis,
            enable_unattended_upgrades: self.enable_unattended_upgrades,
        }
    }

    /// Desired sshd policy for direct configuration.
    ///
    /// `disableRoot` wins over `permitRootLogin`; the combination only
    /// permits root when explicitly asked for twice.
    pub fn ssh_config(&self) -> SshConfig {
        SshConfig {
            port: self.ssh_port,
            listen_addresses: vec![self.ssh_listen_address.clone()],
            permit_root_login: self.permit_root_login && !self.disable_root,
            allowed_users: self.ssh_allowed_users.clone(),
            key_paths: self.ssh_key_paths(),
            auth_methods: Vec::new(),
            config_file_path: PathBuf::from(&self.ssh_config_file),
        }
    }

    /// Desired firewall state for direct application.
    ///
    /// Unlike the hardening baseline this honors the configured default
    /// policies; the SSH rule is gated on `enableUfwSshPolicy`.
    pub fn firewall_config(&self) -> FirewallConfig {
        let mut rules = Vec::new();
        if self.enable_ufw_ssh_policy {
            rules.push(FirewallRule::allow_tcp(self.ssh_port, "SSH access"));
        }
        for port in &self.ufw_allowed_ports {
            if *port != self.ssh_port {
                rules.push(FirewallRule::allow_tcp(
                    *port,
                    format!("Allowed service port {}", port),
                ));
            }
        }
        FirewallConfig {
            enabled: true,
            default_incoming: self
                .ufw_default_incoming_policy
                .parse()
                .unwrap_or(FirewallPolicy::Deny),
            default_outgoing: self
                .ufw_default_outgoing_policy
                .parse()
                .unwrap_or(FirewallPolicy::Allow),
            rules,
            application_profiles: self.ufw_app_profiles.clone(),
        }
    }

    /// Resolver state for direct application
    pub fn dns_config(&self) -> DnsConfig {
        DnsConfig {
            nameservers: self.nameservers.clone(),
            domain: "lan".to_string(),
            search: Vec::new(),
        }
    }

    pub fn backup_config(&self) -> BackupConfig {
        BackupConfig {
            enabled: self.enable_backups,
            backup_dir: self.backup_path.clone(),
        }
    }

    /// Repository templates and package lists for the install adapter
    pub fn package_sources(&self) -> PackageSources {
        PackageSources {
            debian_repos: self.debian_repos.clone(),
            proxmox_src_repos: self.proxmox_src_repos.clone(),
            proxmox_ceph_repo: self.proxmox_ceph_repo.clone(),
            proxmox_enterprise_repo: self.proxmox_enterprise_repo.clone(),
            alpine_testing_repo: self.alpine_testing_repo.clone(),
            linux_core_packages: self.linux_core_packages.clone(),
            linux_dmz_packages: self.linux_dmz_packages.clone(),
            linux_lab_packages: self.linux_lab_packages.clone(),
            python_packages: self.python_packages.clone(),
            non_wsl_python_packages: self.non_wsl_python_packages.clone(),
            python_pip_packages: self.python_pip_packages.clone(),
            alpine_core_packages: self.alpine_core_packages.clone(),
            alpine_dmz_packages: self.alpine_dmz_packages.clone(),
            alpine_lab_packages: self.alpine_lab_packages.clone(),
            alpine_python_packages: self.alpine_python_packages.clone(),
        }
    }

    pub fn locale_settings(&self) -> LocaleSettings {
        LocaleSettings {
            lang: self.lang.clone(),
            language: self.language.clone(),
            lc_all: self.lc_all.clone(),
            tz: self.tz.clone(),
            python_unbuffered: self.python_unbuffered.clone(),
        }
    }

    /// Sudo-preservation request for the given discovered config path
    pub fn environment_config(&self, config_path: PathBuf) -> EnvironmentConfig {
        EnvironmentConfig {
            config_path,
            preserve_sudo: true,
            username: self.username.trim().to_string(),
        }
    }
}
