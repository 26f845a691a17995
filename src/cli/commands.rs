// file: src/cli/commands.rs
// version: 1.0.0
// guid: c2f8a419-6d07-4e83-95b1-38da60e7f254

//! Command implementations for the CLI
//!
//! Each handler borrows the assembled [`CommandContext`] and drives one
//! manager. Handlers print to stdout; diagnostics go through `tracing`.

use crate::adapters::detect_os;
use crate::config::{ConfigLoader, HardnConfig};
use crate::manager::MenuManager;
use crate::model::{OsType, PackageType, SecurityStatus};
use crate::platform::{
    Commander, DryRunCommander, DryRunFileSystem, FileSystem, NetworkInfo, RealFileSystem,
    SystemCommander, SystemNetworkInfo,
};
use crate::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a command handler needs: the wired managers, the loaded
/// configuration and where it came from.
pub struct CommandContext {
    pub menu: MenuManager,
    pub config: HardnConfig,
    pub config_path: Option<PathBuf>,
    pub dry_run: bool,
}

impl CommandContext {
    /// Load configuration, detect the distribution and wire the managers
    /// over the live platform seams. With `--dry-run` (or `dryRun: true`
    /// in the config) every mutating seam is wrapped so changes are
    /// logged instead of performed.
    pub fn initialize(config_path: Option<&Path>, dry_run_flag: bool) -> Result<Self> {
        let loader = ConfigLoader::new();
        let (config, source) = loader.discover(config_path)?;
        if let Some(path) = &source {
            info!("Using configuration from {}", path.display());
        } else {
            info!("No configuration file found, using built-in defaults");
        }

        let dry_run = dry_run_flag || config.dry_run;
        let mut fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
        let mut commander: Arc<dyn Commander> = Arc::new(SystemCommander::new());
        if dry_run {
            info!("Dry-run mode: mutations are logged, not performed");
            fs = Arc::new(DryRunFileSystem::new(fs));
            commander = Arc::new(DryRunCommander::new(commander));
        }
        let network: Arc<dyn NetworkInfo> = Arc::new(SystemNetworkInfo::new());

        let os = detect_os(&fs)?;
        info!("Detected {}", os.label());

        let is_wsl = detect_wsl(fs.as_ref());
        let menu = MenuManager::assemble(fs, commander, network, os, &config, is_wsl);

        Ok(Self {
            menu,
            config,
            config_path: source,
            dry_run,
        })
    }
}

fn detect_wsl(fs: &dyn FileSystem) -> bool {
    if std::env::var_os("WSL").is_some() {
        return true;
    }
    fs.read_to_string(Path::new("/proc/version"))
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

/// Warn when a mutating command runs without root. The run proceeds;
/// individual operations fail with ordinary permission errors.
fn warn_if_not_root() {
    if unsafe { libc::getuid() } != 0 {
        warn!("Not running as root; most mutations will be denied");
    }
}

/// Warn about required programs missing from PATH before a run starts
fn warn_missing_programs(programs: &[&str]) {
    for program in programs {
        if which::which(program).is_err() {
            warn!("{} not found on PATH; steps that need it will fail", program);
        }
    }
}

/// Apply the full hardening baseline from the configuration
pub async fn harden_command(ctx: &CommandContext) -> Result<()> {
    warn_if_not_root();

    let plan = ctx.config.hardening_config();
    let mut required = vec!["sshd"];
    if plan.create_user {
        required.push("visudo");
    }
    if plan.enable_firewall {
        required.push("ufw");
    }
    required.push(match ctx.menu.os.os_type {
        OsType::Alpine => "rc-service",
        _ => "systemctl",
    });
    warn_missing_programs(&required);

    ctx.menu.security.harden_system(&plan).await?;
    println!("Hardening baseline applied");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostureReport {
    #[serde(flatten)]
    status: SecurityStatus,
    score: u8,
    max_score: u8,
    risk_level: &'static str,
}

/// Probe the host and print the posture, optionally as JSON
pub async fn status_command(ctx: &CommandContext, json: bool) -> Result<()> {
    let status = ctx.menu.posture.evaluate().await;
    let score = status.score();
    let risk = status.risk_level();

    if json {
        let report = PostureReport {
            status,
            score,
            max_score: SecurityStatus::max_score(),
            risk_level: risk.as_str(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Security posture for {}", ctx.menu.os.label());
    println!();
    print_indicator("Root SSH login disabled", !status.root_login_enabled);
    print_indicator("Firewall enabled", status.firewall_enabled);
    print_indicator("Firewall rules configured", status.firewall_configured);
    print_indicator("Non-root admin present", status.secure_users);
    print_indicator("AppArmor enforcing", status.app_armor_enabled);
    print_indicator("Unattended upgrades", status.unattended_upgrades);
    print_indicator("Sudo available", status.sudo_configured);
    print_indicator("SSH on non-default port", status.ssh_port_non_default);
    print_indicator("SSH password auth disabled", status.password_auth_disabled);
    println!();

    let graded = match risk {
        crate::model::RiskLevel::Critical => risk.as_str().red().bold(),
        crate::model::RiskLevel::High => risk.as_str().red(),
        crate::model::RiskLevel::Moderate => risk.as_str().yellow(),
        _ => risk.as_str().green(),
    };
    println!(
        "Score: {}/{}   Risk: {}",
        score,
        SecurityStatus::max_score(),
        graded
    );
    Ok(())
}

fn print_indicator(label: &str, satisfied: bool) {
    let mark = if satisfied {
        "ok".green()
    } else {
        "--".red()
    };
    println!("  [{}] {}", mark, label);
}

/// Create an administrator account with sudo and SSH keys
pub async fn user_add_command(
    ctx: &CommandContext,
    username: Option<String>,
    with_password: bool,
    keys: Vec<String>,
) -> Result<()> {
    warn_if_not_root();
    let name = match username {
        Some(name) => name,
        None if !ctx.config.username.trim().is_empty() => ctx.config.username.clone(),
        None => {
            return Err(crate::error::HardnError::validation(
                "no username given and none configured",
            ))
        }
    };
    let keys = if keys.is_empty() {
        ctx.config.ssh_keys.clone()
    } else {
        keys
    };
    let no_password = ctx.config.sudo_no_password && !with_password;

    ctx.menu.users.create_admin(&name, no_password, keys).await?;
    println!("Account {} is in place", name);
    Ok(())
}

/// Authorize one public key for an existing account
pub async fn user_key_command(
    ctx: &CommandContext,
    username: &str,
    public_key: &str,
) -> Result<()> {
    warn_if_not_root();
    ctx.menu.users.add_key(username, public_key).await?;
    println!("Key authorized for {}", username);
    Ok(())
}

/// List regular accounts with uid, sudo and last login, then the
/// non-system groups they can belong to
pub async fn user_list_command(ctx: &CommandContext) -> Result<()> {
    let users = ctx.menu.users.list().await?;
    if users.is_empty() {
        println!("No regular accounts found");
    } else {
        println!("{:<20} {:>6}  {:<5} {}", "USERNAME", "UID", "SUDO", "LAST LOGIN");
        for user in users {
            let uid = user
                .uid
                .map(|u| u.to_string())
                .unwrap_or_else(|| "-".to_string());
            let sudo = if user.has_sudo { "yes" } else { "no" };
            let last = match (&user.last_login, &user.last_login_ip) {
                (Some(when), Some(ip)) => format!("{} from {}", when, ip),
                (Some(when), None) => when.clone(),
                (None, _) => "never".to_string(),
            };
            println!("{:<20} {:>6}  {:<5} {}", user.username, uid, sudo, last);
        }
    }

    let groups = ctx.menu.users.groups().await?;
    if !groups.is_empty() {
        println!();
        println!("{:<20} {:>6}  {}", "GROUP", "GID", "MEMBERS");
        for group in groups {
            println!(
                "{:<20} {:>6}  {}",
                group.name,
                group.gid,
                group.members.join(", ")
            );
        }
    }
    Ok(())
}

/// Write the configured SSH policy and restart the daemon
pub async fn ssh_apply_command(ctx: &CommandContext) -> Result<()> {
    warn_if_not_root();
    ctx.menu.ssh.apply(&ctx.config.ssh_config()).await?;
    println!("SSH daemon policy applied");
    Ok(())
}

/// Turn off root login over SSH
pub async fn ssh_disable_root_command(ctx: &CommandContext) -> Result<()> {
    warn_if_not_root();
    ctx.menu.ssh.disable_root().await?;
    println!("Root login over SSH disabled");
    Ok(())
}

/// Print the daemon policy currently on disk
pub async fn ssh_show_command(ctx: &CommandContext) -> Result<()> {
    let current = ctx.menu.ssh.current().await?;
    println!("Config file: {}", current.config_file_path.display());
    println!("Port: {}", current.port);
    println!(
        "Root login: {}",
        if current.permit_root_login {
            "permitted"
        } else {
            "refused"
        }
    );
    if !current.listen_addresses.is_empty() {
        println!("Listen: {}", current.listen_addresses.join(", "));
    }
    if !current.allowed_users.is_empty() {
        println!("AllowUsers: {}", current.allowed_users.join(" "));
    }
    println!("Authentication: {}", current.effective_auth_methods());
    Ok(())
}

/// Apply the configured firewall policy and rules
pub async fn firewall_apply_command(ctx: &CommandContext) -> Result<()> {
    warn_if_not_root();
    warn_missing_programs(&["ufw"]);
    ctx.menu.firewall.apply(&ctx.config.firewall_config()).await?;
    println!("Firewall rules applied");
    Ok(())
}

/// Print the current firewall state
pub async fn firewall_status_command(ctx: &CommandContext) -> Result<()> {
    let status = ctx.menu.firewall.status().await?;
    println!(
        "Firewall: {}",
        if status.enabled { "active" } else { "inactive" }
    );
    if let Some(policy) = status.default_incoming {
        println!("Default incoming: {}", policy.as_str());
    }
    if let Some(policy) = status.default_outgoing {
        println!("Default outgoing: {}", policy.as_str());
    }
    if !status.rules.is_empty() {
        println!("Rules:");
        for rule in &status.rules {
            println!("  {}", rule);
        }
    }
    Ok(())
}

/// Point the resolver at the configured nameservers
pub async fn dns_apply_command(ctx: &CommandContext) -> Result<()> {
    warn_if_not_root();
    ctx.menu.dns.apply(&ctx.config.dns_config()).await?;
    println!("Resolver configuration applied");
    Ok(())
}

/// Print the current resolver configuration
pub async fn dns_show_command(ctx: &CommandContext) -> Result<()> {
    let current = ctx.menu.dns.current().await?;
    println!("Nameservers: {}", current.nameservers.join(", "));
    if !current.domain.is_empty() {
        println!("Domain: {}", current.domain);
    }
    if !current.search.is_empty() {
        println!("Search: {}", current.search.join(" "));
    }
    Ok(())
}

/// Install a package profile; `core` resolves to `dmz` on a DMZ subnet
pub async fn install_command(ctx: &CommandContext, profile: PackageType) -> Result<()> {
    warn_if_not_root();
    let installed = ctx
        .menu
        .packages
        .install(profile, ctx.config.use_uv_package_manager)
        .await?;
    println!("Installed the {} profile", installed.as_str());
    Ok(())
}

/// Rewrite the package repository sources for this distribution
pub async fn sources_update_command(ctx: &CommandContext) -> Result<()> {
    warn_if_not_root();
    ctx.menu.packages.update_sources().await?;
    println!("Repository sources updated");
    Ok(())
}

/// List the backups recorded for a file
pub async fn backup_list_command(ctx: &CommandContext, path: &Path) -> Result<()> {
    let backups = ctx.menu.backups.list(path).await?;
    if backups.is_empty() {
        println!("No backups recorded for {}", path.display());
        return Ok(());
    }
    for backup in backups {
        println!(
            "{}  {:>8}  {}",
            backup.created.format("%Y-%m-%d %H:%M:%S"),
            format_size(backup.size),
            backup.backup_path.display()
        );
    }
    Ok(())
}

/// Restore a backup over a target path
pub async fn backup_restore_command(
    ctx: &CommandContext,
    backup: &Path,
    target: &Path,
) -> Result<()> {
    warn_if_not_root();
    ctx.menu.backups.restore(backup, target).await?;
    println!("Restored {} over {}", backup.display(), target.display());
    Ok(())
}

/// Delete whole backup day-directories older than the cutoff
pub async fn backup_cleanup_command(ctx: &CommandContext, older_than_days: u32) -> Result<()> {
    warn_if_not_root();
    let removed = ctx.menu.backups.cleanup(older_than_days).await?;
    if removed.is_empty() {
        println!("No backup directories older than {} days", older_than_days);
    } else {
        for dir in &removed {
            println!("Removed {}", dir.display());
        }
        println!("{} directories removed", removed.len());
    }
    Ok(())
}

/// Check that the backup directory exists and is writable
pub async fn backup_verify_command(ctx: &CommandContext) -> Result<()> {
    ctx.menu.backups.verify().await?;
    println!(
        "Backup directory {} is writable",
        ctx.config.backup_path.display()
    );
    Ok(())
}

/// Warn when sudo would drop the hardening environment.
///
/// The notice is advisory; the command always exits 0.
pub async fn env_check_command(ctx: &CommandContext) -> Result<()> {
    let env: std::collections::HashMap<String, String> = std::env::vars().collect();
    match ctx.menu.environment.check(&env).await? {
        Some(notice) => println!("{}", notice),
        None => println!("Environment preservation looks fine"),
    }
    Ok(())
}

/// Configure sudoers to carry the hardening environment through sudo
pub async fn env_setup_command(ctx: &CommandContext) -> Result<()> {
    warn_if_not_root();
    if ctx.config.username.trim().is_empty() {
        return Err(crate::error::HardnError::validation(
            "environment setup needs a configured username",
        ));
    }
    let config_path = ctx
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(crate::config::loader::SYSTEM_CONFIG));
    ctx.menu
        .environment
        .setup(&ctx.config.environment_config(config_path))
        .await?;
    println!("Sudo environment preservation configured");
    Ok(())
}

/// Write the configured locale and timezone system-wide
pub async fn env_locale_command(ctx: &CommandContext) -> Result<()> {
    warn_if_not_root();
    ctx.menu
        .environment
        .apply_environment(&ctx.config.locale_settings())
        .await?;
    println!("Locale and timezone written");
    Ok(())
}

/// Print host and network information
pub async fn info_command(ctx: &CommandContext) -> Result<()> {
    let host = &ctx.menu.host;
    let hostname = host.hostname().await.unwrap_or_else(|_| "unknown".into());
    let kernel = host.kernel().await.unwrap_or_else(|_| "unknown".into());
    let memory = host
        .memory_summary()
        .await
        .unwrap_or_else(|_| "unknown".into());
    let disk = host.disk_usage().await.unwrap_or_else(|_| "unknown".into());
    let uptime = match host.uptime_seconds().await {
        Ok(seconds) => format_uptime(seconds),
        Err(_) => "unknown".into(),
    };

    println!("{:<10} {}", "Hostname:".bold(), hostname);
    println!("{:<10} {}", "OS:".bold(), ctx.menu.os.label());
    println!("{:<10} {}", "Kernel:".bold(), kernel);
    println!("{:<10} {}", "Uptime:".bold(), uptime);
    println!("{:<10} {}", "Memory:".bold(), memory);
    println!("{:<10} {}", "Disk:".bold(), disk);

    match ctx.menu.network.ipv4_addresses() {
        Ok(addresses) if !addresses.is_empty() => {
            let joined = addresses
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("{:<10} {}", "IPv4:".bold(), joined);
        }
        Ok(_) => println!("{:<10} none", "IPv4:".bold()),
        Err(e) => warn!("Interface probe failed: {}", e),
    }
    Ok(())
}

/// Print recent entries from the operation journal
pub async fn logs_command(ctx: &CommandContext, lines: usize) -> Result<()> {
    let entries = ctx.menu.journal.read_recent(lines).await?;
    if entries.is_empty() {
        println!("Journal {} is empty", ctx.menu.journal.path().display());
        return Ok(());
    }
    for entry in entries {
        println!("{}", entry);
    }
    Ok(())
}

fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MiB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1_024 {
        format!("{:.1} KiB", bytes as f64 / 1_024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime_breakdown() {
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(3_725), "1h 2m");
        assert_eq!(format_uptime(90_061), "1d 1h 1m");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2_048), "2.0 KiB");
        assert_eq!(format_size(3_145_728), "3.0 MiB");
    }
}
