// file: src/manager/menu.rs
// version: 1.0.0
// guid: a94e2c70-6d18-4b53-8f2a-c05e7d93b164

//! Aggregate of every manager plus the probes the dispatcher needs
//!
//! One `MenuManager` is assembled per invocation from the platform
//! seams, the detected OS and the loaded settings. Command handlers and
//! the scenario tests share this composition, so both talk to exactly
//! the same object graph.

use super::{
    BackupManager, DnsManager, EnvironmentManager, FirewallManager, PackageManager,
    SecurityManager, SshManager, UserManager,
};
use crate::adapters::{
    BackupAdapter, DnsAdapter, EnvironmentAdapter, FirewallAdapter, HostAdapter,
    LastLoginAdapter, LogFileAdapter, PackageAdapter, SshAdapter, UserAdapter,
};
use crate::audit::PostureEvaluator;
use crate::config::HardnConfig;
use crate::model::OsInfo;
use crate::platform::{Commander, FileSystem, NetworkInfo};
use crate::ports::{BackupPort, HostPort, LogPort};
use crate::service::{
    BackupService, DnsService, EnvironmentService, FirewallService, PackageService, SshService,
    UserService,
};
use std::sync::Arc;

pub struct MenuManager {
    pub users: Arc<UserManager>,
    pub ssh: Arc<SshManager>,
    pub firewall: Arc<FirewallManager>,
    pub dns: Arc<DnsManager>,
    pub packages: Arc<PackageManager>,
    pub backups: Arc<BackupManager>,
    pub environment: Arc<EnvironmentManager>,
    pub security: Arc<SecurityManager>,
    pub posture: Arc<PostureEvaluator>,
    pub host: Arc<dyn HostPort>,
    pub journal: Arc<dyn LogPort>,
    pub network: Arc<dyn NetworkInfo>,
    pub os: OsInfo,
}

impl MenuManager {
    /// Wire adapters, services and managers over the given seams
    pub fn assemble(
        fs: Arc<dyn FileSystem>,
        commander: Arc<dyn Commander>,
        network: Arc<dyn NetworkInfo>,
        os: OsInfo,
        config: &HardnConfig,
        is_wsl: bool,
    ) -> Self {
        let backup: Arc<dyn BackupPort> =
            Arc::new(BackupAdapter::new(fs.clone(), config.backup_config()));
        let backups = Arc::new(BackupManager::new(Arc::new(BackupService::new(
            backup.clone(),
        ))));

        let users = Arc::new(UserManager::new(Arc::new(UserService::new(
            Arc::new(UserAdapter::new(
                fs.clone(),
                commander.clone(),
                backup.clone(),
                os.clone(),
            )),
            Arc::new(LastLoginAdapter::new(commander.clone())),
        ))));

        let ssh = Arc::new(SshManager::new(Arc::new(SshService::new(Arc::new(
            SshAdapter::new(fs.clone(), commander.clone(), backup.clone(), os.clone()),
        )))));

        let firewall = Arc::new(FirewallManager::new(Arc::new(FirewallService::new(
            Arc::new(FirewallAdapter::new(
                fs.clone(),
                commander.clone(),
                backup.clone(),
            )),
        ))));

        let dns = Arc::new(DnsManager::new(Arc::new(DnsService::new(Arc::new(
            DnsAdapter::new(fs.clone(), commander.clone(), backup.clone()),
        )))));

        let dmz_subnet = if config.dmz_subnet.is_empty() {
            None
        } else {
            Some(config.dmz_subnet.clone())
        };
        let packages = Arc::new(PackageManager::new(Arc::new(PackageService::new(
            Arc::new(PackageAdapter::new(
                fs.clone(),
                commander.clone(),
                os.clone(),
                config.proxmox_package_patterns.clone(),
            )),
            network.clone(),
            config.package_sources(),
            os.clone(),
            is_wsl,
            dmz_subnet,
        ))));

        let environment = Arc::new(EnvironmentManager::new(Arc::new(EnvironmentService::new(
            Arc::new(EnvironmentAdapter::new(
                fs.clone(),
                commander.clone(),
                backup,
                os.clone(),
            )),
        ))));

        let journal: Arc<dyn LogPort> =
            Arc::new(LogFileAdapter::new(fs.clone(), config.log_file.clone()));
        let host: Arc<dyn HostPort> = Arc::new(HostAdapter::new(commander.clone()));

        let security = Arc::new(SecurityManager::new(
            users.clone(),
            ssh.clone(),
            firewall.clone(),
            dns.clone(),
            packages.clone(),
            commander.clone(),
            journal.clone(),
            os.clone(),
            config.ufw_app_profiles.clone(),
        ));

        let posture = Arc::new(PostureEvaluator::new(fs, commander, os.clone()));

        Self {
            users,
            ssh,
            firewall,
            dns,
            packages,
            backups,
            environment,
            security,
            posture,
            host,
            journal,
            network,
            os,
        }
    }
}
