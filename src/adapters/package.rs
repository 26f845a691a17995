// file: src/adapters/package.rs
// version: 1.0.0
// guid: c5d2a784-6e19-4f3b-a2c8-90b7e41d5f26

//! apt/apk/pip package operations and repository source files

use crate::model::{OsInfo, OsType, PackageInstallRequest, PackageSources};
use crate::platform::{Commander, FileSystem};
use crate::ports::PackagePort;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SOURCES_LIST: &str = "/etc/apt/sources.list";
const CEPH_LIST: &str = "/etc/apt/sources.list.d/ceph.list";
const ENTERPRISE_LIST: &str = "/etc/apt/sources.list.d/pve-enterprise.list";
const APK_REPOSITORIES: &str = "/etc/apk/repositories";
const APT_LISTS_DIR: &str = "/var/lib/apt/lists";
const APK_UPGRADE_SCRIPT: &str = "/etc/periodic/daily/apk-upgrade";

/// Packages kept on hold during installs on Proxmox hosts so apt cannot
/// replace the hypervisor kernel or tooling.
pub const PROXMOX_HELD_PACKAGES: [&str; 4] = [
    "proxmox-archive-keyring",
    "proxmox-backup-client",
    "proxmox-ve",
    "pve-kernel",
];

pub struct PackageAdapter {
    fs: Arc<dyn FileSystem>,
    commander: Arc<dyn Commander>,
    os: OsInfo,
    held_packages: Vec<String>,
}

impl PackageAdapter {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        commander: Arc<dyn Commander>,
        os: OsInfo,
        held_packages: Vec<String>,
    ) -> Self {
        Self {
            fs,
            commander,
            os,
            held_packages,
        }
    }

    /// Hold/unhold failures must not abort an install run.
    async fn mark_held_packages(&self, verb: &str) {
        if self.held_packages.is_empty() {
            return;
        }
        let mut args: Vec<&str> = vec![verb];
        args.extend(self.held_packages.iter().map(String::as_str));
        if let Err(err) = self.commander.execute("apt-mark", &args).await {
            warn!("apt-mark {} failed: {}", verb, err);
        }
    }

    /// Remove cached index files after an install run. Failures are
    /// logged and skipped.
    fn wipe_apt_lists(&self) {
        let dir = Path::new(APT_LISTS_DIR);
        if !self.fs.exists(dir) {
            return;
        }
        let children = match self.fs.list_dir(dir) {
            Ok(children) => children,
            Err(err) => {
                warn!("Could not read {}: {}", APT_LISTS_DIR, err);
                return;
            }
        };
        for child in children {
            let removed = if self.fs.is_dir(&child) {
                self.fs.remove_dir_all(&child)
            } else {
                self.fs.remove_file(&child)
            };
            if let Err(err) = removed {
                warn!("Could not remove {}: {}", child.display(), err);
            }
        }
    }

    async fn install_system_packages(&self, packages: &[String]) -> Result<()> {
        match self.os.os_type {
            OsType::Alpine => {
                let mut args: Vec<&str> = vec!["add", "--no-cache"];
                args.extend(packages.iter().map(String::as_str));
                self.commander.execute("apk", &args).await?;
            }
            OsType::Debian | OsType::Ubuntu => {
                if self.os.is_proxmox {
                    self.mark_held_packages("hold").await;
                }
                self.commander.execute("apt-get", &["update"]).await?;

                let mut args: Vec<&str> = vec!["install", "--yes"];
                args.extend(packages.iter().map(String::as_str));
                self.commander.execute("apt-get", &args).await?;

                self.commander
                    .execute("apt-get", &["autoremove", "--yes"])
                    .await?;
                self.commander.execute("apt-get", &["clean"]).await?;
                self.wipe_apt_lists();

                if self.os.is_proxmox {
                    self.mark_held_packages("unhold").await;
                }
            }
        }
        Ok(())
    }

    async fn install_pip_packages(&self, packages: &[String], use_uv: bool) -> Result<()> {
        if use_uv {
            if !self.commander.succeeds("which", &["uv"]).await {
                debug!("uv not present, bootstrapping through pip3");
                self.commander.execute("pip3", &["install", "uv"]).await?;
            }
            let mut args: Vec<&str> = vec!["pip", "install"];
            args.extend(packages.iter().map(String::as_str));
            self.commander.execute("uv", &args).await?;
        } else {
            let mut args: Vec<&str> = vec!["install"];
            args.extend(packages.iter().map(String::as_str));
            self.commander.execute("pip3", &args).await?;
        }
        Ok(())
    }

    /// Copy the current file to a sibling `.bak` before overwriting.
    fn write_with_sibling_bak(&self, path: &Path, content: &str) -> Result<()> {
        if self.fs.exists(path) {
            let existing = self.fs.read_bytes(path)?;
            let mode = self.fs.metadata(path)?.mode;
            let mut bak = path.as_os_str().to_owned();
            bak.push(".bak");
            self.fs.write(&PathBuf::from(bak), &existing, mode)?;
        } else if let Some(parent) = path.parent() {
            if !self.fs.exists(parent) {
                self.fs.create_dir_all(parent, 0o755)?;
            }
        }
        self.fs.write(path, content.as_bytes(), 0o644)?;
        Ok(())
    }

    async fn update_apt_sources(&self, sources: &PackageSources) -> Result<()> {
        let repos = if self.os.is_proxmox {
            &sources.proxmox_src_repos
        } else {
            &sources.debian_repos
        };
        if !repos.is_empty() {
            let content = repos
                .iter()
                .map(|line| PackageSources::render(line, &self.os.codename))
                .collect::<Vec<_>>()
                .join("\n")
                + "\n";
            self.write_with_sibling_bak(Path::new(SOURCES_LIST), &content)?;
        }

        if self.os.is_proxmox {
            if !sources.proxmox_ceph_repo.is_empty() {
                let line = PackageSources::render(&sources.proxmox_ceph_repo, &self.os.codename);
                self.write_with_sibling_bak(Path::new(CEPH_LIST), &format!("{}\n", line))?;
            }
            if !sources.proxmox_enterprise_repo.is_empty() {
                let line =
                    PackageSources::render(&sources.proxmox_enterprise_repo, &self.os.codename);
                self.write_with_sibling_bak(Path::new(ENTERPRISE_LIST), &format!("{}\n", line))?;
            }
        }

        self.commander.execute("apt-get", &["update"]).await?;
        Ok(())
    }

    async fn update_apk_sources(&self, sources: &PackageSources) -> Result<()> {
        let repo = sources.alpine_testing_repo.trim();
        if !repo.is_empty() {
            let path = Path::new(APK_REPOSITORIES);
            let existing = if self.fs.exists(path) {
                self.fs.read_to_string(path)?
            } else {
                String::new()
            };
            if existing.lines().any(|line| line.trim() == repo) {
                debug!("Testing repository already present in {}", APK_REPOSITORIES);
            } else {
                let mut content = existing;
                if !content.is_empty() && !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str(repo);
                content.push('\n');
                self.write_with_sibling_bak(path, &content)?;
            }
        }
        self.commander.execute("apk", &["update"]).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PackagePort for PackageAdapter {
    async fn install(&self, request: &PackageInstallRequest) -> Result<()> {
        if !request.packages.is_empty() {
            self.install_system_packages(&request.packages).await?;
        }
        if request.is_python && !request.pip_packages.is_empty() {
            self.install_pip_packages(&request.pip_packages, request.use_uv)
                .await?;
        }
        info!(
            "Installed {} packages for the {} profile",
            request.packages.len() + request.pip_packages.len(),
            request.package_type
        );
        Ok(())
    }

    async fn is_installed(&self, package: &str) -> bool {
        match self.os.os_type {
            OsType::Alpine => self.commander.succeeds("apk", &["info", "-e", package]).await,
            OsType::Debian | OsType::Ubuntu => {
                self.commander.succeeds("dpkg", &["-l", package]).await
            }
        }
    }

    async fn update_sources(&self, sources: &PackageSources) -> Result<()> {
        match self.os.os_type {
            OsType::Alpine => self.update_apk_sources(sources).await,
            OsType::Debian | OsType::Ubuntu => self.update_apt_sources(sources).await,
        }
    }

    async fn enable_auto_updates(&self) -> Result<()> {
        match self.os.os_type {
            OsType::Alpine => {
                let path = Path::new(APK_UPGRADE_SCRIPT);
                if let Some(parent) = path.parent() {
                    if !self.fs.exists(parent) {
                        self.fs.create_dir_all(parent, 0o755)?;
                    }
                }
                self.fs
                    .write(path, b"#!/bin/sh\napk upgrade --no-cache\n", 0o755)?;
                info!("Installed daily apk upgrade script");
            }
            OsType::Debian | OsType::Ubuntu => {
                self.commander
                    .execute("apt-get", &["install", "--yes", "unattended-upgrades"])
                    .await?;
                self.commander
                    .execute_with_input(
                        "debconf-set-selections",
                        &[],
                        "unattended-upgrades unattended-upgrades/enable_auto_updates boolean true\n",
                    )
                    .await?;
                self.commander
                    .execute(
                        "dpkg-reconfigure",
                        &["-f", "noninteractive", "unattended-upgrades"],
                    )
                    .await?;
                self.commander
                    .execute("systemctl", &["enable", "unattended-upgrades"])
                    .await?;
                info!("Unattended upgrades enabled");
            }
        }
        Ok(())
    }
}
