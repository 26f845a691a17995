// file: src/model/package.rs
// version: 1.0.0
// guid: 3e9c5b82-1f46-4a7d-b310-8c2d94e6fa51

//! Package profiles, install requests and repository source templates

use super::OsType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named install profile resolved against the running distro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Baseline tooling every hardened host gets
    Core,
    /// Service hosts exposed to untrusted networks
    Dmz,
    /// Development or experiment machines
    Lab,
    /// Python toolchain including pip packages
    Python,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Core => "core",
            PackageType::Dmz => "dmz",
            PackageType::Lab => "lab",
            PackageType::Python => "python",
        }
    }

    pub fn all() -> &'static [PackageType] {
        &[
            PackageType::Core,
            PackageType::Dmz,
            PackageType::Lab,
            PackageType::Python,
        ]
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = crate::error::HardnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "core" => Ok(PackageType::Core),
            "dmz" => Ok(PackageType::Dmz),
            "lab" => Ok(PackageType::Lab),
            "python" => Ok(PackageType::Python),
            other => Err(crate::error::HardnError::Validation(format!(
                "unknown package profile: {}",
                other
            ))),
        }
    }
}

/// Concrete package lists for one install run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInstallRequest {
    pub package_type: PackageType,
    /// Distro packages to install
    pub packages: Vec<String>,
    /// pip packages, only meaningful when `is_python` is set
    pub pip_packages: Vec<String>,
    /// Install pip packages through uv instead of pip3
    pub use_uv: bool,
    pub is_python: bool,
}

impl PackageInstallRequest {
    pub fn new(package_type: PackageType, packages: Vec<String>) -> Self {
        Self {
            package_type,
            packages,
            pip_packages: Vec::new(),
            use_uv: false,
            is_python: package_type == PackageType::Python,
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.packages.is_empty() && self.pip_packages.is_empty() {
            return Err(crate::error::HardnError::validation(
                "install request has no packages",
            ));
        }
        if !self.is_python && !self.pip_packages.is_empty() {
            return Err(crate::error::HardnError::validation(
                "pip packages are only valid for a python install",
            ));
        }
        for name in self.packages.iter().chain(self.pip_packages.iter()) {
            if name.trim().is_empty() {
                return Err(crate::error::HardnError::validation(
                    "package names must not be blank",
                ));
            }
        }
        Ok(())
    }
}

/// Repository templates and per-distro package lists.
///
/// Repository strings may contain the literal `CODENAME` token which is
/// replaced with the release codename of the running host before writing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSources {
    /// Lines for /etc/apt/sources.list on plain Debian/Ubuntu
    pub debian_repos: Vec<String>,
    /// Lines for /etc/apt/sources.list on Proxmox hosts
    pub proxmox_src_repos: Vec<String>,
    /// Single line for /etc/apt/sources.list.d/ceph.list
    pub proxmox_ceph_repo: String,
    /// Single line for /etc/apt/sources.list.d/pve-enterprise.list
    pub proxmox_enterprise_repo: String,
    /// Extra line appended to /etc/apk/repositories
    pub alpine_testing_repo: String,

    pub linux_core_packages: Vec<String>,
    pub linux_dmz_packages: Vec<String>,
    pub linux_lab_packages: Vec<String>,
    pub python_packages: Vec<String>,
    /// Extra system packages skipped under WSL
    pub non_wsl_python_packages: Vec<String>,
    pub python_pip_packages: Vec<String>,
    pub alpine_core_packages: Vec<String>,
    pub alpine_dmz_packages: Vec<String>,
    pub alpine_lab_packages: Vec<String>,
    pub alpine_python_packages: Vec<String>,
}

impl PackageSources {
    /// Distro packages for a profile on the given OS.
    ///
    /// WSL hosts skip the packages that only make sense on real
    /// hardware or a full init system.
    pub fn packages_for(&self, os_type: OsType, package_type: PackageType, is_wsl: bool) -> Vec<String> {
        match os_type {
            OsType::Alpine => match package_type {
                PackageType::Core => self.alpine_core_packages.clone(),
                PackageType::Dmz => self.alpine_dmz_packages.clone(),
                PackageType::Lab => self.alpine_lab_packages.clone(),
                PackageType::Python => self.alpine_python_packages.clone(),
            },
            OsType::Debian | OsType::Ubuntu => match package_type {
                PackageType::Core => self.linux_core_packages.clone(),
                PackageType::Dmz => self.linux_dmz_packages.clone(),
                PackageType::Lab => self.linux_lab_packages.clone(),
                PackageType::Python => {
                    let mut packages = self.python_packages.clone();
                    if !is_wsl {
                        packages.extend(self.non_wsl_python_packages.iter().cloned());
                    }
                    packages
                }
            },
        }
    }

    pub fn pip_packages_for(&self, package_type: PackageType) -> Vec<String> {
        match package_type {
            PackageType::Python => self.python_pip_packages.clone(),
            _ => Vec::new(),
        }
    }

    /// Substitute the CODENAME token in a repository line
    pub fn render(template: &str, codename: &str) -> String {
        template.replace("CODENAME", codename)
    }
}
