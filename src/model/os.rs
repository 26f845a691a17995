// file: src/model/os.rs
// version: 1.0.0
// guid: c2e8b4d6-7a19-4f30-8e5c-d1a6920b473f

//! Operating system identity consumed by adapters

use serde::{Deserialize, Serialize};

/// Supported distribution families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsType {
    #[serde(rename = "debian")]
    Debian,
    #[serde(rename = "ubuntu")]
    Ubuntu,
    #[serde(rename = "alpine")]
    Alpine,
}

impl OsType {
    /// Get the distribution name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OsType::Debian => "debian",
            OsType::Ubuntu => "ubuntu",
            OsType::Alpine => "alpine",
        }
    }

    /// Whether this distribution uses apt/dpkg and systemd
    pub fn is_debian_family(&self) -> bool {
        matches!(self, OsType::Debian | OsType::Ubuntu)
    }

    /// Name of the administrative group granting sudo rights
    pub fn sudo_group(&self) -> &'static str {
        match self {
            OsType::Alpine => "wheel",
            _ => "sudo",
        }
    }
}

impl std::str::FromStr for OsType {
    type Err = crate::error::HardnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debian" => Ok(OsType::Debian),
            "ubuntu" => Ok(OsType::Ubuntu),
            "alpine" => Ok(OsType::Alpine),
            _ => Err(crate::error::HardnError::Validation(format!(
                "unsupported distribution: {}",
                s
            ))),
        }
    }
}

/// Identity of the host the tool is running on
///
/// Captured once at startup and handed to every adapter; there is no
/// re-detection mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsInfo {
    pub os_type: OsType,
    pub version: String,
    pub codename: String,
    pub is_proxmox: bool,
}

impl OsInfo {
    /// Build an OsInfo from `/etc/os-release` contents
    ///
    /// `has_pve` reports whether `/etc/pve` exists on the host, which marks
    /// a Proxmox VE installation on top of Debian. For Alpine the codename
    /// is the version string itself.
    pub fn from_os_release(contents: &str, has_pve: bool) -> crate::Result<Self> {
        let mut id = None;
        let mut version = None;
        let mut codename = None;

        for line in contents.lines() {
            let line = line.trim();
            if let Some(value) = line.strip_prefix("ID=") {
                id = Some(value.trim_matches('"').to_string());
            } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
                version = Some(value.trim_matches('"').to_string());
            } else if let Some(value) = line.strip_prefix("VERSION_CODENAME=") {
                codename = Some(value.trim_matches('"').to_string());
            }
        }

        let id = id.ok_or_else(|| {
            crate::error::HardnError::config("os-release is missing an ID field")
        })?;
        let os_type: OsType = id.parse()?;
        let version = version.unwrap_or_default();
        let codename = match os_type {
            OsType::Alpine => version.clone(),
            _ => codename.unwrap_or_default(),
        };

        Ok(Self {
            os_type,
            version,
            codename,
            is_proxmox: has_pve && os_type.is_debian_family(),
        })
    }

    /// A short human-readable label, e.g. "debian 12 (bookworm)"
    pub fn label(&self) -> String {
        if self.is_proxmox {
            format!("proxmox on {} {}", self.os_type.as_str(), self.version)
        } else if self.codename.is_empty() || self.codename == self.version {
            format!("{} {}", self.os_type.as_str(), self.version)
        } else {
            format!("{} {} ({})", self.os_type.as_str(), self.version, self.codename)
        }
    }
}
