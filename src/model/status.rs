// file: src/model/status.rs
// version: 1.0.0
// guid: 47a9d3f0-2c81-4e6b-95d7-e13b6a08c4f2

//! Observed security posture and risk grading

use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of the host's security posture, derived from on-disk state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStatus {
    /// sshd still permits root login, the one indicator where true is bad
    pub root_login_enabled: bool,
    pub firewall_enabled: bool,
    pub firewall_configured: bool,
    /// A non-root admin exists in sudoers.d or the admin group
    pub secure_users: bool,
    pub app_armor_enabled: bool,
    pub unattended_upgrades: bool,
    pub sudo_configured: bool,
    pub ssh_port_non_default: bool,
    pub password_auth_disabled: bool,
}

impl SecurityStatus {
    /// Count of satisfied indicators, out of nine.
    ///
    /// Root login counts when it is disabled; the other eight count
    /// when they are set.
    pub fn score(&self) -> u8 {
        let indicators = [
            !self.root_login_enabled,
            self.firewall_enabled,
            self.firewall_configured,
            self.secure_users,
            self.app_armor_enabled,
            self.unattended_upgrades,
            self.sudo_configured,
            self.ssh_port_non_default,
            self.password_auth_disabled,
        ];
        indicators.iter().filter(|&&set| set).count() as u8
    }

    pub fn max_score() -> u8 {
        9
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.score())
    }
}

/// Graded risk derived from the posture score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Critical,
    High,
    Moderate,
    Low,
    Minimal,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => RiskLevel::Critical,
            3..=4 => RiskLevel::High,
            5..=6 => RiskLevel::Moderate,
            7..=8 => RiskLevel::Low,
            _ => RiskLevel::Minimal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "Critical",
            RiskLevel::High => "High",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Low => "Low",
            RiskLevel::Minimal => "Minimal",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
