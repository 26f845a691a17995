// file: src/model/environment.rs
// version: 1.0.0
// guid: e54a1c93-7b2d-4f68-8a05-c97d3e41b286

//! Sudo environment preservation settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable carrying the config file path across sudo
pub const CONFIG_ENV_VAR: &str = "HARDN_CONFIG";

/// Settings for keeping the config path visible under sudo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// Value HARDN_CONFIG should carry
    pub config_path: PathBuf,
    /// Write the env_keep sudoers rule during setup
    pub preserve_sudo: bool,
    /// The non-root operator's login
    pub username: String,
}

impl EnvironmentConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.preserve_sudo && self.username.trim().is_empty() {
            return Err(crate::error::HardnError::validation(
                "sudo preservation requires a username",
            ));
        }
        Ok(())
    }

    /// The sudoers line that keeps the variable across sudo
    pub fn env_keep_line(username: &str) -> String {
        format!("Defaults:{} env_keep += \"{}\"", username, CONFIG_ENV_VAR)
    }

    /// Token whose presence in a sudoers drop-in marks setup as done
    pub fn env_keep_token() -> String {
        format!("env_keep += \"{}\"", CONFIG_ENV_VAR)
    }
}

/// Locale and timezone values written to /etc/environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleSettings {
    pub lang: String,
    pub language: String,
    pub lc_all: String,
    pub tz: String,
    pub python_unbuffered: String,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            lang: "en_US.UTF-8".to_string(),
            language: "en_US:en".to_string(),
            lc_all: "en_US.UTF-8".to_string(),
            tz: "UTC".to_string(),
            python_unbuffered: "1".to_string(),
        }
    }
}

impl LocaleSettings {
    /// Variable/value pairs in the order they are written
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("LANG", self.lang.as_str()),
            ("LANGUAGE", self.language.as_str()),
            ("LC_ALL", self.lc_all.as_str()),
            ("TZ", self.tz.as_str()),
            ("PYTHONUNBUFFERED", self.python_unbuffered.as_str()),
        ]
    }
}
