// file: src/service/environment.rs
// version: 1.0.0
// guid: f07c2e85-1b94-4d63-a5f0-84d21c96e3b7

//! Sudo environment preservation checks and setup

use crate::model::{environment::CONFIG_ENV_VAR, EnvironmentConfig, LocaleSettings};
use crate::ports::EnvironmentPort;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct EnvironmentService {
    port: Arc<dyn EnvironmentPort>,
}

impl EnvironmentService {
    pub fn new(port: Arc<dyn EnvironmentPort>) -> Self {
        Self { port }
    }

    pub async fn setup(&self, config: &EnvironmentConfig) -> Result<()> {
        config.validate()?;
        if config.preserve_sudo {
            self.port.preserve_config_var(&config.username).await?;
        }
        Ok(())
    }

    /// Detect the config variable being dropped at the sudo boundary.
    ///
    /// Fires only when the process runs under sudo, the variable is
    /// absent here, and the invoking user's login shell does carry it.
    /// Returns an advisory message when that is the case.
    pub async fn check_preservation(
        &self,
        env: &HashMap<String, String>,
    ) -> Result<Option<String>> {
        if !env.contains_key("SUDO_UID") || env.contains_key(CONFIG_ENV_VAR) {
            return Ok(None);
        }
        let Some(sudo_user) = env.get("SUDO_USER") else {
            return Ok(None);
        };

        match self.port.probe_user_env_var(sudo_user, CONFIG_ENV_VAR).await {
            Ok(value) if !value.is_empty() => Ok(Some(format!(
                "{} is set to {} for {} but sudo dropped it; run `hardn env setup` to preserve it",
                CONFIG_ENV_VAR, value, sudo_user
            ))),
            Ok(_) => Ok(None),
            Err(e) => {
                debug!("Environment probe failed for {}: {}", sudo_user, e);
                Ok(None)
            }
        }
    }

    pub async fn configure_locale(&self, locale: &LocaleSettings) -> Result<()> {
        self.port.configure_locale(locale).await
    }
}
