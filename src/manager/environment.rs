// file: src/manager/environment.rs
// version: 1.0.0
// guid: 0c6e9a45-3f82-4d17-b5c0-8e24f7d1a396

//! Sudo-preservation and locale intents

use crate::model::{EnvironmentConfig, LocaleSettings};
use crate::service::EnvironmentService;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;

pub struct EnvironmentManager {
    service: Arc<EnvironmentService>,
}

impl EnvironmentManager {
    pub fn new(service: Arc<EnvironmentService>) -> Self {
        Self { service }
    }

    /// Keep the config variable visible across the sudo boundary
    pub async fn setup(&self, config: &EnvironmentConfig) -> Result<()> {
        self.service.setup(config).await
    }

    /// Advisory message when sudo dropped the config variable, if any
    pub async fn check(&self, env: &HashMap<String, String>) -> Result<Option<String>> {
        self.service.check_preservation(env).await
    }

    /// Write the locale and timezone block to /etc/environment
    pub async fn apply_environment(&self, locale: &LocaleSettings) -> Result<()> {
        self.service.configure_locale(locale).await
    }
}
