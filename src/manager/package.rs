// file: src/manager/package.rs
// version: 1.0.0
// guid: b5d9f3a8-1e64-4c27-80b5-f92c6d48e130

//! Package installation intents

use crate::model::PackageType;
use crate::service::PackageService;
use crate::Result;
use std::sync::Arc;

pub struct PackageManager {
    service: Arc<PackageService>,
}

impl PackageManager {
    pub fn new(service: Arc<PackageService>) -> Self {
        Self { service }
    }

    /// Install a named profile; returns the profile actually installed
    /// after DMZ resolution
    pub async fn install(&self, profile: PackageType, use_uv: bool) -> Result<PackageType> {
        self.service.install_profile(profile, use_uv).await
    }

    pub async fn install_packages(&self, packages: &[String]) -> Result<()> {
        self.service.install_packages(packages).await
    }

    pub async fn install_single(&self, package: &str) -> Result<()> {
        self.service.install_single(package).await
    }

    pub async fn update_sources(&self) -> Result<()> {
        self.service.update_sources().await
    }

    pub async fn enable_auto_updates(&self) -> Result<()> {
        self.service.enable_auto_updates().await
    }

    pub async fn is_installed(&self, package: &str) -> bool {
        self.service.is_installed(package).await
    }
}
