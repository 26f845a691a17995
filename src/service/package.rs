// file: src/service/package.rs
// version: 1.0.0
// guid: 50c7e1a9-2d84-4f36-b0e5-9a41d8c62f07

//! Package profile resolution and installation

use crate::model::{OsInfo, PackageInstallRequest, PackageSources, PackageType};
use crate::platform::NetworkInfo;
use crate::ports::PackagePort;
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PackageService {
    port: Arc<dyn PackagePort>,
    network: Arc<dyn NetworkInfo>,
    sources: PackageSources,
    os: OsInfo,
    is_wsl: bool,
    /// Dotted address prefix marking the DMZ network, when one exists
    dmz_subnet: Option<String>,
}

impl PackageService {
    pub fn new(
        port: Arc<dyn PackagePort>,
        network: Arc<dyn NetworkInfo>,
        sources: PackageSources,
        os: OsInfo,
        is_wsl: bool,
        dmz_subnet: Option<String>,
    ) -> Self {
        Self {
            port,
            network,
            sources,
            os,
            is_wsl,
            dmz_subnet,
        }
    }

    /// Hosts addressed inside the DMZ subnet get the dmz profile even
    /// when core was requested.
    fn resolve_profile(&self, requested: PackageType) -> PackageType {
        if requested != PackageType::Core {
            return requested;
        }
        let Some(prefix) = &self.dmz_subnet else {
            return requested;
        };
        match self.network.has_subnet_prefix(prefix) {
            Ok(true) => {
                info!("Host address is inside {}, selecting the dmz profile", prefix);
                PackageType::Dmz
            }
            Ok(false) => requested,
            Err(e) => {
                warn!("DMZ subnet probe failed, keeping core profile: {}", e);
                requested
            }
        }
    }

    /// Install the profile's packages; returns the profile actually
    /// installed after DMZ resolution.
    pub async fn install_profile(
        &self,
        requested: PackageType,
        use_uv: bool,
    ) -> Result<PackageType> {
        let resolved = self.resolve_profile(requested);
        let packages = self
            .sources
            .packages_for(self.os.os_type, resolved, self.is_wsl);
        let mut request = PackageInstallRequest::new(resolved, packages);
        request.pip_packages = self.sources.pip_packages_for(resolved);
        request.use_uv = use_uv;
        request.validate()?;

        self.port.install(&request).await?;
        Ok(resolved)
    }

    pub async fn update_sources(&self) -> Result<()> {
        self.port.update_sources(&self.sources).await
    }

    pub async fn is_installed(&self, package: &str) -> bool {
        self.port.is_installed(package).await
    }

    pub async fn enable_auto_updates(&self) -> Result<()> {
        self.port.enable_auto_updates().await
    }

    /// Install a fixed list of distro packages outside any profile
    pub async fn install_packages(&self, packages: &[String]) -> Result<()> {
        let request = PackageInstallRequest::new(PackageType::Core, packages.to_vec());
        request.validate()?;
        self.port.install(&request).await
    }

    pub async fn install_single(&self, package: &str) -> Result<()> {
        self.install_packages(&[package.to_string()]).await
    }
}
