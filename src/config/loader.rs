// file: src/config/loader.rs
// version: 1.0.0
// guid: 2b9e7c45-d18a-4f63-90b2-5ae4c7d01f38

//! Configuration discovery, loading and environment variable substitution

use super::HardnConfig;
use crate::model::environment::CONFIG_ENV_VAR;
use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Well-known config locations, probed in order after the explicit ones
pub const SYSTEM_CONFIG: &str = "/etc/hardn/hardn.yml";
const LOCAL_CONFIG: &str = "hardn.yml";

/// Loads the YAML settings document with `${VAR}` substitution.
///
/// Discovery precedence: command-line path, then `HARDN_CONFIG`, then
/// `/etc/hardn/hardn.yml`, `$HOME/.config/hardn/hardn.yml`,
/// `$HOME/.hardn.yml` and finally `./hardn.yml`. An explicitly named
/// file that does not exist is an error; exhausting the probe list is
/// not, since every option has a default.
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader over the real process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
            home: dirs::home_dir(),
        }
    }

    /// Create a loader over a fixed environment (test seam)
    pub fn with_env(env_vars: HashMap<String, String>, home: Option<PathBuf>) -> Self {
        Self { env_vars, home }
    }

    /// Resolve and load the effective configuration.
    ///
    /// Returns the settings document and the path it came from; the path
    /// is `None` when no candidate existed and the defaults apply.
    pub fn discover(&self, cli_path: Option<&Path>) -> Result<(HardnConfig, Option<PathBuf>)> {
        if let Some(path) = cli_path {
            let path = self.expand_path(&path.to_string_lossy());
            return self
                .load_explicit(&path, "command line")
                .map(|config| (config, Some(path)));
        }

        if let Some(value) = self.env_vars.get(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            let path = self.expand_path(value);
            return self
                .load_explicit(&path, CONFIG_ENV_VAR)
                .map(|config| (config, Some(path)));
        }

        for candidate in self.candidates() {
            if candidate.exists() {
                debug!("Using config file {}", candidate.display());
                return self.load(&candidate).map(|config| (config, Some(candidate)));
            }
        }

        debug!("No config file found; using built-in defaults");
        Ok((HardnConfig::default(), None))
    }

    /// Load and validate one settings document
    pub fn load(&self, path: &Path) -> Result<HardnConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            crate::error::HardnError::Config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let expanded = self.expand_env_vars(&content)?;
        let config: HardnConfig = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn load_explicit(&self, path: &Path, origin: &str) -> Result<HardnConfig> {
        if !path.exists() {
            return Err(crate::error::HardnError::Config(format!(
                "config file from {} not found: {}",
                origin,
                path.display()
            )));
        }
        self.load(path)
    }

    fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(SYSTEM_CONFIG)];
        if let Some(home) = &self.home {
            candidates.push(home.join(".config/hardn/hardn.yml"));
            candidates.push(home.join(".hardn.yml"));
        }
        candidates.push(PathBuf::from(LOCAL_CONFIG));
        candidates
    }

    fn expand_path(&self, raw: &str) -> PathBuf {
        let expanded = shellexpand::tilde_with_context(raw, || {
            self.home.as_ref().map(|h| h.to_string_lossy())
        });
        PathBuf::from(expanded.as_ref())
    }

    /// Substitute `${VAR}` references with environment values.
    ///
    /// Unresolvable references are an error rather than silently kept,
    /// so a missing secret fails loudly instead of landing verbatim in a
    /// sudoers or sshd file.
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            crate::error::HardnError::Config(format!("invalid substitution pattern: {}", e))
        })?;

        let mut result = content.to_string();
        let mut missing = Vec::new();

        for cap in re.captures_iter(content) {
            let name = &cap[1];
            let placeholder = &cap[0];
            if let Some(value) = self.env_vars.get(name) {
                result = result.replace(placeholder, value);
            } else if !missing.contains(&name.to_string()) {
                missing.push(name.to_string());
            }
        }

        if !missing.is_empty() {
            return Err(crate::error::HardnError::Config(format!(
                "missing environment variables referenced by the config: {}",
                missing.join(", ")
            )));
        }

        Ok(result)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn loader_with(env: &[(&str, &str)], home: Option<PathBuf>) -> ConfigLoader {
        let env_vars = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigLoader::with_env(env_vars, home)
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let loader = loader_with(&[], None);
        let result = loader.discover(Some(Path::new("/nonexistent/hardn.yml")));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("/nonexistent/hardn.yml"));
    }

    #[test]
    fn test_missing_env_config_does_not_fall_through() {
        let home = TempDir::new().unwrap();
        // A perfectly good home-level config exists, but the explicit
        // HARDN_CONFIG path is broken and must win.
        std::fs::write(home.path().join(".hardn.yml"), "username: ops\n").unwrap();
        let loader = loader_with(
            &[("HARDN_CONFIG", "/nonexistent/hardn.yml")],
            Some(home.path().to_path_buf()),
        );
        assert!(loader.discover(None).is_err());
    }

    #[test]
    fn test_env_config_path_loads() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "username: ops\nsshPort: 2222").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let loader = loader_with(&[("HARDN_CONFIG", &path)], None);
        let (config, source) = loader.discover(None).unwrap();
        assert_eq!(config.username, "ops");
        assert_eq!(config.ssh_port, 2222);
        assert_eq!(source, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_home_discovery_order() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join(".config/hardn")).unwrap();
        std::fs::write(
            home.path().join(".config/hardn/hardn.yml"),
            "username: from-xdg\n",
        )
        .unwrap();
        std::fs::write(home.path().join(".hardn.yml"), "username: from-dotfile\n").unwrap();

        let loader = loader_with(&[], Some(home.path().to_path_buf()));
        let (config, source) = loader.discover(None).unwrap();
        assert_eq!(config.username, "from-xdg");
        assert_eq!(
            source,
            Some(home.path().join(".config/hardn/hardn.yml"))
        );

        // Remove the preferred candidate; the dotfile is next
        std::fs::remove_file(home.path().join(".config/hardn/hardn.yml")).unwrap();
        let (config, _) = loader.discover(None).unwrap();
        assert_eq!(config.username, "from-dotfile");
    }

    #[test]
    fn test_defaults_when_nothing_found() {
        let home = TempDir::new().unwrap();
        let loader = loader_with(&[], Some(home.path().to_path_buf()));
        let (config, source) = loader.discover(None).unwrap();
        assert_eq!(source, None);
        assert_eq!(config.ssh_port, 22);
        assert!(config.username.is_empty());
    }

    #[test]
    fn test_tilde_expansion_for_cli_path() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join("custom.yml"), "sshPort: 2022\n").unwrap();

        let loader = loader_with(&[], Some(home.path().to_path_buf()));
        let (config, source) = loader
            .discover(Some(Path::new("~/custom.yml")))
            .unwrap();
        assert_eq!(config.ssh_port, 2022);
        assert_eq!(source, Some(home.path().join("custom.yml")));
    }

    #[test]
    fn test_env_var_substitution() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "username: ${{HARDN_ADMIN}}").unwrap();
        let path = file.path().to_path_buf();

        let loader = loader_with(&[("HARDN_ADMIN", "ops")], None);
        let config = loader.load(&path).unwrap();
        assert_eq!(config.username, "ops");

        let bare = loader_with(&[], None);
        let err = bare.load(&path).unwrap_err().to_string();
        assert!(err.contains("HARDN_ADMIN"));
    }

    #[test]
    fn test_invalid_document_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sshPort: 0").unwrap();

        let loader = loader_with(&[], None);
        assert!(loader.load(file.path()).is_err());
    }
}
