// file: src/adapters/environment.rs
// version: 1.0.0
// guid: 9c4e2f17-5a83-4d60-b1f9-e72a08c5d431

//! Sudo env_keep rules, login-environment probes and locale files

use crate::model::{EnvironmentConfig, LocaleSettings, OsInfo, OsType};
use crate::platform::{Commander, FileSystem};
use crate::ports::{BackupPort, EnvironmentPort};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const SUDOERS_DIR: &str = "/etc/sudoers.d";
const ENVIRONMENT_FILE: &str = "/etc/environment";

pub struct EnvironmentAdapter {
    fs: Arc<dyn FileSystem>,
    commander: Arc<dyn Commander>,
    backup: Arc<dyn BackupPort>,
    os: OsInfo,
}

impl EnvironmentAdapter {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        commander: Arc<dyn Commander>,
        backup: Arc<dyn BackupPort>,
        os: OsInfo,
    ) -> Self {
        Self {
            fs,
            commander,
            backup,
            os,
        }
    }
}

#[async_trait::async_trait]
impl EnvironmentPort for EnvironmentAdapter {
    async fn preserve_config_var(&self, username: &str) -> Result<()> {
        let sudoers_dir = Path::new(SUDOERS_DIR);
        if !self.fs.is_dir(sudoers_dir) {
            return Err(crate::error::HardnError::not_found(format!(
                "{} does not exist; is sudo installed?",
                SUDOERS_DIR
            )));
        }

        let target = sudoers_dir.join(username);
        let existing = if self.fs.exists(&target) {
            self.fs.read_to_string(&target)?
        } else {
            String::new()
        };

        if existing.contains(&EnvironmentConfig::env_keep_token()) {
            debug!("env_keep rule already present in {}", target.display());
            return Ok(());
        }

        let mut content = existing;
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&EnvironmentConfig::env_keep_line(username));
        content.push('\n');

        super::write_validated_sudoers(&self.fs, &self.commander, &self.backup, &target, &content)
            .await?;
        info!("Installed env_keep rule for {}", username);
        Ok(())
    }

    async fn probe_user_env_var(&self, username: &str, var: &str) -> Result<String> {
        let shell_cmd = format!("echo ${}", var);
        let output = self
            .commander
            .execute("su", &["-", username, "-c", &shell_cmd])
            .await?;
        Ok(output.trim().to_string())
    }

    async fn configure_locale(&self, locale: &LocaleSettings) -> Result<()> {
        let path = Path::new(ENVIRONMENT_FILE);
        let existing = if self.fs.exists(path) {
            self.fs.read_to_string(path)?
        } else {
            String::new()
        };

        // Keep unrelated variables, replace ours
        let managed: Vec<&str> = locale.entries().iter().map(|(key, _)| *key).collect();
        let mut lines: Vec<String> = existing
            .lines()
            .filter(|line| {
                let key = line.split('=').next().unwrap_or("").trim();
                !managed.contains(&key)
            })
            .map(str::to_string)
            .collect();
        for (key, value) in locale.entries() {
            lines.push(format!("{}={}", key, value));
        }
        let content = lines.join("\n") + "\n";

        self.backup.backup_file(path).await?;
        self.fs.write(path, content.as_bytes(), 0o644)?;

        match self.os.os_type {
            OsType::Debian | OsType::Ubuntu => {
                self.commander.execute("locale-gen", &[&locale.lang]).await?;
            }
            // musl has no locale database to generate
            OsType::Alpine => {}
        }
        info!("Locale settings written to {}", ENVIRONMENT_FILE);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BackupConfig;
    use crate::platform::{MemoryFileSystem, MockCommander};
    use std::path::PathBuf;

    fn os(os_type: OsType) -> OsInfo {
        OsInfo {
            os_type,
            version: "test".to_string(),
            codename: "test".to_string(),
            is_proxmox: false,
        }
    }

    fn adapter(
        os_type: OsType,
    ) -> (Arc<MemoryFileSystem>, Arc<MockCommander>, EnvironmentAdapter) {
        let mem = Arc::new(MemoryFileSystem::new());
        let mock = Arc::new(MockCommander::new());
        let backup = Arc::new(crate::adapters::BackupAdapter::new(
            mem.clone(),
            BackupConfig {
                enabled: false,
                backup_dir: PathBuf::from("/var/backups/hardn"),
            },
        ));
        let adapter = EnvironmentAdapter::new(mem.clone(), mock.clone(), backup, os(os_type));
        (mem, mock, adapter)
    }

    #[tokio::test]
    async fn test_preserve_requires_sudoers_dir() {
        let (_, _, adapter) = adapter(OsType::Debian);

        let err = adapter.preserve_config_var("ops").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_preserve_appends_to_existing_policy() {
        let (mem, _, adapter) = adapter(OsType::Debian);
        mem.insert_dir(SUDOERS_DIR, 0o750);
        mem.insert_file("/etc/sudoers.d/ops", "ops ALL=(ALL) ALL\n", 0o440);

        adapter.preserve_config_var("ops").await.unwrap();

        assert_eq!(
            mem.contents_of("/etc/sudoers.d/ops").unwrap(),
            "ops ALL=(ALL) ALL\nDefaults:ops env_keep += \"HARDN_CONFIG\"\n"
        );
        assert_eq!(mem.mode_of("/etc/sudoers.d/ops"), Some(0o440));
    }

    #[tokio::test]
    async fn test_preserve_is_idempotent() {
        let (mem, mock, adapter) = adapter(OsType::Debian);
        mem.insert_dir(SUDOERS_DIR, 0o750);

        adapter.preserve_config_var("ops").await.unwrap();
        adapter.preserve_config_var("ops").await.unwrap();

        let visudo_runs = mock
            .calls()
            .iter()
            .filter(|c| c.starts_with("visudo"))
            .count();
        assert_eq!(visudo_runs, 1);
        assert_eq!(
            mem.contents_of("/etc/sudoers.d/ops").unwrap(),
            "Defaults:ops env_keep += \"HARDN_CONFIG\"\n"
        );
    }

    #[tokio::test]
    async fn test_preserve_rejected_by_visudo() {
        let (mem, mock, adapter) = adapter(OsType::Debian);
        mem.insert_dir(SUDOERS_DIR, 0o750);
        mock.fail_program("visudo", 1, "syntax error");

        let err = adapter.preserve_config_var("ops").await.unwrap_err();
        assert!(err.to_string().contains("validation failed"));
        assert!(mem.contents_of("/etc/sudoers.d/ops").is_none());
    }

    #[tokio::test]
    async fn test_probe_user_env_var() {
        let (_, mock, adapter) = adapter(OsType::Debian);
        mock.respond("su - ops -c echo $HARDN_CONFIG", "/etc/hardn/hardn.yml\n");

        let value = adapter
            .probe_user_env_var("ops", "HARDN_CONFIG")
            .await
            .unwrap();
        assert_eq!(value, "/etc/hardn/hardn.yml");
    }

    #[tokio::test]
    async fn test_locale_merges_environment_file() {
        let (mem, mock, adapter) = adapter(OsType::Debian);
        mem.insert_file(ENVIRONMENT_FILE, "EDITOR=vim\nLANG=C\n", 0o644);

        adapter
            .configure_locale(&LocaleSettings::default())
            .await
            .unwrap();

        let written = mem.contents_of(ENVIRONMENT_FILE).unwrap();
        assert!(written.starts_with("EDITOR=vim\n"));
        assert!(written.contains("LANG=en_US.UTF-8\n"));
        assert!(written.contains("TZ=UTC\n"));
        assert!(!written.contains("LANG=C"));
        assert!(mock.was_called("locale-gen en_US.UTF-8"));
    }

    #[tokio::test]
    async fn test_locale_skips_locale_gen_on_alpine() {
        let (mem, mock, adapter) = adapter(OsType::Alpine);

        adapter
            .configure_locale(&LocaleSettings::default())
            .await
            .unwrap();

        assert!(mem.contents_of(ENVIRONMENT_FILE).is_some());
        assert!(mock.recorded().is_empty());
    }
}
