// file: src/service/user.rs
// version: 1.0.0
// guid: a3f7d028-6b91-4e45-8c2a-d50f38e71b96

//! Account provisioning and inspection

use crate::model::{validate_public_key, Group, User};
use crate::ports::{LastLoginPort, UserPort};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub struct UserService {
    users: Arc<dyn UserPort>,
    last_login: Arc<dyn LastLoginPort>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserPort>, last_login: Arc<dyn LastLoginPort>) -> Self {
        Self { users, last_login }
    }

    /// Create the account with its keys and sudo policy.
    ///
    /// Re-runnable: an existing account is kept, keys already present
    /// are not duplicated, the sudo policy is rewritten in place.
    pub async fn create_user(&self, user: &User) -> Result<()> {
        user.validate()?;
        // Reject bad keys before any mutation happens
        for key in &user.ssh_keys {
            validate_public_key(key)?;
        }

        if self.users.exists(&user.username).await {
            debug!("User {} already exists, updating in place", user.username);
        } else {
            self.users.create(&user.username).await?;
        }

        if user.has_sudo {
            self.users.grant_admin_group(&user.username).await?;
        }

        for key in &user.ssh_keys {
            self.users.add_ssh_key(&user.username, key).await?;
        }

        if user.has_sudo {
            self.users
                .write_sudo_policy(&user.username, user.sudo_no_password)
                .await?;
        }

        info!("User {} provisioned", user.username);
        Ok(())
    }

    /// Account details enriched with sudo state, keys and last login.
    ///
    /// The login lookup is best-effort; hosts without wtmp simply
    /// report no last login.
    pub async fn extended_info(&self, username: &str) -> Result<User> {
        let mut user = self.users.lookup(username).await?;
        user.has_sudo = self.users.has_sudo(username).await.unwrap_or(false);
        user.ssh_keys = self
            .users
            .list_ssh_keys(username)
            .await
            .unwrap_or_default();

        match self.last_login.last_login(username).await {
            Ok(Some((when, source))) => {
                user.last_login = Some(when);
                user.last_login_ip = source;
            }
            Ok(None) => {}
            Err(e) => debug!("Last login lookup failed for {}: {}", username, e),
        }
        Ok(user)
    }

    pub async fn exists(&self, username: &str) -> bool {
        self.users.exists(username).await
    }

    pub async fn add_ssh_key(&self, username: &str, public_key: &str) -> Result<()> {
        validate_public_key(public_key)?;
        self.users.add_ssh_key(username, public_key).await
    }

    pub async fn list_ssh_keys(&self, username: &str) -> Result<Vec<String>> {
        self.users.list_ssh_keys(username).await
    }

    pub async fn non_system_users(&self) -> Result<Vec<User>> {
        self.users.non_system_users().await
    }

    pub async fn non_system_groups(&self) -> Result<Vec<Group>> {
        self.users.non_system_groups().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BackupAdapter, LastLoginAdapter, UserAdapter};
    use crate::model::{BackupConfig, OsInfo, OsType};
    use crate::platform::{MemoryFileSystem, MockCommander};
    use std::path::PathBuf;

    const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIedb ops@host";

    fn service(
        os_type: OsType,
    ) -> (Arc<MemoryFileSystem>, Arc<MockCommander>, UserService) {
        let mem = Arc::new(MemoryFileSystem::new());
        let mock = Arc::new(MockCommander::new());
        let backup = Arc::new(BackupAdapter::new(
            mem.clone(),
            BackupConfig {
                enabled: false,
                backup_dir: PathBuf::from("/var/backups/hardn"),
            },
        ));
        let os = OsInfo {
            os_type,
            version: "12".to_string(),
            codename: "bookworm".to_string(),
            is_proxmox: false,
        };
        let users = Arc::new(UserAdapter::new(mem.clone(), mock.clone(), backup, os));
        let last_login = Arc::new(LastLoginAdapter::new(mock.clone()));
        (mem, mock, UserService::new(users, last_login))
    }

    #[tokio::test]
    async fn test_create_user_full_flow() {
        let (mem, mock, service) = service(OsType::Debian);
        mock.fail("id ops", 1, "no such user");

        let user = User::new("ops", true, false).with_ssh_keys(vec![KEY.to_string()]);
        service.create_user(&user).await.unwrap();

        let calls = mock.calls();
        assert!(calls.iter().any(|c| c.starts_with("adduser")));
        assert!(calls.iter().any(|c| c == "usermod -aG sudo ops"));
        assert_eq!(
            mem.contents_of("/etc/sudoers.d/ops").unwrap(),
            "ops ALL=(ALL) ALL\n"
        );
        assert_eq!(
            mem.contents_of("/home/ops/.ssh/authorized_keys").unwrap(),
            format!("{}\n", KEY)
        );
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_key_before_mutating() {
        let (_, mock, service) = service(OsType::Debian);

        let user = User::new("ops", true, false)
            .with_ssh_keys(vec!["not a key".to_string()]);
        assert!(service.create_user(&user).await.is_err());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_user_skips_existing_account() {
        let (_, mock, service) = service(OsType::Debian);
        // id succeeds unscripted, so the account counts as present

        let user = User::new("ops", true, true);
        service.create_user(&user).await.unwrap();

        assert!(!mock.calls().iter().any(|c| c.starts_with("adduser")));
        assert!(mock.was_called("usermod -aG sudo ops"));
    }

    #[tokio::test]
    async fn test_extended_info_aggregates() {
        let (mem, mock, service) = service(OsType::Debian);
        mock.respond(
            "getent passwd ops",
            "ops:x:1000:1000:Ops:/home/ops:/bin/bash\n",
        );
        mem.insert_file("/etc/group", "sudo:x:27:ops\n", 0o644);
        mem.insert_file(
            "/home/ops/.ssh/authorized_keys",
            &format!("{}\n", KEY),
            0o600,
        );
        mock.respond(
            "lastlog -u ops",
            "Username         Port     From             Latest\n\
             ops              pts/0    10.0.0.9         Tue Aug 19 10:30:01 +0000 2025\n",
        );

        let user = service.extended_info("ops").await.unwrap();
        assert_eq!(user.uid, Some(1000));
        assert!(user.has_sudo);
        assert_eq!(user.ssh_keys, vec![KEY]);
        assert_eq!(user.last_login.as_deref(), Some("Tue Aug 19 10:30:01 +0000 2025"));
        assert_eq!(user.last_login_ip.as_deref(), Some("10.0.0.9"));
    }

    #[tokio::test]
    async fn test_extended_info_degrades_without_login_history() {
        let (_, mock, service) = service(OsType::Debian);
        mock.respond(
            "getent passwd ops",
            "ops:x:1000:1000:Ops:/home/ops:/bin/bash\n",
        );
        mock.fail_program("lastlog", 1, "lastlog: unexpected failure");
        mock.fail("which lastlog", 1, "");
        mock.fail_program("last", 1, "");

        let user = service.extended_info("ops").await.unwrap();
        assert!(user.last_login.is_none());
    }
}
