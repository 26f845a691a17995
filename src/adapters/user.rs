// file: src/adapters/user.rs
// version: 1.0.0
// guid: d72c5e18-9f40-4b6a-a3d5-20c8e61b47f9

//! Account management for Debian-family and Alpine hosts

use crate::model::{Group, OsInfo, OsType, User};
use crate::platform::{Commander, FileSystem};
use crate::ports::{BackupPort, UserPort};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const SUDOERS_DIR: &str = "/etc/sudoers.d";

/// Shells that mark an account as non-interactive
const NON_INTERACTIVE_SHELLS: [&str; 3] = ["/nologin", "/false", "/null"];
const EXCLUDED_USERS: [&str; 2] = ["nobody", "nfsnobody"];
const EXCLUDED_GROUPS: [&str; 3] = ["nobody", "nogroup", "nfsnobody"];

pub struct UserAdapter {
    fs: Arc<dyn FileSystem>,
    commander: Arc<dyn Commander>,
    backup: Arc<dyn BackupPort>,
    os: OsInfo,
}

impl UserAdapter {
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

    fn sudoers_path(username: &str) -> PathBuf {
        Path::new(SUDOERS_DIR).join(username)
    }

    /// Home directory from passwd, falling back to the convention
    async fn home_dir(&self, username: &str) -> PathBuf {
        match self.lookup(username).await {
            Ok(user) if !user.home_directory.is_empty() => PathBuf::from(user.home_directory),
            _ => {
                if username == "root" {
                    PathBuf::from("/root")
                } else {
                    Path::new("/home").join(username)
                }
            }
        }
    }

    fn parse_passwd_line(line: &str) -> Option<(String, u32, u32, String, String)> {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 7 {
            return None;
        }
        let uid = fields[2].parse().ok()?;
        let gid = fields[3].parse().ok()?;
        Some((
            fields[0].to_string(),
            uid,
            gid,
            fields[5].to_string(),
            fields[6].to_string(),
        ))
    }

    fn is_non_system(username: &str, uid: u32, shell: &str) -> bool {
        uid >= 1000
            && !EXCLUDED_USERS.contains(&username)
            && !NON_INTERACTIVE_SHELLS
                .iter()
                .any(|suffix| shell.trim().ends_with(suffix))
    }
}

#[async_trait::async_trait]
impl UserPort for UserAdapter {
    async fn exists(&self, username: &str) -> bool {
        self.commander.succeeds("id", &[username]).await
    }

    async fn create(&self, username: &str) -> Result<()> {
        info!("Creating user {}", username);
        match self.os.os_type {
            OsType::Alpine => {
                self.commander
                    .execute("adduser", &["-D", "-g", "", username])
                    .await?;
            }
            OsType::Debian | OsType::Ubuntu => {
                self.commander
                    .execute("adduser", &["--disabled-password", "--gecos", "", username])
                    .await?;
            }
        }
        Ok(())
    }

    async fn grant_admin_group(&self, username: &str) -> Result<()> {
        let group = self.os.os_type.sudo_group();
        debug!("Adding {} to group {}", username, group);
        match self.os.os_type {
            OsType::Alpine => {
                self.commander
                    .execute("addgroup", &[username, group])
                    .await?;
            }
            OsType::Debian | OsType::Ubuntu => {
                self.commander
                    .execute("usermod", &["-aG", group, username])
                    .await?;
            }
        }
        Ok(())
    }

    async fn write_sudo_policy(&self, username: &str, no_password: bool) -> Result<()> {
        let line = if no_password {
            format!("{} ALL=(ALL) NOPASSWD: ALL\n", username)
        } else {
            format!("{} ALL=(ALL) ALL\n", username)
        };
        let target = Self::sudoers_path(username);
        super::write_validated_sudoers(&self.fs, &self.commander, &self.backup, &target, &line)
            .await?;
        info!("Installed sudo policy for {}", username);
        Ok(())
    }

    async fn add_ssh_key(&self, username: &str, public_key: &str) -> Result<()> {
        let home = self.home_dir(username).await;
        let changed =
            super::append_authorized_key(&self.fs, &self.commander, &home, username, public_key)
                .await?;
        if changed {
            info!("Added SSH key for {}", username);
        }
        Ok(())
    }

    async fn list_ssh_keys(&self, username: &str) -> Result<Vec<String>> {
        let auth_file = self.home_dir(username).await.join(".ssh/authorized_keys");
        if !self.fs.exists(&auth_file) {
            return Ok(Vec::new());
        }
        let content = self.fs.read_to_string(&auth_file)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect())
    }

    async fn lookup(&self, username: &str) -> Result<User> {
        let output = self
            .commander
            .execute("getent", &["passwd", username])
            .await
            .map_err(|_| {
                crate::error::HardnError::not_found(format!("user does not exist: {}", username))
            })?;

        let line = output.lines().next().unwrap_or("");
        let (name, uid, gid, home, _shell) = Self::parse_passwd_line(line).ok_or_else(|| {
            crate::error::HardnError::probe(format!("unparseable passwd entry for {}", username))
        })?;

        Ok(User {
            username: name,
            uid: Some(uid),
            gid: Some(gid),
            home_directory: home,
            ..Default::default()
        })
    }

    async fn has_sudo(&self, username: &str) -> Result<bool> {
        // Admin group membership
        if let Ok(groups) = self.fs.read_to_string(Path::new("/etc/group")) {
            for line in groups.lines() {
                let fields: Vec<&str> = line.split(':').collect();
                if fields.len() == 4
                    && (fields[0] == "sudo" || fields[0] == "wheel")
                    && fields[3].split(',').any(|m| m.trim() == username)
                {
                    return Ok(true);
                }
            }
        }

        // Dedicated drop-in
        if self.fs.exists(&Self::sudoers_path(username)) {
            return Ok(true);
        }

        // Direct mention in the main sudoers file
        if let Ok(sudoers) = self.fs.read_to_string(Path::new("/etc/sudoers")) {
            if sudoers.contains(username) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn non_system_users(&self) -> Result<Vec<User>> {
        let passwd = self.fs.read_to_string(Path::new("/etc/passwd"))?;
        let mut users = Vec::new();
        for line in passwd.lines() {
            let Some((name, uid, gid, home, shell)) = Self::parse_passwd_line(line) else {
                continue;
            };
            if !Self::is_non_system(&name, uid, &shell) {
                continue;
            }
            users.push(User {
                username: name,
                uid: Some(uid),
                gid: Some(gid),
                home_directory: home,
                ..Default::default()
            });
        }
        Ok(users)
    }

    async fn non_system_groups(&self) -> Result<Vec<Group>> {
        let content = self.fs.read_to_string(Path::new("/etc/group"))?;
        let mut groups = Vec::new();
        for line in content.lines() {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() != 4 {
                continue;
            }
            let Ok(gid) = fields[2].parse::<u32>() else {
                continue;
            };
            if gid < 1000 || EXCLUDED_GROUPS.contains(&fields[0]) {
                continue;
            }
            groups.push(Group {
                name: fields[0].to_string(),
                gid,
                members: fields[3]
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect(),
            });
        }
        Ok(groups)
    }
}
