// file: src/model/user.rs
// version: 1.0.0
// guid: e91b5c37-2d80-4a6f-b3e9-7c04d8f1a265

//! User and group account entities

use serde::{Deserialize, Serialize};

/// A Linux user account as managed by the tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Login name
    pub username: String,
    /// Member of the administrative group or present in sudoers
    pub has_sudo: bool,
    /// Sudo without password prompt (NOPASSWD drop-in)
    pub sudo_no_password: bool,
    /// Public keys destined for authorized_keys, in order
    pub ssh_keys: Vec<String>,
    /// Numeric user id, when known
    pub uid: Option<u32>,
    /// Numeric primary group id, when known
    pub gid: Option<u32>,
    /// Home directory path
    pub home_directory: String,
    /// Last interactive login, free-form as reported by lastlog/last
    pub last_login: Option<String>,
    /// Source address of the last login, when reported
    pub last_login_ip: Option<String>,
}

impl User {
    /// Create a user request with the fields the create operation needs
    pub fn new(username: impl Into<String>, has_sudo: bool, sudo_no_password: bool) -> Self {
        Self {
            username: username.into(),
            has_sudo,
            sudo_no_password,
            ..Default::default()
        }
    }

    /// Attach SSH public keys to the request
    pub fn with_ssh_keys(mut self, keys: Vec<String>) -> Self {
        self.ssh_keys = keys;
        self
    }

    /// Validate the fields required to create or look up the account
    pub fn validate(&self) -> crate::Result<()> {
        if self.username.trim().is_empty() {
            return Err(crate::error::HardnError::validation(
                "username cannot be empty",
            ));
        }
        if let Some(uid) = self.uid {
            if uid < 1000 {
                return Err(crate::error::HardnError::validation(format!(
                    "uid {} belongs to a system account",
                    uid
                )));
            }
        }
        Ok(())
    }
}

/// A group entry from /etc/group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub gid: u32,
    pub members: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_username() {
        let user = User::new("", true, false);
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_system_uid() {
        let mut user = User::new("daemon", false, false);
        user.uid = Some(2);
        assert!(user.validate().is_err());

        user.uid = Some(1000);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_builder_keeps_key_order() {
        let user = User::new("ops", true, true).with_ssh_keys(vec![
            "ssh-ed25519 AAA ops@a".to_string(),
            "ssh-rsa BBB ops@b".to_string(),
        ]);
        assert_eq!(user.ssh_keys[0], "ssh-ed25519 AAA ops@a");
        assert_eq!(user.ssh_keys[1], "ssh-rsa BBB ops@b");
    }
}
