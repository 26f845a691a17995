// file: src/model/ssh.rs
// version: 1.0.0
// guid: 5b8d2f41-c6a3-4790-a1b8-3e67d90c24f5

//! Secure-shell daemon policy

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Desired sshd policy, rendered into a config fragment by the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConfig {
    /// Daemon listen port
    pub port: u16,
    /// Addresses the daemon binds to
    pub listen_addresses: Vec<String>,
    /// Whether root may log in over SSH
    pub permit_root_login: bool,
    /// AllowUsers entries; empty means the directive is omitted
    pub allowed_users: Vec<String>,
    /// AuthorizedKeysFile paths; empty falls back to `.ssh/authorized_keys`
    pub key_paths: Vec<String>,
    /// AuthenticationMethods values; empty falls back to `publickey`
    pub auth_methods: Vec<String>,
    /// Where the rendered fragment lives on this host
    pub config_file_path: PathBuf,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            port: 22,
            listen_addresses: vec!["0.0.0.0".to_string()],
            permit_root_login: false,
            allowed_users: Vec::new(),
            key_paths: Vec::new(),
            auth_methods: Vec::new(),
            config_file_path: PathBuf::new(),
        }
    }
}

impl SshConfig {
    /// Effective AuthenticationMethods value for rendering
    pub fn effective_auth_methods(&self) -> String {
        if self.auth_methods.is_empty() {
            "publickey".to_string()
        } else {
            self.auth_methods.join(",")
        }
    }

    /// Effective AuthorizedKeysFile paths for rendering
    pub fn effective_key_paths(&self) -> Vec<String> {
        if self.key_paths.is_empty() {
            vec![".ssh/authorized_keys".to_string()]
        } else {
            self.key_paths.clone()
        }
    }

    /// Password authentication is implicitly off under a publickey-only policy
    pub fn password_auth_enabled(&self) -> bool {
        !self.auth_methods.is_empty()
            && self.auth_methods.iter().any(|m| m != "publickey")
    }

    /// Validate the policy before it is rendered
    pub fn validate(&self) -> crate::Result<()> {
        if self.port == 0 {
            return Err(crate::error::HardnError::validation(
                "ssh port must be between 1 and 65535",
            ));
        }
        for user in &self.allowed_users {
            if user.trim().is_empty() {
                return Err(crate::error::HardnError::validation(
                    "AllowUsers entries cannot be empty",
                ));
            }
        }
        Ok(())
    }
}

/// Syntax check for an OpenSSH public key line: a known key type
/// followed by a base64 blob, with an optional comment.
pub fn validate_public_key(key: &str) -> crate::Result<()> {
    use base64::Engine;

    let mut parts = key.split_whitespace();
    let key_type = parts.next().unwrap_or("");
    let blob = parts.next().unwrap_or("");

    let known_type = key_type.starts_with("ssh-")
        || key_type.starts_with("ecdsa-")
        || key_type.starts_with("sk-");
    if !known_type {
        return Err(crate::error::HardnError::Validation(format!(
            "unrecognized public key type: {:?}",
            key_type
        )));
    }
    if blob.is_empty()
        || base64::engine::general_purpose::STANDARD
            .decode(blob)
            .is_err()
    {
        return Err(crate::error::HardnError::validation(
            "public key payload is not valid base64",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SshConfig::default();
        assert_eq!(cfg.port, 22);
        assert!(!cfg.permit_root_login);
        assert_eq!(cfg.effective_auth_methods(), "publickey");
        assert_eq!(cfg.effective_key_paths(), vec![".ssh/authorized_keys"]);
    }

    #[test]
    fn test_publickey_only_disables_password_auth() {
        let mut cfg = SshConfig::default();
        assert!(!cfg.password_auth_enabled());

        cfg.auth_methods = vec!["publickey".to_string()];
        assert!(!cfg.password_auth_enabled());

        cfg.auth_methods = vec!["publickey".to_string(), "password".to_string()];
        assert!(cfg.password_auth_enabled());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let cfg = SshConfig {
            port: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_allow_user() {
        let cfg = SshConfig {
            allowed_users: vec!["ops".to_string(), " ".to_string()],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_public_key_syntax() {
        assert!(validate_public_key("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIedb ops@host").is_ok());
        assert!(validate_public_key(
            "ecdsa-sha2-nistp256 AAAAE2VjZHNhLXNoYTItbmlzdHAyNTY="
        )
        .is_ok());

        assert!(validate_public_key("").is_err());
        assert!(validate_public_key("rsa AAAA").is_err());
        assert!(validate_public_key("ssh-ed25519").is_err());
        assert!(validate_public_key("ssh-ed25519 not*base64!").is_err());
    }
}
