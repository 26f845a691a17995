// file: src/manager/user.rs
// version: 1.0.0
// guid: 4c7f2a91-8e35-4d60-a2b9-f17c84d05e32

//! User account intents

use crate::model::User;
use crate::service::UserService;
use crate::Result;
use std::sync::Arc;
use tracing::info;

pub struct UserManager {
    service: Arc<UserService>,
}

impl UserManager {
    pub fn new(service: Arc<UserService>) -> Self {
        Self { service }
    }

    /// Create (or augment) an administrative account with sudo rights
    /// and the supplied public keys
    pub async fn create_admin(
        &self,
        username: &str,
        sudo_no_password: bool,
        ssh_keys: Vec<String>,
    ) -> Result<()> {
        let user = User::new(username, true, sudo_no_password).with_ssh_keys(ssh_keys);
        self.service.create_user(&user).await?;
        info!("Admin account {} is in place", username);
        Ok(())
    }

    /// Install one public key for an existing account
    pub async fn add_key(&self, username: &str, public_key: &str) -> Result<()> {
        if !self.service.exists(username).await {
            return Err(crate::error::HardnError::NotFound(format!(
                "user {} does not exist",
                username
            )));
        }
        self.service.add_ssh_key(username, public_key).await
    }

    /// Every non-system account, enriched with sudo and last-login data
    pub async fn list(&self) -> Result<Vec<User>> {
        let mut users = Vec::new();
        for user in self.service.non_system_users().await? {
            match self.service.extended_info(&user.username).await {
                Ok(extended) => users.push(extended),
                Err(_) => users.push(user),
            }
        }
        Ok(users)
    }

    pub async fn show(&self, username: &str) -> Result<User> {
        self.service.extended_info(username).await
    }

    /// Every non-system group with its member list
    pub async fn groups(&self) -> Result<Vec<crate::model::Group>> {
        self.service.non_system_groups().await
    }

    pub async fn exists(&self, username: &str) -> bool {
        self.service.exists(username).await
    }
}
