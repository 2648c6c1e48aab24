pub mod http_client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{ReactionResponse, ReactionType};

pub use http_client::HttpApiClient;

/// Submits a viewer's reaction and returns the server's view of the item.
///
/// Any non-2xx response or transport failure is an error.
#[async_trait]
pub trait ReactionApi {
    async fn submit_reaction(
        &self,
        item_id: i64,
        reaction: ReactionType,
    ) -> Result<ReactionResponse>;
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: crate::domain::Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// Catch a mismatched confirmation before asking the server.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.new_password.is_empty() {
            return Err("New password must not be empty".into());
        }
        if self.new_password != self.confirm_password {
            return Err("New passwords do not match".into());
        }
        Ok(())
    }
}
