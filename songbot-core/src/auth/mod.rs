// songbot-core/src/auth/mod.rs

use async_trait::async_trait;

use songbot_common::models::credential::Credential;

use crate::Error;

pub mod manager;

pub use manager::CredentialManager;

/// Exchanges a credential's refresh token for a new triple. One
/// implementation per platform; the manager decides when to call it.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, Error>;
}
