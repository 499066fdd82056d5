use async_trait::async_trait;

use crate::error::Error;
use crate::models::credential::{Credential, Platform};

/// Key-value credential persistence. Writes must be durable before the
/// call returns; the credential manager relies on that ordering.
#[async_trait]
pub trait CredentialsRepository: Send + Sync {
    async fn get_credential(&self, platform: Platform) -> Result<Option<Credential>, Error>;
    async fn store_credential(&self, credential: &Credential) -> Result<(), Error>;
}
