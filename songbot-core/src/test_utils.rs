//! Shared test doubles and builders.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use songbot_common::models::credential::{Credential, Platform};
use songbot_common::traits::repository_traits::CredentialsRepository;

use crate::Error;

/// In-memory credential store that records every write, so tests can
/// assert on persistence ordering and contents.
#[derive(Default)]
pub struct MemoryCredentialsRepository {
    saved: Mutex<Vec<Credential>>,
}

impl MemoryCredentialsRepository {
    pub async fn saved(&self) -> Vec<Credential> {
        self.saved.lock().await.clone()
    }
}

#[async_trait]
impl CredentialsRepository for MemoryCredentialsRepository {
    async fn get_credential(&self, platform: Platform) -> Result<Option<Credential>, Error> {
        Ok(self
            .saved
            .lock()
            .await
            .iter()
            .rev()
            .find(|c| c.platform == platform)
            .cloned())
    }

    async fn store_credential(&self, credential: &Credential) -> Result<(), Error> {
        self.saved.lock().await.push(credential.clone());
        Ok(())
    }
}

/// A credential for `platform` expiring `secs` seconds from now.
pub fn credential_expiring_in(platform: Platform, secs: i64) -> Credential {
    Credential {
        platform,
        access_token: "old-token".into(),
        refresh_token: "old-refresh".into(),
        expires_at: Utc::now() + Duration::seconds(secs),
    }
}
