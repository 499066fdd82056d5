//! Credential persistence inside the operator's JSON document.
//!
//! Tokens live next to the static configuration under per-platform keys
//! (`twitch.token`, `twitch.refreshToken`, `twitch.expiresAt`, same for
//! `spotify`), with expiry as epoch milliseconds. The whole document is
//! held in memory and rewritten on every store; the file is synced
//! before the call returns.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use songbot_common::models::credential::{Credential, Platform};
use songbot_common::traits::repository_traits::CredentialsRepository;

use crate::Error;

pub struct FileCredentialsRepository {
    path: PathBuf,
    doc: Mutex<Value>,
}

impl FileCredentialsRepository {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let data = tokio::fs::read_to_string(&path).await?;
        let doc: Value = serde_json::from_str(&data)?;
        if !doc.is_object() {
            return Err(Error::Config(format!(
                "credential document {} is not a JSON object",
                path.display()
            )));
        }
        Ok(Self { path, doc: Mutex::new(doc) })
    }
}

fn credential_from_doc(doc: &Value, platform: Platform) -> Result<Option<Credential>, Error> {
    let Some(section) = doc.get(platform.to_string()) else {
        return Ok(None);
    };
    let token = section.get("token").and_then(Value::as_str).unwrap_or_default();
    let refresh_token = section.get("refreshToken").and_then(Value::as_str).unwrap_or_default();
    if token.is_empty() || refresh_token.is_empty() {
        return Ok(None);
    }
    let expires_ms = section.get("expiresAt").and_then(Value::as_i64).unwrap_or(0);
    let expires_at = DateTime::from_timestamp_millis(expires_ms)
        .ok_or_else(|| Error::Config(format!("invalid expiresAt for {platform}")))?;
    Ok(Some(Credential {
        platform,
        access_token: token.to_string(),
        refresh_token: refresh_token.to_string(),
        expires_at,
    }))
}

#[async_trait]
impl CredentialsRepository for FileCredentialsRepository {
    async fn get_credential(&self, platform: Platform) -> Result<Option<Credential>, Error> {
        let doc = self.doc.lock().await;
        credential_from_doc(&doc, platform)
    }

    async fn store_credential(&self, credential: &Credential) -> Result<(), Error> {
        let mut doc = self.doc.lock().await;
        let root = doc
            .as_object_mut()
            .ok_or_else(|| Error::Config("credential document is not a JSON object".into()))?;
        let section = root
            .entry(credential.platform.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let section = section
            .as_object_mut()
            .ok_or_else(|| Error::Config(format!("{} section is not a JSON object", credential.platform)))?;
        section.insert("token".into(), Value::from(credential.access_token.clone()));
        section.insert("refreshToken".into(), Value::from(credential.refresh_token.clone()));
        section.insert("expiresAt".into(), Value::from(credential.expires_at.timestamp_millis()));

        let data = serde_json::to_vec_pretty(&*doc)?;
        let mut file = tokio::fs::File::create(&self.path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        debug!("persisted {} credential to {}", credential.platform, self.path.display());
        Ok(())
    }
}
