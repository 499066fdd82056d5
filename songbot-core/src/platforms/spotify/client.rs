// File: songbot-core/src/platforms/spotify/client.rs

use std::sync::Arc;

use songbot_common::models::credential::Platform;

use crate::Error;
use crate::auth::CredentialManager;
use crate::config::SpotifyConfig;

/// Entry point for the Spotify Web API calls this system needs. The
/// request implementations live in `requests::{player, search, token}`.
pub struct SpotifyClient {
    http: reqwest::Client,
    credentials: Arc<CredentialManager>,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, config: &SpotifyConfig, credentials: Arc<CredentialManager>) -> Self {
        Self {
            http,
            credentials,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub(crate) async fn bearer_token(&self) -> Result<String, Error> {
        self.credentials.get_valid_token(Platform::Spotify).await
    }
}
