// File: songbot-core/src/platforms/twitch/client.rs

use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;

use songbot_common::models::credential::Platform;
use songbot_common::models::redeem::RedemptionStatus;

use crate::Error;
use crate::auth::CredentialManager;
use crate::platforms::twitch::requests::channel_points::{CustomReward, CustomRewardBody};
use crate::services::{ChatResponder, RedemptionReporter};
use crate::tasks::reward_sync::RewardsApi;

/// A small wrapper client for calling the Helix endpoints this system
/// needs. Every request pulls a guaranteed-valid bearer token from the
/// credential manager; the broadcaster id is resolved once at startup.
pub struct TwitchHelixClient {
    http: reqwest::Client,
    client_id: String,
    credentials: Arc<CredentialManager>,
    broadcaster_id: OnceLock<String>,
}

impl TwitchHelixClient {
    pub fn new(
        http: reqwest::Client,
        client_id: impl Into<String>,
        credentials: Arc<CredentialManager>,
    ) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            credentials,
            broadcaster_id: OnceLock::new(),
        }
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// The app's client id, sent as `Client-Id` on every Helix request.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn broadcaster_id(&self) -> Result<&str, Error> {
        self.broadcaster_id
            .get()
            .map(String::as_str)
            .ok_or_else(|| Error::Config("broadcaster id not resolved yet".into()))
    }

    pub(crate) fn cache_broadcaster_id(&self, id: String) {
        let _ = self.broadcaster_id.set(id);
    }

    pub(crate) async fn bearer_token(&self) -> Result<String, Error> {
        self.credentials.get_valid_token(Platform::Twitch).await
    }
}

#[async_trait]
impl RedemptionReporter for TwitchHelixClient {
    async fn set_redemption_status(
        &self,
        reward_id: &str,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<(), Error> {
        let broadcaster_id = self.broadcaster_id()?.to_string();
        self.update_redemption_status(&broadcaster_id, reward_id, redemption_id, status)
            .await
    }
}

#[async_trait]
impl ChatResponder for TwitchHelixClient {
    async fn reply(&self, user: &str, text: &str) -> Result<(), Error> {
        self.send_chat_message(&format!("@{user}, {text}")).await
    }
}

#[async_trait]
impl RewardsApi for TwitchHelixClient {
    async fn list_custom_rewards(&self) -> Result<Vec<CustomReward>, Error> {
        let broadcaster_id = self.broadcaster_id()?.to_string();
        self.get_custom_rewards(&broadcaster_id, true).await
    }

    async fn create_custom_reward(&self, body: CustomRewardBody) -> Result<CustomReward, Error> {
        let broadcaster_id = self.broadcaster_id()?.to_string();
        TwitchHelixClient::create_custom_reward(self, &broadcaster_id, &body).await
    }
}
