//! Twitch OAuth token refresh (client-secret code flow, no PKCE).

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use songbot_common::models::credential::Credential;

use crate::Error;
use crate::auth::TokenRefresher;

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Matches Twitch's JSON from the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TwitchTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

pub struct TwitchRefresher {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl TwitchRefresher {
    pub fn new(http: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self { http, client_id, client_secret }
    }
}

#[async_trait]
impl TokenRefresher for TwitchRefresher {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, Error> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", credential.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::RefreshFailed(format!("twitch token endpoint: {e}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::RefreshFailed(format!(
                "twitch token endpoint: HTTP {status}: {body}"
            )));
        }

        let parsed: TwitchTokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::RefreshFailed(format!("twitch token response: {e}")))?;

        let now = Utc::now();
        Ok(Credential {
            platform: credential.platform,
            access_token: parsed.access_token,
            refresh_token: parsed
                .refresh_token
                .unwrap_or_else(|| credential.refresh_token.clone()),
            expires_at: now + chrono::Duration::seconds(parsed.expires_in as i64),
        })
    }
}
