//! Spotify account-service token grants. Both grants authenticate with
//! HTTP Basic (client id and secret) and form-encoded parameters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use songbot_common::models::credential::{Credential, Platform};

use crate::Error;
use crate::auth::TokenRefresher;
use crate::platforms::spotify::client::SpotifyClient;
use crate::services::MusicAuthorizer;

pub const ACCOUNTS_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

#[derive(Debug, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    /// Absent on the refresh grant; the previous token stays valid.
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

async fn token_request(
    http: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    params: &[(&str, &str)],
) -> Result<SpotifyTokenResponse, Error> {
    let resp = http
        .post(ACCOUNTS_TOKEN_URL)
        .basic_auth(client_id, Some(client_secret))
        .form(params)
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(Error::Remote { status: status.as_u16(), body });
    }

    Ok(serde_json::from_str(&body)?)
}

fn credential_from_refresh(
    previous: &Credential,
    parsed: SpotifyTokenResponse,
    now: DateTime<Utc>,
) -> Credential {
    Credential {
        platform: previous.platform,
        access_token: parsed.access_token,
        refresh_token: parsed
            .refresh_token
            .unwrap_or_else(|| previous.refresh_token.clone()),
        expires_at: now + chrono::Duration::seconds(parsed.expires_in as i64),
    }
}

impl SpotifyClient {
    /// Completes the authorization-code grant started in the user's
    /// browser, yielding the first credential triple for this account.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, Error> {
        let params = [
            ("code", code),
            ("redirect_uri", self.redirect_uri()),
            ("grant_type", "authorization_code"),
        ];
        let parsed = token_request(self.http_client(), self.client_id(), self.client_secret(), &params).await?;
        let refresh_token = parsed.refresh_token.ok_or_else(|| {
            Error::MalformedResponse("refresh_token missing from authorization response".into())
        })?;
        debug!("spotify authorization code exchanged");
        Ok(Credential {
            platform: Platform::Spotify,
            access_token: parsed.access_token,
            refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(parsed.expires_in as i64),
        })
    }
}

#[async_trait]
impl MusicAuthorizer for SpotifyClient {
    async fn authorize_from_code(&self, code: &str) -> Result<(), Error> {
        let credential = self.exchange_code(code).await?;
        self.credentials().install(credential).await
    }
}

/// Refreshes the Spotify user token with the refresh-token grant.
pub struct SpotifyRefresher {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl SpotifyRefresher {
    pub fn new(http: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self { http, client_id, client_secret }
    }
}

#[async_trait]
impl TokenRefresher for SpotifyRefresher {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, Error> {
        let params = [
            ("refresh_token", credential.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let parsed = token_request(&self.http, &self.client_id, &self.client_secret, &params)
            .await
            .map_err(|e| Error::RefreshFailed(format!("spotify token endpoint: {e}")))?;
        Ok(credential_from_refresh(credential, parsed, Utc::now()))
    }
}
