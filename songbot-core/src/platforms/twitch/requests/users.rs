//! Helix user lookup, used once at startup to turn the configured
//! channel name into the broadcaster id.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

#[derive(Debug, Deserialize)]
pub struct HelixUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: Vec<HelixUser>,
}

impl TwitchHelixClient {
    /// Resolves the broadcaster's user id from their login name and
    /// caches it on the client for later requests.
    pub async fn resolve_broadcaster(&self, login: &str) -> Result<String, Error> {
        let url = format!(
            "https://api.twitch.tv/helix/users?login={}",
            urlencoding::encode(&login.to_lowercase())
        );

        debug!("get_users => URL='{}'", url);

        let token = self.bearer_token().await?;
        let resp = self
            .http_client()
            .get(&url)
            .header("Client-Id", self.client_id())
            .bearer_auth(&token)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!("get_users => status={} body={}", status, body);
            return Err(Error::Remote { status: status.as_u16(), body });
        }

        let parsed: UserResponse = serde_json::from_str(&body)?;
        let user = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse(format!("no user returned for login '{login}'")))?;

        debug!("get_users => login='{}' => id='{}'", user.login, user.id);
        self.cache_broadcaster_id(user.id.clone());
        Ok(user.id)
    }
}
