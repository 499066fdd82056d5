//! Helix channel points requests:
//!  - getCustomReward
//!  - createCustomReward
//!  - updateRedemptionStatus

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use songbot_common::models::redeem::RedemptionStatus;

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

/// The slice of a Helix custom reward this system cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomReward {
    pub id: String,
    pub title: String,
    pub cost: u64,
    pub is_enabled: bool,
    pub is_user_input_required: bool,
}

#[derive(Debug, Deserialize)]
struct CustomRewardResponse {
    data: Vec<CustomReward>,
}

/// Request body for creating a custom reward. For "create", `title` and
/// `cost` are required.
#[derive(Debug, Default, Serialize)]
pub struct CustomRewardBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_user_input_required: Option<bool>,
}

#[derive(Debug, Serialize)]
struct UpdateRedemptionStatusBody {
    status: String,
}

impl TwitchHelixClient {
    /// Gets the broadcaster's custom rewards. With `only_manageable`,
    /// Helix returns only the rewards this client id created.
    /// Required scope: `channel:read:redemptions` or `channel:manage:redemptions`.
    pub async fn get_custom_rewards(
        &self,
        broadcaster_id: &str,
        only_manageable: bool,
    ) -> Result<Vec<CustomReward>, Error> {
        let mut url = format!(
            "https://api.twitch.tv/helix/channel_points/custom_rewards?broadcaster_id={}",
            broadcaster_id
        );
        if only_manageable {
            url.push_str("&only_manageable_rewards=true");
        }

        debug!("get_custom_rewards => URL='{}'", url);

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
        trace!("get_custom_rewards => HTTP {} => body length={}", status, body.len());

        if !status.is_success() {
            warn!("get_custom_rewards => status={} body={}", status, body);
            return Err(Error::Remote { status: status.as_u16(), body });
        }

        let parsed: CustomRewardResponse = serde_json::from_str(&body)?;
        debug!(
            "get_custom_rewards => returned {} rewards for broadcaster_id='{}'",
            parsed.data.len(),
            broadcaster_id
        );
        Ok(parsed.data)
    }

    /// Creates a custom reward in the broadcaster's channel.
    /// Required scope: `channel:manage:redemptions`.
    pub async fn create_custom_reward(
        &self,
        broadcaster_id: &str,
        params: &CustomRewardBody,
    ) -> Result<CustomReward, Error> {
        let url = format!(
            "https://api.twitch.tv/helix/channel_points/custom_rewards?broadcaster_id={}",
            broadcaster_id
        );

        debug!("create_custom_reward => URL='{}' body={:?}", url, params);

        let token = self.bearer_token().await?;
        let resp = self
            .http_client()
            .post(&url)
            .header("Client-Id", self.client_id())
            .bearer_auth(&token)
            .json(params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        trace!("create_custom_reward => HTTP {} => body={}", status, body);

        if !status.is_success() {
            warn!("create_custom_reward => status={} body={}", status, body);
            return Err(Error::Remote { status: status.as_u16(), body });
        }

        let parsed: CustomRewardResponse = serde_json::from_str(&body)?;
        match parsed.data.into_iter().next() {
            Some(first) => {
                debug!(
                    "create_custom_reward => success => returned ID='{}' title='{}'",
                    first.id, first.title
                );
                Ok(first)
            }
            None => Err(Error::MalformedResponse(
                "no reward returned by create_custom_reward".into(),
            )),
        }
    }

    /// Moves one redemption to FULFILLED or CANCELED.
    /// Required scope: `channel:manage:redemptions`.
    pub async fn update_redemption_status(
        &self,
        broadcaster_id: &str,
        reward_id: &str,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<(), Error> {
        let url = format!(
            "https://api.twitch.tv/helix/channel_points/custom_rewards/redemptions\
             ?broadcaster_id={}&reward_id={}&id={}",
            broadcaster_id, reward_id, redemption_id
        );

        debug!(
            "update_redemption_status => URL='{}' new_status='{}'",
            url,
            status.as_helix_str()
        );

        let body = UpdateRedemptionStatusBody {
            status: status.as_helix_str().to_string(),
        };

        let token = self.bearer_token().await?;
        let resp = self
            .http_client()
            .patch(&url)
            .header("Client-Id", self.client_id())
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let http_status = resp.status();
        if !http_status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("update_redemption_status => status={} body={}", http_status, body);
            return Err(Error::Remote { status: http_status.as_u16(), body });
        }

        debug!("update_redemption_status => redemption '{}' => {}", redemption_id, status.as_helix_str());
        Ok(())
    }
}
