//! Startup reconciliation of channel-point rewards.
//!
//! Runs once, before the dispatcher consumes anything. Every configured
//! redemption title must exist as a custom reward on the channel; only
//! missing ones are created. Any failure here aborts startup, because
//! dispatching against a mapping that does not exist remotely would
//! silently drop redemptions.

use async_trait::async_trait;
use tracing::{debug, info};

use songbot_common::models::action::ActionMapping;

use crate::Error;
use crate::platforms::twitch::requests::channel_points::{CustomReward, CustomRewardBody};

/// The slice of Helix the reconciliation needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardsApi: Send + Sync {
    /// Lists the rewards this client id can manage.
    async fn list_custom_rewards(&self) -> Result<Vec<CustomReward>, Error>;
    async fn create_custom_reward(&self, body: CustomRewardBody) -> Result<CustomReward, Error>;
}

pub async fn sync_rewards(api: &dyn RewardsApi, mapping: &ActionMapping) -> Result<(), Error> {
    let existing = api.list_custom_rewards().await?;
    info!("reward sync => {} manageable reward(s) on the channel", existing.len());

    for (title, kind) in mapping.entries() {
        if existing.iter().any(|reward| reward.title == title) {
            debug!("reward '{}' already present", title);
            continue;
        }

        info!("creating missing reward '{}'", title);
        let body = CustomRewardBody {
            title: Some(title.to_string()),
            cost: Some(1),
            is_enabled: Some(false),
            is_user_input_required: Some(kind.requires_user_input()),
        };
        match api.create_custom_reward(body).await {
            Ok(created) => {
                debug!("created reward '{}' => id='{}'", created.title, created.id);
            }
            // Helix rejects a title that already exists under another
            // client id with 400. That reward is not ours to manage and
            // must be removed by the operator.
            Err(Error::Remote { status: 400, body }) => {
                return Err(Error::ConfigConflict(format!(
                    "reward '{title}' exists but was created by a different owner: {body}"
                )));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
