// File: songbot-core/src/services/mod.rs

use async_trait::async_trait;

use songbot_common::models::action::ActionKind;
use songbot_common::models::redeem::RedemptionStatus;

use crate::Error;

pub mod dispatch_service;
#[cfg(test)]
mod dispatch_service_tests;
pub mod playback_service;
pub mod track_resolver;

pub use dispatch_service::DispatchService;
pub use playback_service::PlaybackService;
pub use track_resolver::TrackResolver;

/// Playback operations the dispatcher can trigger against the music
/// service. One call per action; seeks fan out into a read and a write
/// inside the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerControl: Send + Sync {
    async fn execute(&self, kind: ActionKind, user_input: Option<String>) -> Result<(), Error>;
    async fn upcoming_tracks(&self) -> Result<Vec<String>, Error>;
}

/// Completes a user-supplied authorization code into a stored credential.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MusicAuthorizer: Send + Sync {
    async fn authorize_from_code(&self, code: &str) -> Result<(), Error>;
}

/// Reports a redemption's terminal state back to the platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionReporter: Send + Sync {
    async fn set_redemption_status(
        &self,
        reward_id: &str,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<(), Error>;
}

/// Sends a chat reply to the invoking user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn reply(&self, user: &str, text: &str) -> Result<(), Error>;
}

/// Remote track search used by the resolver's free-text fallback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackSearch: Send + Sync {
    async fn search_track(&self, query: &str) -> Result<Option<String>, Error>;
}
