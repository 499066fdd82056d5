use std::sync::Arc;

use async_trait::async_trait;

use songbot_common::models::action::{ActionKind, ActionMapping};
use songbot_common::models::credential::{Credential, Platform};
use songbot_common::models::redeem::{RedemptionEvent, RedemptionStatus};
use songbot_common::traits::repository_traits::CredentialsRepository;

use crate::Error;
use crate::auth::TokenRefresher;
use crate::auth::manager::CredentialManager;
use crate::eventbus::{BotEvent, ChatMessageEvent};
use crate::services::dispatch_service::DispatchService;
use crate::services::{
    MockChatResponder, MockMusicAuthorizer, MockPlayerControl, MockRedemptionReporter,
};
use crate::test_utils::{MemoryCredentialsRepository, credential_expiring_in};

struct RejectingRefresher;

#[async_trait]
impl TokenRefresher for RejectingRefresher {
    async fn refresh(&self, _credential: &Credential) -> Result<Credential, Error> {
        Err(Error::RefreshFailed("remote rejected the refresh token".into()))
    }
}

async fn manager_with_twitch(expires_in_secs: i64) -> Arc<CredentialManager> {
    let store = Arc::new(MemoryCredentialsRepository::default());
    store
        .store_credential(&credential_expiring_in(Platform::Twitch, expires_in_secs))
        .await
        .unwrap();
    let manager = Arc::new(CredentialManager::new(
        store as Arc<dyn CredentialsRepository>,
    ));
    manager.register_refresher(Platform::Twitch, Arc::new(RejectingRefresher));
    assert!(manager.load(Platform::Twitch).await.unwrap());
    manager
}

fn add_song_mapping() -> ActionMapping {
    let mut mapping = ActionMapping::new();
    mapping.insert("Add a song", ActionKind::AddSong);
    mapping.insert("Skip the song", ActionKind::SkipSong);
    mapping
}

fn redemption(title: &str, input: Option<&str>) -> RedemptionEvent {
    RedemptionEvent {
        reward_title: title.to_string(),
        user_input: input.map(str::to_string),
        redemption_id: "redemption-1".into(),
        reward_id: "reward-1".into(),
    }
}

fn chat(user: &str, text: &str, is_broadcaster: bool) -> ChatMessageEvent {
    ChatMessageEvent {
        channel: "somestreamer".into(),
        user: user.to_string(),
        text: text.to_string(),
        is_broadcaster,
    }
}

struct Mocks {
    player: MockPlayerControl,
    authorizer: MockMusicAuthorizer,
    reporter: MockRedemptionReporter,
    chat: MockChatResponder,
}

impl Mocks {
    fn new() -> Self {
        Self {
            player: MockPlayerControl::new(),
            authorizer: MockMusicAuthorizer::new(),
            reporter: MockRedemptionReporter::new(),
            chat: MockChatResponder::new(),
        }
    }

    fn into_service(self, mapping: ActionMapping, credentials: Arc<CredentialManager>) -> DispatchService {
        DispatchService::new(
            mapping,
            credentials,
            Arc::new(self.player),
            Arc::new(self.authorizer),
            Arc::new(self.reporter),
            Arc::new(self.chat),
        )
    }
}

#[tokio::test]
async fn unmapped_title_produces_no_call_and_no_report() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks.player.expect_execute().never();
    mocks.reporter.expect_set_redemption_status().never();
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::RewardRedeemed(redemption("Hydrate!", None)))
        .await;
}

#[tokio::test]
async fn successful_add_song_reports_fulfilled() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks
        .player
        .expect_execute()
        .withf(|kind, input| {
            *kind == ActionKind::AddSong && input.as_deref() == Some("never gonna give you up")
        })
        .times(1)
        .returning(|_, _| Ok(()));
    mocks
        .reporter
        .expect_set_redemption_status()
        .withf(|reward_id, redemption_id, status| {
            reward_id == "reward-1"
                && redemption_id == "redemption-1"
                && *status == RedemptionStatus::Fulfilled
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::RewardRedeemed(redemption(
            "Add a song",
            Some("never gonna give you up"),
        )))
        .await;
}

#[tokio::test]
async fn remote_error_reports_canceled() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks
        .player
        .expect_execute()
        .times(1)
        .returning(|_, _| Err(Error::Remote { status: 502, body: "bad gateway".into() }));
    mocks
        .reporter
        .expect_set_redemption_status()
        .withf(|_, _, status| *status == RedemptionStatus::Canceled)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::RewardRedeemed(redemption(
            "Add a song",
            Some("some song"),
        )))
        .await;
}

#[tokio::test]
async fn track_resolution_failure_reports_canceled() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks
        .player
        .expect_execute()
        .times(1)
        .returning(|_, _| Err(Error::NotFound("no tracks found".into())));
    mocks
        .reporter
        .expect_set_redemption_status()
        .withf(|_, _, status| *status == RedemptionStatus::Canceled)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::RewardRedeemed(redemption(
            "Add a song",
            Some("gibberish nobody wrote"),
        )))
        .await;
}

#[tokio::test]
async fn unrefreshable_credential_drops_the_event() {
    // stale token and a refresher that keeps failing
    let credentials = manager_with_twitch(-10).await;
    let mut mocks = Mocks::new();
    mocks.player.expect_execute().never();
    mocks.reporter.expect_set_redemption_status().never();
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::RewardRedeemed(redemption("Add a song", Some("x"))))
        .await;
}

#[tokio::test]
async fn broadcaster_authorization_replies_connected() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks
        .authorizer
        .expect_authorize_from_code()
        .withf(|code| code == "AUTHCODE123")
        .times(1)
        .returning(|_| Ok(()));
    mocks
        .chat
        .expect_reply()
        .withf(|user, text| user == "somestreamer" && text == "successfully connected.")
        .times(1)
        .returning(|_, _| Ok(()));
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::ChatMessage(chat(
            "somestreamer",
            "!sr-spotify AUTHCODE123",
            true,
        )))
        .await;
}

#[tokio::test]
async fn failed_authorization_replies_with_error_category() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks
        .authorizer
        .expect_authorize_from_code()
        .times(1)
        .returning(|_| Err(Error::Remote { status: 400, body: "invalid_grant".into() }));
    mocks
        .chat
        .expect_reply()
        .withf(|_, text| text == "Error: RemoteError")
        .times(1)
        .returning(|_, _| Ok(()));
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::ChatMessage(chat(
            "somestreamer",
            "!sr-spotify BADCODE",
            true,
        )))
        .await;
}

#[tokio::test]
async fn non_broadcaster_cannot_authorize() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks.authorizer.expect_authorize_from_code().never();
    mocks.chat.expect_reply().never();
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::ChatMessage(chat("viewer42", "!sr-spotify CODE", false)))
        .await;
}

#[tokio::test]
async fn queue_command_replies_with_upcoming_tracks() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks
        .player
        .expect_upcoming_tracks()
        .times(1)
        .returning(|| Ok(vec!["One - A".into(), "Two - B".into()]));
    mocks
        .chat
        .expect_reply()
        .withf(|user, text| user == "viewer42" && text == "up next: One - A | Two - B")
        .times(1)
        .returning(|_, _| Ok(()));
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::ChatMessage(chat("viewer42", "!sr-queue", false)))
        .await;
}

#[tokio::test]
async fn unrelated_chatter_is_ignored() {
    let credentials = manager_with_twitch(3600).await;
    let mut mocks = Mocks::new();
    mocks.player.expect_execute().never();
    mocks.player.expect_upcoming_tracks().never();
    mocks.authorizer.expect_authorize_from_code().never();
    mocks.chat.expect_reply().never();
    let service = mocks.into_service(add_song_mapping(), credentials);

    service
        .handle_event(BotEvent::ChatMessage(chat("viewer42", "hello there", false)))
        .await;
}
