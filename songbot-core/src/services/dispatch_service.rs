//! The steady-state loop. Consumes inbound events from the bus, maps
//! them to actions, and reports each outcome back to Twitch. Every
//! event runs in its own task; per-event errors never leave this
//! module.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use songbot_common::models::action::{ActionMapping, ActionOutcome};
use songbot_common::models::credential::Platform;
use songbot_common::models::redeem::{RedemptionEvent, RedemptionStatus};

use crate::auth::CredentialManager;
use crate::eventbus::{BotEvent, ChatMessageEvent};
use crate::services::{ChatResponder, MusicAuthorizer, PlayerControl, RedemptionReporter};

const AUTHORIZE_COMMAND: &str = "!sr-spotify";
const QUEUE_COMMAND: &str = "!sr-queue";

pub struct DispatchService {
    mapping: ActionMapping,
    credentials: Arc<CredentialManager>,
    player: Arc<dyn PlayerControl>,
    authorizer: Arc<dyn MusicAuthorizer>,
    reporter: Arc<dyn RedemptionReporter>,
    chat: Arc<dyn ChatResponder>,
}

impl DispatchService {
    pub fn new(
        mapping: ActionMapping,
        credentials: Arc<CredentialManager>,
        player: Arc<dyn PlayerControl>,
        authorizer: Arc<dyn MusicAuthorizer>,
        reporter: Arc<dyn RedemptionReporter>,
        chat: Arc<dyn ChatResponder>,
    ) -> Self {
        Self { mapping, credentials, player, authorizer, reporter, chat }
    }

    /// Drains the bus until shutdown. Events are handled concurrently
    /// with no ordering guarantee between them.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<BotEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("dispatcher started ({} mapped redemption(s))", self.mapping.len());
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else { break };
                    let this = Arc::clone(&self);
                    tokio::spawn(async move {
                        this.handle_event(event).await;
                    });
                }
            }
        }
        info!("dispatcher stopped");
    }

    pub async fn handle_event(&self, event: BotEvent) {
        match event {
            BotEvent::RewardRedeemed(redemption) => self.handle_redemption(redemption).await,
            BotEvent::ChatMessage(message) => self.handle_chat_message(message).await,
        }
    }

    async fn handle_redemption(&self, event: RedemptionEvent) {
        // Refresh up front so the status report later cannot run into an
        // expired token.
        if let Err(e) = self.credentials.get_valid_token(Platform::Twitch).await {
            error!("dropping redemption '{}': {e}", event.reward_title);
            return;
        }

        let Some(kind) = self.mapping.resolve(&event.reward_title) else {
            // Not one of ours; the channel may carry unrelated rewards.
            return;
        };
        debug!("redemption '{}' => {:?}", event.reward_title, kind);

        let result = self.player.execute(kind, event.user_input.clone()).await;
        if let Err(e) = &result {
            warn!("action {:?} for redemption '{}' failed: {e}", kind, event.reward_title);
        }
        let outcome = ActionOutcome::from_result(&result);
        let status = if outcome.success {
            RedemptionStatus::Fulfilled
        } else {
            RedemptionStatus::Canceled
        };

        if let Err(e) = self
            .reporter
            .set_redemption_status(&event.reward_id, &event.redemption_id, status)
            .await
        {
            error!("failed to report redemption '{}' as {:?}: {e}", event.reward_title, status);
        }
    }

    async fn handle_chat_message(&self, message: ChatMessageEvent) {
        let mut parts = message.text.split_whitespace();
        let Some(command) = parts.next() else { return };

        if command.eq_ignore_ascii_case(AUTHORIZE_COMMAND) {
            if !message.is_broadcaster {
                return;
            }
            let Some(code) = parts.next() else {
                self.send_reply(&message.user, "missing authorization code.").await;
                return;
            };
            match self.authorizer.authorize_from_code(code).await {
                Ok(()) => {
                    info!("spotify account connected via chat authorization");
                    self.send_reply(&message.user, "successfully connected.").await;
                }
                Err(e) => {
                    error!("spotify authorization failed: {e}");
                    self.send_reply(&message.user, &format!("Error: {}", e.kind())).await;
                }
            }
        } else if command.eq_ignore_ascii_case(QUEUE_COMMAND) {
            match self.player.upcoming_tracks().await {
                Ok(tracks) if tracks.is_empty() => {
                    self.send_reply(&message.user, "the queue is empty.").await;
                }
                Ok(tracks) => {
                    self.send_reply(&message.user, &format!("up next: {}", tracks.join(" | "))).await;
                }
                Err(e) => {
                    warn!("queue lookup failed: {e}");
                    self.send_reply(&message.user, &format!("Error: {}", e.kind())).await;
                }
            }
        }
    }

    async fn send_reply(&self, user: &str, text: &str) {
        if let Err(e) = self.chat.reply(user, text).await {
            error!("failed to send chat reply: {e}");
        }
    }
}
