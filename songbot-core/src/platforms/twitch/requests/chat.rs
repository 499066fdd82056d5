//! Helix send-chat-message, used for command replies.

use serde::Serialize;
use tracing::{debug, warn};

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

#[derive(Debug, Serialize)]
struct SendChatMessageBody<'a> {
    broadcaster_id: &'a str,
    sender_id: &'a str,
    message: &'a str,
}

impl TwitchHelixClient {
    /// Sends a message to the broadcaster's chat.
    /// Required scope: `user:write:chat`.
    pub async fn send_chat_message(&self, message: &str) -> Result<(), Error> {
        let broadcaster_id = self.broadcaster_id()?;
        let url = "https://api.twitch.tv/helix/chat/messages";

        debug!("send_chat_message => broadcaster_id='{}' len={}", broadcaster_id, message.len());

        let body = SendChatMessageBody {
            broadcaster_id,
            // single-account setup: the broadcaster's token sends its own replies
            sender_id: broadcaster_id,
            message,
        };

        let token = self.bearer_token().await?;
        let resp = self
            .http_client()
            .post(url)
            .header("Client-Id", self.client_id())
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("send_chat_message => status={} body={}", status, body);
            return Err(Error::Remote { status: status.as_u16(), body });
        }

        Ok(())
    }
}
