//! The operator's JSON config document. The same file doubles as the
//! credential store (see `repositories::file_store`); this module reads
//! only the static parts and leaves the token fields alone.

use std::path::Path;

use serde::Deserialize;

use songbot_common::models::action::{ActionKind, ActionMapping};

use crate::Error;

fn default_seek_step_ms() -> i64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub twitch: TwitchConfig,
    pub spotify: SpotifyConfig,
    /// How far the seek redemptions move playback, in milliseconds.
    #[serde(default = "default_seek_step_ms")]
    pub seek_step_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitchConfig {
    pub client_id: String,
    pub client_secret: String,
    pub channel: String,
    pub redemption: RedemptionNames,
}

/// Reward titles, one per action. Empty means the action is disabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionNames {
    #[serde(default)]
    pub add_song: String,
    #[serde(default)]
    pub skip_song: String,
    #[serde(default)]
    pub play_last_song: String,
    #[serde(default)]
    pub start_playback: String,
    #[serde(default)]
    pub pause_playback: String,
    #[serde(default)]
    pub skip_ten_seconds: String,
    #[serde(default)]
    pub play_last_ten_seconds: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(rename = "redirectURI")]
    pub redirect_uri: String,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Builds the immutable title → action map from the configured
    /// redemption names.
    pub fn action_mapping(&self) -> ActionMapping {
        let names = &self.twitch.redemption;
        let mut mapping = ActionMapping::new();
        mapping.insert(&names.add_song, ActionKind::AddSong);
        mapping.insert(&names.skip_song, ActionKind::SkipSong);
        mapping.insert(&names.play_last_song, ActionKind::PlayPrevious);
        mapping.insert(&names.start_playback, ActionKind::StartPlayback);
        mapping.insert(&names.pause_playback, ActionKind::PausePlayback);
        mapping.insert(&names.skip_ten_seconds, ActionKind::SeekForward(self.seek_step_ms));
        mapping.insert(&names.play_last_ten_seconds, ActionKind::SeekBackward(self.seek_step_ms));
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "twitch": {
            "clientId": "tw-id",
            "clientSecret": "tw-secret",
            "channel": "somestreamer",
            "token": "seeded",
            "refreshToken": "seeded-refresh",
            "expiresAt": 0,
            "redemption": {
                "addSong": "Add a song",
                "skipSong": "Skip the song",
                "playLastSong": "",
                "startPlayback": "",
                "pausePlayback": "",
                "skipTenSeconds": "Skip 10 seconds",
                "playLastTenSeconds": ""
            }
        },
        "spotify": {
            "clientId": "sp-id",
            "clientSecret": "sp-secret",
            "redirectURI": "http://localhost:8888/callback",
            "token": "",
            "refreshToken": "",
            "expiresAt": 0
        }
    }"#;

    #[test]
    fn parses_document_and_ignores_token_fields() {
        let config: AppConfig = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(config.twitch.channel, "somestreamer");
        assert_eq!(config.spotify.redirect_uri, "http://localhost:8888/callback");
        assert_eq!(config.seek_step_ms, 10_000);
    }

    #[test]
    fn mapping_skips_disabled_actions() {
        let config: AppConfig = serde_json::from_str(SAMPLE).unwrap();
        let mapping = config.action_mapping();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.resolve("Add a song"), Some(ActionKind::AddSong));
        assert_eq!(mapping.resolve("Skip the song"), Some(ActionKind::SkipSong));
        assert_eq!(mapping.resolve("Skip 10 seconds"), Some(ActionKind::SeekForward(10_000)));
        assert_eq!(mapping.resolve(""), None);
    }

    #[test]
    fn seek_step_is_configurable() {
        let doc = SAMPLE.trim_end().trim_end_matches('}');
        let doc = format!("{doc}, \"seekStepMs\": 5000}}");
        let config: AppConfig = serde_json::from_str(&doc).unwrap();
        let mapping = config.action_mapping();
        assert_eq!(mapping.resolve("Skip 10 seconds"), Some(ActionKind::SeekForward(5000)));
    }
}
