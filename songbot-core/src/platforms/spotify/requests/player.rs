//! Spotify player endpoints: queue, next, previous, play, pause,
//! currently-playing and seek.

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::Error;
use crate::platforms::spotify::client::SpotifyClient;

const PLAYER_BASE: &str = "https://api.spotify.com/v1/me/player";

/// How many queued tracks a preview reports.
const QUEUE_PREVIEW_LEN: usize = 5;

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    progress_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct QueueResponse {
    queue: Option<Vec<QueueEntry>>,
}

#[derive(Debug, Deserialize)]
struct QueueEntry {
    name: String,
    #[serde(default)]
    artists: Vec<QueueArtist>,
}

#[derive(Debug, Deserialize)]
struct QueueArtist {
    name: String,
}

/// Seeking below zero is invalid; clamp at track start.
pub(crate) fn seek_target(progress_ms: i64, offset_ms: i64) -> i64 {
    (progress_ms + offset_ms).max(0)
}

fn queue_preview(queue: Vec<QueueEntry>) -> Vec<String> {
    queue
        .into_iter()
        .take(QUEUE_PREVIEW_LEN)
        .map(|entry| {
            let artists = entry
                .artists
                .iter()
                .map(|artist| artist.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} - {}", entry.name, artists)
        })
        .collect()
}

impl SpotifyClient {
    /// Adds a track to the playback queue.
    pub async fn add_to_queue(&self, track_uri: &str) -> Result<(), Error> {
        let url = format!("{PLAYER_BASE}/queue?uri={}", urlencoding::encode(track_uri));
        self.send_player_command(Method::POST, &url).await
    }

    /// Skips to the next track.
    pub async fn skip_to_next(&self) -> Result<(), Error> {
        self.send_player_command(Method::POST, &format!("{PLAYER_BASE}/next")).await
    }

    /// Skips back to the previously played track.
    pub async fn skip_to_previous(&self) -> Result<(), Error> {
        self.send_player_command(Method::POST, &format!("{PLAYER_BASE}/previous")).await
    }

    pub async fn start_playback(&self) -> Result<(), Error> {
        self.send_player_command(Method::PUT, &format!("{PLAYER_BASE}/play")).await
    }

    pub async fn pause_playback(&self) -> Result<(), Error> {
        self.send_player_command(Method::PUT, &format!("{PLAYER_BASE}/pause")).await
    }

    /// Moves playback by `offset_ms` relative to the current position.
    /// Read-modify-write against the live player; the remote service is
    /// the source of truth for the position in between.
    pub async fn offset_playback_progress(&self, offset_ms: i64) -> Result<(), Error> {
        let progress = self.playback_progress_ms().await?;
        let target = seek_target(progress, offset_ms);
        debug!("offset_playback_progress => progress={} offset={} target={}", progress, offset_ms, target);
        self.seek_to_position(target).await
    }

    /// The current playback position in milliseconds.
    pub async fn playback_progress_ms(&self) -> Result<i64, Error> {
        let url = format!("{PLAYER_BASE}/currently-playing");
        let token = self.bearer_token().await?;
        let resp = self.http_client().get(&url).bearer_auth(&token).send().await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("currently-playing => status={} body={}", status, body);
            return Err(Error::Remote { status: status.as_u16(), body });
        }
        // 204 with an empty body means nothing is playing
        if body.is_empty() {
            return Err(Error::MalformedResponse("no playback state returned".into()));
        }

        let parsed: CurrentlyPlaying = serde_json::from_str(&body)?;
        parsed
            .progress_ms
            .ok_or_else(|| Error::MalformedResponse("progress_ms missing from playback state".into()))
    }

    pub async fn seek_to_position(&self, position_ms: i64) -> Result<(), Error> {
        let url = format!("{PLAYER_BASE}/seek?position_ms={position_ms}");
        self.send_player_command(Method::PUT, &url).await
    }

    /// The next few queued tracks as "name - artist, artist" strings.
    pub async fn upcoming_tracks(&self) -> Result<Vec<String>, Error> {
        let url = format!("{PLAYER_BASE}/queue");
        let token = self.bearer_token().await?;
        let resp = self.http_client().get(&url).bearer_auth(&token).send().await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("get queue => status={} body={}", status, body);
            return Err(Error::Remote { status: status.as_u16(), body });
        }
        if body.is_empty() {
            return Err(Error::MalformedResponse("no queue returned".into()));
        }

        let parsed: QueueResponse = serde_json::from_str(&body)?;
        Ok(queue_preview(parsed.queue.unwrap_or_default()))
    }

    /// Player commands carry no response body on success.
    async fn send_player_command(&self, method: Method, url: &str) -> Result<(), Error> {
        debug!("player command => {} '{}'", method, url);
        let token = self.bearer_token().await?;
        let resp = self
            .http_client()
            .request(method, url)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("player command => status={} body={}", status, body);
            return Err(Error::Remote { status: status.as_u16(), body });
        }
        Ok(())
    }
}
