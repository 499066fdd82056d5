//! Executes the closed action set against Spotify. Stateless; every
//! call pulls its own valid token through the client.

use std::sync::Arc;

use async_trait::async_trait;

use songbot_common::models::action::ActionKind;

use crate::Error;
use crate::platforms::spotify::SpotifyClient;
use crate::services::{PlayerControl, TrackResolver, TrackSearch};

pub struct PlaybackService {
    spotify: Arc<SpotifyClient>,
    resolver: TrackResolver,
}

impl PlaybackService {
    pub fn new(spotify: Arc<SpotifyClient>) -> Self {
        let search: Arc<dyn TrackSearch> = Arc::clone(&spotify);
        Self {
            resolver: TrackResolver::new(search),
            spotify,
        }
    }
}

#[async_trait]
impl PlayerControl for PlaybackService {
    async fn execute(&self, kind: ActionKind, user_input: Option<String>) -> Result<(), Error> {
        match kind {
            ActionKind::AddSong => {
                let query = user_input
                    .ok_or_else(|| Error::NotFound("redemption carried no song request".into()))?;
                let track = self.resolver.resolve(&query).await?;
                self.spotify.add_to_queue(&track.uri).await
            }
            ActionKind::SkipSong => self.spotify.skip_to_next().await,
            ActionKind::PlayPrevious => self.spotify.skip_to_previous().await,
            ActionKind::StartPlayback => self.spotify.start_playback().await,
            ActionKind::PausePlayback => self.spotify.pause_playback().await,
            ActionKind::SeekForward(ms) => self.spotify.offset_playback_progress(ms).await,
            ActionKind::SeekBackward(ms) => self.spotify.offset_playback_progress(-ms).await,
        }
    }

    async fn upcoming_tracks(&self) -> Result<Vec<String>, Error> {
        self.spotify.upcoming_tracks().await
    }
}
