//! Spotify track search, the resolver's free-text fallback.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::Error;
use crate::platforms::spotify::client::SpotifyClient;
use crate::services::TrackSearch;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Tracks,
}

#[derive(Debug, Deserialize)]
struct Tracks {
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
}

#[async_trait]
impl TrackSearch for SpotifyClient {
    /// Returns the best match's track id, or None when nothing matched.
    async fn search_track(&self, query: &str) -> Result<Option<String>, Error> {
        let url = format!(
            "https://api.spotify.com/v1/search?q={}&type=track",
            urlencoding::encode(query)
        );

        debug!("search_track => URL='{}'", url);

        let token = self.bearer_token().await?;
        let resp = self.http_client().get(&url).bearer_auth(&token).send().await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("search_track => status={} body={}", status, body);
            return Err(Error::Remote { status: status.as_u16(), body });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.tracks.items.into_iter().next().map(|item| item.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_parses_first_item() {
        let body = r#"{"tracks":{"items":[
            {"id":"4uLU6hMCjMI75M1A2tKUQC","name":"Song A"},
            {"id":"7ouMYWpwJ422jRcDASZB7P","name":"Song B"}
        ]}}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.tracks.items[0].id, "4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn empty_items_parse_to_no_match() {
        let body = r#"{"tracks":{"items":[]}}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.tracks.items.is_empty());
    }
}
