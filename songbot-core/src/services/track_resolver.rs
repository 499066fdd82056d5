//! Turns a redemption's user input into a canonical track reference.
//!
//! Three mutually exclusive strategies, tried in order: a literal
//! `spotify:track:` URI, an open.spotify.com share link, and finally a
//! remote search. Only the last one touches the network.

use std::sync::Arc;

use songbot_common::models::track::TrackReference;

use crate::Error;
use crate::services::TrackSearch;

const TRACK_URI_PREFIX: &str = "spotify:track:";
const TRACK_LINK_HOST: &str = "://open.spotify.com/";
const TRACK_LINK_MARKER: &str = "/track/";

pub struct TrackResolver {
    search: Arc<dyn TrackSearch>,
}

impl TrackResolver {
    pub fn new(search: Arc<dyn TrackSearch>) -> Self {
        Self { search }
    }

    pub async fn resolve(&self, query: &str) -> Result<TrackReference, Error> {
        if let Some(track) = parse_track_uri(query) {
            return Ok(track);
        }
        if let Some(track) = parse_track_link(query) {
            return Ok(track);
        }
        match self.search.search_track(query).await? {
            Some(id) => Ok(TrackReference { uri: format!("{TRACK_URI_PREFIX}{id}") }),
            None => Err(Error::NotFound(format!("no tracks found for '{query}'"))),
        }
    }
}

/// "spotify:track:ABC extra words" => the first token verbatim.
fn parse_track_uri(query: &str) -> Option<TrackReference> {
    if !query.starts_with(TRACK_URI_PREFIX) {
        return None;
    }
    let uri = query.split_whitespace().next()?;
    Some(TrackReference { uri: uri.to_string() })
}

/// A share link carries the id between "/track/" and the query string.
fn parse_track_link(query: &str) -> Option<TrackReference> {
    if !query.contains(TRACK_LINK_HOST) {
        return None;
    }
    let (_, rest) = query.split_once(TRACK_LINK_MARKER)?;
    let id = rest.split('?').next().unwrap_or(rest);
    Some(TrackReference { uri: format!("{TRACK_URI_PREFIX}{id}") })
}
