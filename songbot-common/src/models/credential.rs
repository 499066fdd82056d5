use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The two services this process keeps authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Spotify,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Twitch => write!(f, "twitch"),
            Platform::Spotify => write!(f, "spotify"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twitch" => Ok(Platform::Twitch),
            "spotify" => Ok(Platform::Spotify),
            _ => Err(format!("Invalid platform: {}", s)),
        }
    }
}

/// One platform's OAuth triple. `expires_at` is always the
/// server-reported expiry; only a successful refresh or authorization
/// exchange may replace these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub platform: Platform,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// A token is usable only while it outlives the safety margin.
    pub fn is_fresh(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - margin > now
    }
}
