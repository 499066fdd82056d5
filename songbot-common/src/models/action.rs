use std::collections::HashMap;

use crate::error::{Error, ErrorKind};

/// The closed set of playback actions a redemption can trigger.
/// The seek variants carry the configured step in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    AddSong,
    SkipSong,
    PlayPrevious,
    StartPlayback,
    PausePlayback,
    SeekForward(i64),
    SeekBackward(i64),
}

impl ActionKind {
    /// Whether the redemption must carry user input for this action.
    pub fn requires_user_input(&self) -> bool {
        matches!(self, ActionKind::AddSong)
    }
}

/// Immutable reward-title → action map, built once from configuration.
/// An empty title means the action is disabled and gets no entry.
#[derive(Debug, Clone, Default)]
pub struct ActionMapping {
    entries: HashMap<String, ActionKind>,
}

impl ActionMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: &str, kind: ActionKind) {
        if title.is_empty() {
            return;
        }
        self.entries.insert(title.to_string(), kind);
    }

    pub fn resolve(&self, title: &str) -> Option<ActionKind> {
        self.entries.get(title).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, ActionKind)> {
        self.entries.iter().map(|(title, kind)| (title.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Terminal result of one dispatched event. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub error: Option<ErrorKind>,
}

impl ActionOutcome {
    pub fn from_result(result: &Result<(), Error>) -> Self {
        match result {
            Ok(()) => Self { success: true, error: None },
            Err(e) => Self { success: false, error: Some(e.kind()) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_is_disabled() {
        let mut mapping = ActionMapping::new();
        mapping.insert("", ActionKind::SkipSong);
        mapping.insert("Skip", ActionKind::SkipSong);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.resolve("Skip"), Some(ActionKind::SkipSong));
        assert_eq!(mapping.resolve(""), None);
    }

    #[test]
    fn unknown_title_resolves_to_none() {
        let mut mapping = ActionMapping::new();
        mapping.insert("Add a song", ActionKind::AddSong);
        assert_eq!(mapping.resolve("Something else"), None);
    }

    #[test]
    fn only_add_song_requires_input() {
        assert!(ActionKind::AddSong.requires_user_input());
        assert!(!ActionKind::SeekForward(10_000).requires_user_input());
        assert!(!ActionKind::PausePlayback.requires_user_input());
    }

    #[test]
    fn outcome_carries_error_kind() {
        let failed: Result<(), Error> = Err(Error::Remote { status: 502, body: "bad gateway".into() });
        let outcome = ActionOutcome::from_result(&failed);
        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(ErrorKind::RemoteError));

        let ok = ActionOutcome::from_result(&Ok(()));
        assert!(ok.success);
        assert_eq!(ok.error, None);
    }
}
