/// A resolved track in the canonical `spotify:track:<id>` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackReference {
    pub uri: String,
}
