/// One inbound channel-point redemption notification. Transient; lives
/// for a single dispatch cycle and is never persisted.
#[derive(Debug, Clone)]
pub struct RedemptionEvent {
    pub reward_title: String,
    pub user_input: Option<String>,
    pub redemption_id: String,
    pub reward_id: String,
}

/// Terminal states a redemption can be moved to on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionStatus {
    Fulfilled,
    Canceled,
}

impl RedemptionStatus {
    /// The strings Helix expects in update-redemption-status calls.
    pub fn as_helix_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Fulfilled => "FULFILLED",
            RedemptionStatus::Canceled => "CANCELED",
        }
    }
}
