// ⚠️ Error kinds for profile, plan and payment operations
//
// Every operation is validate-then-apply: when one of these comes back,
// the store is exactly as it was before the call.

use crate::model::LinkId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// Free plan link cap reached. The caller should offer an upgrade.
    #[error("Free plan limited to {limit} links. Upgrade to VIP for unlimited links.")]
    LimitExceeded { limit: usize },

    /// Tried to remove the only remaining link.
    #[error("You must have at least one link")]
    LastLinkViolation,

    /// Unknown link id (caller is out of sync with the store).
    #[error("link {0} not found")]
    NotFound(LinkId),

    /// Persisted snapshot failed structural validation.
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    /// Gateway declined, or the charge request was rejected before sending.
    #[error("{0}")]
    PaymentFailed(String),
}

impl ProfileError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        ProfileError::Malformed(msg.into())
    }

    pub fn payment_failed(msg: impl Into<String>) -> Self {
        ProfileError::PaymentFailed(msg.into())
    }

    /// Whether the UI should route the user to the upgrade prompt
    pub fn suggests_upgrade(&self) -> bool {
        matches!(self, ProfileError::LimitExceeded { .. })
    }
}

pub type ProfileResult<T> = std::result::Result<T, ProfileError>;
