// 🚧 Plan Gate - tier state machine and link cap
//
//   Free --(payment success)--------------> Vip
//   Vip  --(downgrade, confirmed)---------> Free   (links cut to the first 5)
//
// The gate only decides. The store applies the decision.

use crate::error::{ProfileError, ProfileResult};
use crate::model::PlanTier;

/// Max links on the free plan
pub const FREE_LINK_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanEvent {
    /// Gateway confirmed a charge
    PaymentSucceeded,

    /// User asked to go back to free. Ignored unless confirmed.
    DowngradeRequested { confirmed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do
    Stay,
    Upgrade,
    /// Keep only the first `keep` links when set
    Downgrade { keep: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanGate {
    free_link_limit: usize,
}

impl PlanGate {
    pub fn new(free_link_limit: usize) -> Self {
        PlanGate { free_link_limit }
    }

    /// `None` means unlimited
    pub fn link_limit(&self, tier: PlanTier) -> Option<usize> {
        match tier {
            PlanTier::Free => Some(self.free_link_limit),
            PlanTier::Vip => None,
        }
    }

    /// Guard for every link-adding operation
    pub fn check_add_link(&self, tier: PlanTier, link_count: usize) -> ProfileResult<()> {
        match self.link_limit(tier) {
            Some(limit) if link_count >= limit => Err(ProfileError::LimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    pub fn remaining_slots(&self, tier: PlanTier, link_count: usize) -> Option<usize> {
        self.link_limit(tier)
            .map(|limit| limit.saturating_sub(link_count))
    }

    /// Whether a (tier, link count) pair is a legal resting state
    pub fn admits(&self, tier: PlanTier, link_count: usize) -> bool {
        match self.link_limit(tier) {
            Some(limit) => link_count <= limit,
            None => true,
        }
    }

    pub fn transition(&self, tier: PlanTier, event: PlanEvent, link_count: usize) -> Transition {
        match (tier, event) {
            (PlanTier::Free, PlanEvent::PaymentSucceeded) => Transition::Upgrade,
            (PlanTier::Vip, PlanEvent::DowngradeRequested { confirmed: true }) => {
                let keep = (link_count > self.free_link_limit).then_some(self.free_link_limit);
                Transition::Downgrade { keep }
            }
            _ => Transition::Stay,
        }
    }
}

impl Default for PlanGate {
    fn default() -> Self {
        PlanGate::new(FREE_LINK_LIMIT)
    }
}
