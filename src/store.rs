// 🗂️ Profile Store - single owner of profile + plan state
//
// All mutations go through here so the invariants live at one boundary:
// - links is never empty
// - free tier holds at most FREE_LINK_LIMIT links
// - link ids are unique and never reused (next_link_id only grows)
//
// Every operation validates first and only then mutates. A failed call
// leaves the store untouched and records nothing in the journal.

use crate::error::{ProfileError, ProfileResult};
use crate::gate::{PlanEvent, PlanGate, Transition};
use crate::model::{
    Link, LinkId, LinkPatch, PlanState, PlanTier, Profile, ProfileField, Theme,
    DEFAULT_LINK_ICON, DEFAULT_LINK_TARGET,
};
use crate::persistence::{self, Event, PersistenceAdapter};
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Actor recorded on journal events
const STORE_ACTOR: &str = "profile_store";

/// Undrained events kept before the oldest are dropped
pub const JOURNAL_CAPACITY: usize = 1024;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Serializable view of everything the store owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub profile: Profile,
    pub plan: PlanState,
    pub next_link_id: u64,
}

impl Snapshot {
    /// Structural checks run before a snapshot is accepted
    pub fn validate(&self, gate: &PlanGate) -> ProfileResult<()> {
        let links = &self.profile.links;

        if links.is_empty() {
            return Err(ProfileError::malformed("profile has no links"));
        }

        let mut seen = HashSet::with_capacity(links.len());
        for link in links {
            if !seen.insert(link.id) {
                return Err(ProfileError::malformed(format!(
                    "duplicate link id {}",
                    link.id
                )));
            }
        }

        if let Some(max) = self.profile.max_link_id() {
            if self.next_link_id <= max.0 {
                return Err(ProfileError::malformed(format!(
                    "next link id {} does not exceed existing id {}",
                    self.next_link_id, max
                )));
            }
        }

        if !gate.admits(self.plan.tier, links.len()) {
            return Err(ProfileError::malformed(format!(
                "{} links exceed the {} plan limit",
                links.len(),
                self.plan.tier
            )));
        }

        Ok(())
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DowngradeOutcome {
    /// Not confirmed, or already free
    NoOp,
    /// Now on free. `removed` holds the truncated links, gone for good.
    Downgraded { removed: Vec<Link> },
}

// ============================================================================
// STORE
// ============================================================================

/// Owns the profile and plan. Each successful mutation appends an audit
/// [`Event`]; callers drain them with [`ProfileStore::take_events`]. Past
/// [`JOURNAL_CAPACITY`] undrained events the oldest are discarded.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profile: Profile,
    plan: PlanState,
    next_link_id: u64,
    gate: PlanGate,
    journal: Vec<Event>,
}

impl ProfileStore {
    /// Fresh store with the sample profile
    pub fn new() -> Self {
        let profile = Profile::seed();
        let next_link_id = profile.max_link_id().map_or(1, |id| id.0 + 1);

        ProfileStore {
            profile,
            plan: PlanState::default(),
            next_link_id,
            gate: PlanGate::default(),
            journal: Vec::new(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn links(&self) -> &[Link] {
        &self.profile.links
    }

    pub fn plan(&self) -> PlanState {
        self.plan
    }

    pub fn tier(&self) -> PlanTier {
        self.plan.tier
    }

    pub fn next_link_id(&self) -> LinkId {
        LinkId(self.next_link_id)
    }

    pub fn gate(&self) -> &PlanGate {
        &self.gate
    }

    pub fn can_add_link(&self) -> bool {
        self.gate
            .check_add_link(self.plan.tier, self.profile.links.len())
            .is_ok()
    }

    /// `None` when the plan has no cap
    pub fn remaining_link_slots(&self) -> Option<usize> {
        self.gate
            .remaining_slots(self.plan.tier, self.profile.links.len())
    }

    // ========================================================================
    // LINKS
    // ========================================================================

    pub fn add_link(&mut self, label: &str, target: &str, icon: &str) -> ProfileResult<LinkId> {
        self.gate
            .check_add_link(self.plan.tier, self.profile.links.len())?;

        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;
        self.profile.links.push(Link::new(id, label, target, icon));

        info!(link_id = %id, label, "link added");
        self.record(
            "link_added",
            "link",
            &id.to_string(),
            serde_json::json!({ "label": label, "url": target, "icon": icon }),
        );

        Ok(id)
    }

    /// "Add New Link" button: placeholder label, example URL, globe icon
    pub fn add_default_link(&mut self) -> ProfileResult<LinkId> {
        let label = format!("Link {}", self.profile.links.len() + 1);
        self.add_link(&label, DEFAULT_LINK_TARGET, DEFAULT_LINK_ICON)
    }

    /// Removes and returns the link
    pub fn remove_link(&mut self, id: LinkId) -> ProfileResult<Link> {
        if self.profile.links.len() <= 1 {
            return Err(ProfileError::LastLinkViolation);
        }
        let index = self
            .profile
            .position(id)
            .ok_or(ProfileError::NotFound(id))?;

        let removed = self.profile.links.remove(index);

        info!(link_id = %id, remaining = self.profile.links.len(), "link removed");
        self.record(
            "link_removed",
            "link",
            &id.to_string(),
            serde_json::json!({ "label": removed.label, "position": index }),
        );

        Ok(removed)
    }

    pub fn update_link(&mut self, id: LinkId, patch: LinkPatch) -> ProfileResult<()> {
        let index = self
            .profile
            .position(id)
            .ok_or(ProfileError::NotFound(id))?;

        if patch.is_empty() {
            return Ok(());
        }

        let data = serde_json::json!({
            "label": patch.label,
            "url": patch.target,
            "icon": patch.icon,
        });
        patch.apply(&mut self.profile.links[index]);

        debug!(link_id = %id, "link updated");
        self.record("link_updated", "link", &id.to_string(), data);

        Ok(())
    }

    /// Move a link to the top. Already on top is fine.
    pub fn promote_link(&mut self, id: LinkId) -> ProfileResult<()> {
        let index = self
            .profile
            .position(id)
            .ok_or(ProfileError::NotFound(id))?;

        if index == 0 {
            return Ok(());
        }

        let link = self.profile.links.remove(index);
        self.profile.links.insert(0, link);

        info!(link_id = %id, from = index, "link moved to top");
        self.record(
            "link_promoted",
            "link",
            &id.to_string(),
            serde_json::json!({ "from": index }),
        );

        Ok(())
    }

    // ========================================================================
    // PROFILE FIELDS
    // ========================================================================

    /// Free text, stored as given. URL/image checks belong to the UI.
    pub fn set_profile_field(&mut self, field: ProfileField, value: &str) {
        let slot = match field {
            ProfileField::DisplayName => &mut self.profile.display_name,
            ProfileField::Bio => &mut self.profile.bio,
            ProfileField::Avatar => &mut self.profile.avatar_ref,
        };
        *slot = value.to_string();

        // Avatars can be large data URIs; keep them out of the journal.
        let data = match field {
            ProfileField::Avatar => serde_json::json!({ "field": field.as_str() }),
            _ => serde_json::json!({ "field": field.as_str(), "value": value }),
        };
        self.record("profile_updated", "profile", field.as_str(), data);
    }

    /// Any id is accepted; renderers resolve unknown ids.
    pub fn set_theme(&mut self, theme: impl Into<Theme>) {
        let theme = theme.into().canonical();
        if !theme.is_builtin() {
            debug!(theme = %theme, "storing unrecognized theme id");
        }

        self.record(
            "theme_changed",
            "profile",
            "theme",
            serde_json::json!({ "theme": theme.as_str() }),
        );
        self.profile.theme = theme;
    }

    // ========================================================================
    // PLAN
    // ========================================================================

    /// Call only after the gateway confirmed a charge. Returns whether the tier changed.
    pub fn upgrade(&mut self) -> bool {
        let transition = self.gate.transition(
            self.plan.tier,
            PlanEvent::PaymentSucceeded,
            self.profile.links.len(),
        );

        match transition {
            Transition::Upgrade => {
                self.plan.tier = PlanTier::Vip;
                info!("plan upgraded to vip");
                self.record(
                    "plan_upgraded",
                    "plan",
                    PlanTier::Vip.as_str(),
                    serde_json::json!({ "from": PlanTier::Free.as_str() }),
                );
                true
            }
            _ => false,
        }
    }

    pub fn downgrade(&mut self, confirmed: bool) -> DowngradeOutcome {
        let transition = self.gate.transition(
            self.plan.tier,
            PlanEvent::DowngradeRequested { confirmed },
            self.profile.links.len(),
        );

        let keep = match transition {
            Transition::Downgrade { keep } => keep,
            _ => return DowngradeOutcome::NoOp,
        };

        let removed = match keep {
            Some(n) => self.profile.links.split_off(n),
            None => Vec::new(),
        };
        self.plan.tier = PlanTier::Free;

        info!(truncated = removed.len(), "plan downgraded to free");
        self.record(
            "plan_downgraded",
            "plan",
            PlanTier::Free.as_str(),
            serde_json::json!({
                "removed_links": removed.iter().map(|l| l.id.0).collect::<Vec<_>>(),
            }),
        );

        DowngradeOutcome::Downgraded { removed }
    }

    // ========================================================================
    // SNAPSHOT / RESTORE
    // ========================================================================

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            profile: self.profile.clone(),
            plan: self.plan,
            next_link_id: self.next_link_id,
        }
    }

    pub fn restore(mut snapshot: Snapshot) -> ProfileResult<Self> {
        let gate = PlanGate::default();
        snapshot.validate(&gate)?;
        snapshot.profile.theme = snapshot.profile.theme.canonical();

        Ok(ProfileStore {
            profile: snapshot.profile,
            plan: snapshot.plan,
            next_link_id: snapshot.next_link_id,
            gate,
            journal: Vec::new(),
        })
    }

    /// Save through an adapter. The adapter either stores all of it or nothing.
    pub fn save_to(&self, adapter: &dyn PersistenceAdapter, key: &str) -> Result<()> {
        let payload = persistence::encode_snapshot(&self.snapshot())?;
        adapter
            .save(key, &payload)
            .with_context(|| format!("Failed to save profile '{}'", key))?;

        info!(key, links = self.profile.links.len(), "profile saved");
        Ok(())
    }

    /// Restore from an adapter, falling back to the seed when nothing usable is stored.
    pub fn load_or_seed(adapter: &dyn PersistenceAdapter, key: &str) -> Result<Self> {
        let payload = adapter
            .load(key)
            .with_context(|| format!("Failed to load profile '{}'", key))?;

        let Some(payload) = payload else {
            debug!(key, "no saved profile, using seed");
            return Ok(ProfileStore::new());
        };

        match persistence::decode_snapshot(&payload).and_then(ProfileStore::restore) {
            Ok(store) => {
                info!(key, tier = %store.tier(), "profile loaded");
                Ok(store)
            }
            Err(e) => {
                warn!(key, error = %e, "saved profile rejected, using seed");
                Ok(ProfileStore::new())
            }
        }
    }

    /// Profile and plan are deleted together
    pub fn delete(adapter: &dyn PersistenceAdapter, key: &str) -> Result<()> {
        adapter
            .delete(key)
            .with_context(|| format!("Failed to delete profile '{}'", key))?;
        info!(key, "profile deleted");
        Ok(())
    }

    // ========================================================================
    // JOURNAL
    // ========================================================================

    /// Drain change events recorded since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    pub fn pending_events(&self) -> &[Event] {
        &self.journal
    }

    fn record(&mut self, event_type: &str, entity_type: &str, entity_id: &str, data: serde_json::Value) {
        if self.journal.len() >= JOURNAL_CAPACITY {
            let dropped = self.journal.remove(0);
            debug!(event_type = %dropped.event_type, "journal full, dropping oldest event");
        }
        self.journal
            .push(Event::new(event_type, entity_type, entity_id, data, STORE_ACTOR));
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
