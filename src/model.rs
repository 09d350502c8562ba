// 🧩 Profile data model
// A link-in-bio page: profile text, avatar, theme and an ordered list of links.
//
// Identity of a link is its id, never its position. Ids are handed out by the
// store from a monotonically increasing counter and are never reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// LINK
// ============================================================================

/// Stable link identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LinkId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(LinkId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,

    /// Text shown on the button
    #[serde(rename = "name")]
    pub label: String,

    /// Outbound URL
    #[serde(rename = "url")]
    pub target: String,

    /// Icon class, e.g. "fab fa-instagram"
    #[serde(rename = "icon")]
    pub icon: String,
}

impl Link {
    pub fn new(id: LinkId, label: &str, target: &str, icon: &str) -> Self {
        Link {
            id,
            label: label.to_string(),
            target: target.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Partial update of a link. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPatch {
    pub label: Option<String>,
    pub target: Option<String>,
    pub icon: Option<String>,
}

impl LinkPatch {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.target.is_none() && self.icon.is_none()
    }

    pub(crate) fn apply(self, link: &mut Link) {
        if let Some(label) = self.label {
            link.label = label;
        }
        if let Some(target) = self.target {
            link.target = target;
        }
        if let Some(icon) = self.icon {
            link.icon = icon;
        }
    }
}

// ============================================================================
// THEME
// ============================================================================

/// Visual theme. Unknown ids are kept verbatim; renderers decide the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    Default,
    Vip,
    Ocean,
    Sunset,
    Forest,
    Custom(String),
}

impl Theme {
    pub fn as_str(&self) -> &str {
        match self {
            Theme::Default => "default",
            Theme::Vip => "vip",
            Theme::Ocean => "ocean",
            Theme::Sunset => "sunset",
            Theme::Forest => "forest",
            Theme::Custom(id) => id,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Theme::Custom(_))
    }

    /// `Custom("vip")` becomes `Vip`, so a theme reads back the way it was stored.
    pub fn canonical(self) -> Theme {
        match self {
            Theme::Custom(id) => Theme::from(id),
            builtin => builtin,
        }
    }
}

impl From<&str> for Theme {
    fn from(id: &str) -> Self {
        match id {
            "default" => Theme::Default,
            "vip" => Theme::Vip,
            "ocean" => Theme::Ocean,
            "sunset" => Theme::Sunset,
            "forest" => Theme::Forest,
            other => Theme::Custom(other.to_string()),
        }
    }
}

impl From<String> for Theme {
    fn from(id: String) -> Self {
        Theme::from(id.as_str())
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.as_str().to_string()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Default
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PLAN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Vip,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Vip => "vip",
        }
    }

    pub fn is_vip(&self) -> bool {
        matches!(self, PlanTier::Vip)
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plan state owned by the store. Only upgrade/downgrade change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanState {
    pub tier: PlanTier,
}

// ============================================================================
// PROFILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "name")]
    pub display_name: String,

    pub bio: String,

    /// Avatar URL or data URI
    #[serde(rename = "image")]
    pub avatar_ref: String,

    pub theme: Theme,

    /// Display order matters
    pub links: Vec<Link>,
}

impl Profile {
    /// Sample profile used on first run
    pub fn seed() -> Self {
        Profile {
            display_name: "Alex Johnson".to_string(),
            bio: "Digital Creator | Content Strategist | Sharing insights about digital marketing"
                .to_string(),
            avatar_ref: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&q=80".to_string(),
            theme: Theme::Default,
            links: vec![
                Link::new(LinkId(1), "Portfolio", "https://example.com", "fas fa-briefcase"),
                Link::new(LinkId(2), "Instagram", "https://instagram.com", "fab fa-instagram"),
                Link::new(LinkId(3), "YouTube", "https://youtube.com", "fab fa-youtube"),
                Link::new(LinkId(4), "Twitter", "https://twitter.com", "fab fa-twitter"),
                Link::new(LinkId(5), "LinkedIn", "https://linkedin.com", "fab fa-linkedin"),
            ],
        }
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn position(&self, id: LinkId) -> Option<usize> {
        self.links.iter().position(|l| l.id == id)
    }

    pub fn max_link_id(&self) -> Option<LinkId> {
        self.links.iter().map(|l| l.id).max()
    }
}

/// Free-text profile fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    DisplayName,
    Bio,
    Avatar,
}

impl ProfileField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::DisplayName => "name",
            ProfileField::Bio => "bio",
            ProfileField::Avatar => "avatar",
        }
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "display_name" => Ok(ProfileField::DisplayName),
            "bio" => Ok(ProfileField::Bio),
            "avatar" | "image" => Ok(ProfileField::Avatar),
            other => Err(format!("unknown profile field '{}'", other)),
        }
    }
}

// ============================================================================
// ICONS & VIP FEATURES
// ============================================================================

pub const DEFAULT_LINK_TARGET: &str = "https://example.com";
pub const DEFAULT_LINK_ICON: &str = "fas fa-globe";

/// Icon classes offered by the link editor
pub const ICON_CHOICES: [&str; 20] = [
    "fas fa-globe",
    "fab fa-instagram",
    "fab fa-youtube",
    "fab fa-tiktok",
    "fab fa-twitter",
    "fab fa-facebook",
    "fab fa-linkedin",
    "fab fa-github",
    "fab fa-spotify",
    "fab fa-discord",
    "fab fa-whatsapp",
    "fab fa-telegram",
    "fas fa-shopping-cart",
    "fas fa-envelope",
    "fas fa-calendar",
    "fas fa-file-pdf",
    "fas fa-music",
    "fas fa-podcast",
    "fas fa-video",
    "fas fa-image",
];

/// Human label for an icon class: "fas fa-shopping-cart" -> "shopping cart"
pub fn icon_label(icon: &str) -> String {
    icon.replacen("fas fa-", "", 1)
        .replacen("fab fa-", "", 1)
        .replacen('-', " ", 1)
}

/// Unlocked by a successful upgrade
pub const VIP_FEATURES: [&str; 8] = [
    "Unlimited links",
    "All premium themes",
    "Custom domain support",
    "Analytics dashboard",
    "Priority support",
    "No branding",
    "Export to multiple formats",
    "Advanced customization",
];
