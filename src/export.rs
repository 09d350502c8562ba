// 📤 Export - standalone HTML page and JSON document
//
// Pure: same profile, tier and timestamp always give the same output.

use crate::model::{PlanTier, Profile, Theme};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "html" => Some(ExportFormat::Html),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Page background for a theme. Unknown ids get the default gradient.
pub fn theme_gradient(theme: &Theme) -> &'static str {
    match theme {
        Theme::Vip => "linear-gradient(135deg, #FFD700 0%, #FF9500 100%)",
        Theme::Ocean => "linear-gradient(135deg, #00b4db 0%, #0083b0 100%)",
        Theme::Sunset => "linear-gradient(135deg, #ff7e5f 0%, #feb47b 100%)",
        Theme::Forest => "linear-gradient(135deg, #56ab2f 0%, #a8e063 100%)",
        Theme::Default | Theme::Custom(_) => "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    }
}

pub fn render(
    profile: &Profile,
    tier: PlanTier,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> Result<String> {
    match format {
        ExportFormat::Html => Ok(render_html(profile, tier, exported_at)),
        ExportFormat::Json => render_json(profile, tier, exported_at),
    }
}

// ============================================================================
// HTML
// ============================================================================

const PAGE_STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
        body { background: #f9fafb; min-height: 100vh; display: flex; align-items: center; justify-content: center; padding: 20px; }
        .linktree-container { width: 100%; max-width: 500px; border-radius: 12px; padding: 40px 30px; color: white; box-shadow: 0 10px 30px rgba(0,0,0,0.2); text-align: center; }
        .profile-image { width: 120px; height: 120px; border-radius: 50%; margin: 0 auto 20px; overflow: hidden; border: 5px solid rgba(255,255,255,0.3); }
        .profile-image img { width: 100%; height: 100%; object-fit: cover; }
        .profile-name { font-size: 24px; margin-bottom: 10px; font-weight: bold; }
        .profile-bio { opacity: 0.9; margin-bottom: 30px; line-height: 1.6; }
        .links-container { display: flex; flex-direction: column; gap: 15px; }
        .link-item { background: rgba(255,255,255,0.2); padding: 15px; border-radius: 8px; text-decoration: none; color: white; display: flex; align-items: center; gap: 15px; transition: all 0.3s ease; }
        .link-item:hover { background: rgba(255,255,255,0.3); transform: translateY(-2px); }
        .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid rgba(255,255,255,0.2); font-size: 14px; opacity: 0.8; }
        .vip-badge { display: inline-block; background: rgba(255,255,255,0.3); padding: 4px 12px; border-radius: 20px; font-size: 12px; margin-left: 10px; }
"#;

/// Standalone page. All profile text is escaped.
pub fn render_html(profile: &Profile, tier: PlanTier, exported_at: DateTime<Utc>) -> String {
    let name = escape_html(&profile.display_name);
    let badge = if tier.is_vip() {
        r#" <span class="vip-badge"><i class="fas fa-crown"></i> VIP</span>"#
    } else {
        ""
    };

    let mut links = String::new();
    for link in &profile.links {
        let _ = write!(
            links,
            r#"
            <a href="{url}" class="link-item" target="_blank" rel="noopener">
                <i class="{icon}"></i>
                <span>{label}</span>
                <i class="fas fa-external-link-alt" style="margin-left: auto;"></i>
            </a>"#,
            url = escape_html(&link.target),
            icon = escape_html(&link.icon),
            label = escape_html(&link.label),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name} - LinkTree</title>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css">
    <style>{style}
        .linktree-container {{ background: {background}; }}
    </style>
</head>
<body>
    <div class="linktree-container">
        <div class="profile-image">
            <img src="{avatar}" alt="{name}">
        </div>
        <h1 class="profile-name">{name}{badge}</h1>
        <p class="profile-bio">{bio}</p>

        <div class="links-container">{links}
        </div>

        <div class="footer">
            <p>Made with ❤️ using LinkTree VIP</p>
            <p>© {year} {name}</p>
        </div>
    </div>
</body>
</html>
"#,
        name = name,
        style = PAGE_STYLE,
        background = theme_gradient(&profile.theme),
        avatar = escape_html(&profile.avatar_ref),
        badge = badge,
        bio = escape_html(&profile.bio),
        links = links,
        year = exported_at.year(),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    profile: &'a Profile,
    tier: PlanTier,
    is_vip: bool,
    export_timestamp: String,
}

pub fn render_json(profile: &Profile, tier: PlanTier, exported_at: DateTime<Utc>) -> Result<String> {
    let doc = JsonExport {
        profile,
        tier,
        is_vip: tier.is_vip(),
        export_timestamp: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    serde_json::to_string_pretty(&doc).context("Failed to serialize profile export")
}

/// linktree-alex-johnson.html. Anything but letters and digits becomes `-`,
/// so the name never leaves the current directory.
pub fn export_file_name(profile: &Profile, format: ExportFormat) -> String {
    let slug: String = profile
        .display_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    format!("linktree-{}.{}", slug, format.extension())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Link, LinkId};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_html_contains_links_in_order() {
        let profile = Profile::seed();
        let html = render_html(&profile, PlanTier::Free, at());

        let portfolio = html.find("Portfolio").unwrap();
        let linkedin = html.find("LinkedIn").unwrap();
        assert!(portfolio < linkedin);
        assert!(html.contains("https://instagram.com"));
        assert!(html.contains("© 2025 Alex Johnson"));
        assert!(!html.contains("vip-badge\"><i"));
        assert!(html.contains(theme_gradient(&Theme::Default)));
    }

    #[test]
    fn test_html_vip_badge_and_theme() {
        let mut profile = Profile::seed();
        profile.theme = Theme::Forest;
        let html = render_html(&profile, PlanTier::Vip, at());

        assert!(html.contains("<i class=\"fas fa-crown\"></i> VIP"));
        assert!(html.contains("#56ab2f"));
    }

    #[test]
    fn test_unknown_theme_renders_default() {
        let mut profile = Profile::seed();
        profile.theme = Theme::from("glitter");
        let html = render_html(&profile, PlanTier::Free, at());

        assert!(html.contains(theme_gradient(&Theme::Default)));
    }

    #[test]
    fn test_html_escapes_user_text() {
        let mut profile = Profile::seed();
        profile.display_name = "<script>alert(1)</script>".to_string();
        profile.links = vec![Link::new(LinkId(1), "A & B", "https://x.example/?a=1&b=\"2\"", "fas fa-globe")];

        let html = render_html(&profile, PlanTier::Free, at());
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A &amp; B"));
        assert!(html.contains("&quot;2&quot;"));
    }

    #[test]
    fn test_html_is_deterministic() {
        let profile = Profile::seed();
        assert_eq!(
            render_html(&profile, PlanTier::Vip, at()),
            render_html(&profile, PlanTier::Vip, at())
        );
    }

    #[test]
    fn test_json_export_fields() {
        let json = render_json(&Profile::seed(), PlanTier::Vip, at()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tier"], "vip");
        assert_eq!(value["isVip"], true);
        assert_eq!(value["exportTimestamp"], "2025-03-14T09:26:53.000Z");
        assert_eq!(value["profile"]["name"], "Alex Johnson");
        assert_eq!(value["profile"]["links"].as_array().unwrap().len(), 5);
        assert_eq!(value["profile"]["links"][0]["url"], "https://example.com");
    }

    #[test]
    fn test_render_dispatch_and_file_name() {
        let profile = Profile::seed();
        let json = render(&profile, PlanTier::Free, ExportFormat::Json, at()).unwrap();
        assert!(json.contains("\"exportTimestamp\""));

        assert_eq!(export_file_name(&profile, ExportFormat::Html), "linktree-alex-johnson.html");
        assert_eq!(export_file_name(&profile, ExportFormat::Json), "linktree-alex-johnson.json");
        assert_eq!(ExportFormat::parse("JSON"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse("pdf"), None);
    }

    #[test]
    fn test_file_name_stays_in_current_directory() {
        let mut profile = Profile::seed();
        profile.display_name = "../../evil".to_string();
        let name = export_file_name(&profile, ExportFormat::Html);
        assert_eq!(name, "linktree-------evil.html");

        profile.display_name = "a/b\\c..d".to_string();
        let name = export_file_name(&profile, ExportFormat::Json);
        assert!(!name.contains('/') && !name.contains('\\') && !name.contains(".."));
        assert_eq!(std::path::Path::new(&name).components().count(), 1);
    }
}
