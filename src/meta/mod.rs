//! Page metadata composition and head-tag generation
//!
//! Every rendered page carries one effective [`PageMetadata`], computed by
//! overlaying the page's [`MetaOverride`] onto the process-wide
//! [`SiteDefaults`]. Composition is total: any override, including the empty
//! one, produces a valid result.

use serde::Serialize;

use crate::helpers::html_escape;

/// Site-wide fallback metadata, built once from the site config at startup
/// and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDefaults {
    pub title: String,
    pub description: String,
    pub image: String,
    /// Base URL used to absolutize relative preview-image paths
    pub base_url: String,
}

/// A page's partial metadata. A field wins over the site default iff it is
/// present and non-empty after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaOverride {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl MetaOverride {
    /// Compose this override over the site defaults, field by field.
    pub fn merge_over(&self, defaults: &SiteDefaults) -> PageMetadata {
        PageMetadata {
            title: pick(&self.title, &defaults.title),
            description: pick(&self.description, &defaults.description),
            image: pick(&self.image, &defaults.image),
            base_url: defaults.base_url.clone(),
        }
    }
}

/// The effective metadata of a rendered page. `title` is never empty as long
/// as the site default is non-empty; `description` and `image` may be empty,
/// in which case their head tags are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image: String,
    pub base_url: String,
}

impl PageMetadata {
    /// View the effective metadata as an override again. Merging the result
    /// over the same defaults reproduces this metadata unchanged.
    pub fn as_override(&self) -> MetaOverride {
        MetaOverride {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            image: Some(self.image.clone()),
        }
    }

    /// Emit the head tags for this page: document title, a description meta
    /// tag, and the social-preview (Open Graph) tags for title, description
    /// and image. Pure and deterministic; empty optional fields are omitted.
    pub fn head_tags(&self) -> String {
        let mut tags = Vec::with_capacity(5);

        tags.push(format!("<title>{}</title>", html_escape(&self.title)));

        if !self.description.is_empty() {
            tags.push(format!(
                r#"<meta name="description" content="{}">"#,
                html_escape(&self.description)
            ));
        }

        tags.push(format!(
            r#"<meta property="og:title" content="{}">"#,
            html_escape(&self.title)
        ));

        if !self.description.is_empty() {
            tags.push(format!(
                r#"<meta property="og:description" content="{}">"#,
                html_escape(&self.description)
            ));
        }

        if !self.image.is_empty() {
            tags.push(format!(
                r#"<meta property="og:image" content="{}">"#,
                html_escape(&self.image_url())
            ));
        }

        tags.join("\n")
    }

    /// Absolute URL of the preview image. Relative paths are resolved
    /// against the site base URL; absolute URLs pass through unchanged.
    fn image_url(&self) -> String {
        if self.image.starts_with("http://") || self.image.starts_with("https://") {
            self.image.clone()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                self.image.trim_start_matches('/')
            )
        }
    }
}

/// Pick the override value iff present and non-empty, else the default.
fn pick(over: &Option<String>, default: &str) -> String {
    match over.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> SiteDefaults {
        SiteDefaults {
            title: "Site".to_string(),
            description: "Desc".to_string(),
            image: "/default.png".to_string(),
            base_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_empty_override_yields_defaults() {
        let meta = MetaOverride::default().merge_over(&defaults());
        assert_eq!(meta.title, "Site");
        assert_eq!(meta.description, "Desc");
        assert_eq!(meta.image, "/default.png");
    }

    #[test]
    fn test_override_field_wins_when_non_empty() {
        let over = MetaOverride {
            title: Some("About - X".to_string()),
            description: None,
            image: None,
        };
        let meta = over.merge_over(&defaults());
        assert_eq!(meta.title, "About - X");
        assert_eq!(meta.description, "Desc");
        assert_eq!(meta.image, "/default.png");
    }

    #[test]
    fn test_empty_string_does_not_win() {
        let over = MetaOverride {
            title: Some(String::new()),
            description: Some("   ".to_string()),
            image: None,
        };
        let meta = over.merge_over(&defaults());
        assert_eq!(meta.title, "Site");
        assert_eq!(meta.description, "Desc");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let over = MetaOverride {
            title: Some("Notes".to_string()),
            description: Some("All the notes".to_string()),
            image: None,
        };
        let first = over.merge_over(&defaults());
        let second = first.as_override().merge_over(&defaults());
        assert_eq!(first, second);
    }

    #[test]
    fn test_head_tags_deterministic() {
        let meta = MetaOverride::default().merge_over(&defaults());
        assert_eq!(meta.head_tags(), meta.head_tags());
    }

    #[test]
    fn test_head_tags_full_set() {
        let meta = MetaOverride::default().merge_over(&defaults());
        let tags = meta.head_tags();
        assert!(tags.contains("<title>Site</title>"));
        assert!(tags.contains(r#"<meta name="description" content="Desc">"#));
        assert!(tags.contains(r#"<meta property="og:title" content="Site">"#));
        assert!(tags.contains(r#"<meta property="og:description" content="Desc">"#));
        assert!(tags.contains(
            r#"<meta property="og:image" content="https://example.com/default.png">"#
        ));
    }

    #[test]
    fn test_head_tags_omit_missing_fields() {
        let bare = SiteDefaults {
            title: "Site".to_string(),
            description: String::new(),
            image: String::new(),
            base_url: "https://example.com".to_string(),
        };
        let tags = MetaOverride::default().merge_over(&bare).head_tags();
        assert!(tags.contains("<title>Site</title>"));
        assert!(!tags.contains("description"));
        assert!(!tags.contains("og:image"));
    }

    #[test]
    fn test_head_tags_escapes_html() {
        let over = MetaOverride {
            title: Some(r#"Tom & "Jerry" <3"#.to_string()),
            description: None,
            image: None,
        };
        let tags = over.merge_over(&defaults()).head_tags();
        assert!(tags.contains("<title>Tom &amp; &quot;Jerry&quot; &lt;3</title>"));
    }

    #[test]
    fn test_absolute_image_passes_through() {
        let over = MetaOverride {
            image: Some("https://cdn.example.com/hero.png".to_string()),
            ..Default::default()
        };
        let tags = over.merge_over(&defaults()).head_tags();
        assert!(tags.contains(r#"content="https://cdn.example.com/hero.png""#));
    }
}
