//! Site configuration (site.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::meta::SiteDefaults;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Metadata defaults
    /// Site-wide social-preview image, used when a page supplies none
    pub default_image: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub archive_dir: String,
    pub pagination_dir: String,
    #[serde(default)]
    pub skip_render: Vec<String>,

    // Writing
    pub new_post_name: String,

    // Code highlighting
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Pagination
    pub per_page: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            description: "A personal blog".to_string(),
            author: "Anonymous".to_string(),
            language: "en".to_string(),

            url: "https://example.com".to_string(),
            root: "/".to_string(),

            default_image: String::new(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            archive_dir: "archive".to_string(),
            pagination_dir: "page".to_string(),
            skip_render: Vec::new(),

            new_post_name: ":title.md".to_string(),

            highlight: HighlightConfig::default(),

            per_page: 10,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// The site-wide metadata defaults every page render falls back to
    pub fn site_defaults(&self) -> SiteDefaults {
        SiteDefaults {
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.default_image.clone(),
            base_url: self.url.clone(),
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Syntect theme name
    pub theme: String,
    pub line_numbers: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_numbers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "My Site");
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.per_page, 10);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Notes from the Field
author: Jo Bloggs
url: https://notes.example.org
default_image: /images/card.png
per_page: 5
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Notes from the Field");
        assert_eq!(config.author, "Jo Bloggs");
        assert_eq!(config.per_page, 5);
        assert_eq!(config.default_image, "/images/card.png");
        // untouched fields keep their defaults
        assert_eq!(config.public_dir, "public");
    }

    #[test]
    fn test_site_defaults_mirror_config() {
        let config = SiteConfig {
            title: "Blog".to_string(),
            description: "Words".to_string(),
            default_image: "/card.png".to_string(),
            url: "https://blog.example".to_string(),
            ..SiteConfig::default()
        };
        let defaults = config.site_defaults();
        assert_eq!(defaults.title, "Blog");
        assert_eq!(defaults.description, "Words");
        assert_eq!(defaults.image, "/card.png");
        assert_eq!(defaults.base_url, "https://blog.example");
    }
}
