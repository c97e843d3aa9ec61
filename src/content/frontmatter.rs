//! Front-matter parsing
//!
//! Every content file begins with a `---`-delimited YAML header holding
//! exactly the fields `title`, `description`, `date` and `image`. Anything
//! else in the header is a build error, not a warning.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ContentError;

/// Front-matter data from a post or page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub image: Option<String>,
}

impl FrontMatter {
    /// Parse front-matter from a content string.
    /// Returns (front_matter, remaining_content).
    pub fn parse(content: &str) -> Result<(Self, &str), ContentError> {
        let content = content.trim_start_matches('\u{feff}');

        let rest = content
            .strip_prefix("---")
            .ok_or(ContentError::MissingHeader)?;
        let rest = rest.strip_prefix('\r').unwrap_or(rest);
        let rest = rest.strip_prefix('\n').unwrap_or(rest);

        let (header, remaining) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else if let Some(end_pos) = rest.find("\n---") {
            (&rest[..end_pos], &rest[end_pos + 4..])
        } else {
            return Err(ContentError::UnterminatedHeader);
        };
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if header.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm: FrontMatter = serde_yaml::from_str(header)?;
        Ok((fm, remaining))
    }

    /// Parse the date field into a calendar date
    pub fn parse_date(&self) -> Result<Option<NaiveDate>, ContentError> {
        match self.date.as_deref().map(str::trim) {
            None => Ok(None),
            Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| ContentError::InvalidDate(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_header() {
        let content = r#"---
title: String Interning Pitfalls
description: Why interning everything is a memory leak with extra steps
date: 2024-03-02
image: /images/interning.png
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("String Interning Pitfalls"));
        assert_eq!(
            fm.description.as_deref(),
            Some("Why interning everything is a memory leak with extra steps")
        );
        assert_eq!(fm.image.as_deref(), Some("/images/interning.png"));
        assert_eq!(
            fm.parse_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2)
        );
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_optional_fields_absent() {
        let content = "---\ntitle: Bare\ndate: 2024-01-01\n---\nBody.\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Bare"));
        assert!(fm.description.is_none());
        assert!(fm.image.is_none());
        assert_eq!(remaining, "Body.\n");
    }

    #[test]
    fn test_missing_header_is_error() {
        let err = FrontMatter::parse("Just prose, no header.\n").unwrap_err();
        assert!(matches!(err, ContentError::MissingHeader));
    }

    #[test]
    fn test_unterminated_header_is_error() {
        let err = FrontMatter::parse("---\ntitle: Oops\n").unwrap_err();
        assert!(matches!(err, ContentError::UnterminatedHeader));
    }

    #[test]
    fn test_unknown_field_is_error() {
        let content = "---\ntitle: X\ndate: 2024-01-01\ntags: [a, b]\n---\nBody.\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, ContentError::InvalidHeader(_)));
    }

    #[test]
    fn test_invalid_date_is_error() {
        let fm = FrontMatter {
            date: Some("March 2nd, 2024".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fm.parse_date().unwrap_err(),
            ContentError::InvalidDate(_)
        ));
    }

    #[test]
    fn test_empty_header_yields_defaults() {
        let (fm, remaining) = FrontMatter::parse("---\n\n---\nBody.\n").unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, "Body.\n");
    }
}
