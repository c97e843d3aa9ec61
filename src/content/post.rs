//! Post and Page models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::meta::MetaOverride;

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    /// Short summary, also used for the description head tag
    pub description: Option<String>,

    /// Social-preview image path
    pub image: Option<String>,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Slug, unique across all posts (derived from the file stem)
    pub slug: String,

    /// Source file path (relative to the content dir)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// URL path (without root)
    pub path: String,

    /// Full permalink URL
    pub permalink: String,
}

impl Post {
    /// The metadata this post contributes to its rendered page
    pub fn meta_override(&self) -> MetaOverride {
        MetaOverride {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            image: self.image.clone(),
        }
    }
}

/// A standalone page (About, Projects, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page title
    pub title: String,

    /// Optional creation date
    pub date: Option<NaiveDate>,

    /// Short summary, also used for the description head tag
    pub description: Option<String>,

    /// Social-preview image path
    pub image: Option<String>,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Source file path (relative to the content dir)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// URL path (without root)
    pub path: String,

    /// Full permalink URL
    pub permalink: String,
}

impl Page {
    /// The metadata this page contributes to its rendered page
    pub fn meta_override(&self) -> MetaOverride {
        MetaOverride {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            image: self.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_meta_override() {
        let post = Post {
            title: "Async Context Tracing".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            description: Some("Following a request across await points".to_string()),
            image: None,
            raw: String::new(),
            content: String::new(),
            slug: "async-context-tracing".to_string(),
            source: "posts/async-context-tracing.md".to_string(),
            full_source: PathBuf::new(),
            path: "posts/async-context-tracing/".to_string(),
            permalink: String::new(),
        };

        let over = post.meta_override();
        assert_eq!(over.title.as_deref(), Some("Async Context Tracing"));
        assert_eq!(
            over.description.as_deref(),
            Some("Following a request across await points")
        );
        assert!(over.image.is_none());
    }
}
