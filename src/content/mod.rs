//! Content module - handles posts, pages, and content processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

use thiserror::Error;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::{Page, Post};

/// Errors raised while loading content files. Every variant aborts the
/// build; the renderer never sees an invalid document.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("missing front-matter header (expected a leading `---` block)")]
    MissingHeader,

    #[error("unterminated front-matter header (no closing `---`)")]
    UnterminatedHeader,

    #[error("invalid front-matter: {0}")]
    InvalidHeader(#[from] serde_yaml::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid date `{0}`, expected an ISO date (YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("duplicate post slug `{0}`")]
    DuplicateSlug(String),
}
