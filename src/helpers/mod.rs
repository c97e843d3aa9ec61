//! Shared helper functions for URL and HTML generation

mod html;
mod url;

pub use html::*;
pub use url::*;
