//! inkpress: a static site generator for personal blogs and portfolios
//!
//! This crate turns a directory of markdown content files into a static
//! site: posts and pages carry a structured front-matter header, bodies
//! render through pulldown-cmark with syntect highlighting, and every page
//! is wrapped in the embedded folio theme with its head metadata composed
//! over the site-wide defaults.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod meta;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// Site configuration file name
pub const CONFIG_FILE: &str = "site.yml";

/// The main application: a loaded site configuration plus the directory
/// layout derived from it.
#[derive(Clone)]
pub struct Inkpress {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content directory
    pub content_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Inkpress {
    /// Create a new instance from a site directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        })
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Build the static site
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Clean the public directory and cache
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post or page
    pub fn new_document(&self, title: &str, layout: Option<&str>) -> Result<()> {
        commands::new::run(self, title, layout)
    }
}
