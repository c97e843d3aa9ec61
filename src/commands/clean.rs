//! Clean the public directory and cache

use anyhow::Result;
use std::fs;

use crate::Inkpress;

/// Remove the generated output and the freshness cache
pub fn run(ink: &Inkpress) -> Result<()> {
    if ink.public_dir.exists() {
        fs::remove_dir_all(&ink.public_dir)?;
        tracing::info!("Deleted: {:?}", ink.public_dir);
    }

    let cache_dir = ink.base_dir.join(".inkpress-cache");
    if cache_dir.exists() {
        fs::remove_dir_all(&cache_dir)?;
        tracing::info!("Deleted: {:?}", cache_dir);
    }

    Ok(())
}
