//! Build the static site

use anyhow::Result;
use notify::Watcher;
use std::collections::HashMap;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::cache::{self, CacheDb};
use crate::content::loader::ContentLoader;
use crate::generator::Generator;
use crate::Inkpress;

/// Build the site, skipping generation when nothing changed
pub fn run(ink: &Inkpress) -> Result<()> {
    run_with_options(ink, false)
}

/// Build with a force option that ignores the freshness cache
pub fn run_with_options(ink: &Inkpress, force: bool) -> Result<()> {
    let start = std::time::Instant::now();

    let loader = ContentLoader::new(ink);
    let posts = loader.load_posts()?;
    let pages = loader.load_pages()?;

    tracing::info!("Loaded {} posts and {} pages", posts.len(), pages.len());

    let config_hash = cache::config_fingerprint(&ink.base_dir.join(crate::CONFIG_FILE));
    let mut documents: HashMap<String, u64> = HashMap::new();
    for post in &posts {
        documents.insert(post.source.clone(), cache::hash_content(&post.raw));
    }
    for page in &pages {
        documents.insert(page.source.clone(), cache::hash_content(&page.raw));
    }

    let db = CacheDb::load(&ink.base_dir);
    let output_exists = ink.public_dir.join("index.html").exists();

    if !force && output_exists && db.is_fresh(config_hash, &documents) {
        tracing::info!(
            "No changes detected, skipping generation ({:.2}s)",
            start.elapsed().as_secs_f64()
        );
        return Ok(());
    }

    let generator = Generator::new(ink)?;
    generator.generate(&posts, &pages)?;

    CacheDb::snapshot(config_hash, documents).save(&ink.base_dir)?;

    tracing::info!("Generated in {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

/// Watch for file changes and rebuild
pub async fn watch(ink: &Inkpress) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    if ink.content_dir.exists() {
        watcher.watch(ink.content_dir.as_ref(), notify::RecursiveMode::Recursive)?;
    }

    let config_path = ink.base_dir.join(crate::CONFIG_FILE);
    if config_path.exists() {
        watcher.watch(config_path.as_ref(), notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                // Debounce bursts of events from a single save
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, regenerating...");
                    if let Err(e) = run(ink) {
                        tracing::error!("Generation failed: {:#}", e);
                    }
                    last_rebuild = std::time::Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}
