//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::Inkpress;

/// List site content by type
pub fn run(ink: &Inkpress, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(ink);

    match content_type {
        "post" | "posts" => {
            let posts = loader.load_posts()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source
                );
            }
        }
        "page" | "pages" => {
            let pages = loader.load_pages()?;
            println!("Pages ({}):", pages.len());
            for page in pages {
                println!("  {} [{}]", page.title, page.source);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, page", content_type);
        }
    }

    Ok(())
}
