//! Content loader - loads posts and pages from the content directory

use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{ContentError, FrontMatter, MarkdownRenderer, Page, Post};
use crate::helpers::full_url_for;
use crate::Inkpress;

/// Directory under the content dir that holds posts
const POSTS_DIR: &str = "posts";

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    ink: &'a Inkpress,
    renderer: MarkdownRenderer,
    skip_patterns: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(ink: &'a Inkpress) -> Self {
        let renderer = MarkdownRenderer::with_options(
            &ink.config.highlight.theme,
            ink.config.highlight.line_numbers,
        );

        let skip_patterns = ink
            .config
            .skip_render
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!("Ignoring invalid skip_render pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();

        Self {
            ink,
            renderer,
            skip_patterns,
        }
    }

    /// Load all posts from content/posts, sorted newest first.
    ///
    /// A malformed header, a post missing `title` or `date`, or a duplicate
    /// slug aborts the load: the build fails rather than silently dropping
    /// or mangling a document.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let posts_dir = self.ink.content_dir.join(POSTS_DIR);
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        let mut seen_slugs: HashSet<String> = HashSet::new();

        for entry in WalkDir::new(&posts_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) || self.is_skipped(path) {
                continue;
            }

            let post = self
                .load_post(path)
                .with_context(|| format!("failed to load post {:?}", path))?;

            if !seen_slugs.insert(post.slug.clone()) {
                return Err(ContentError::DuplicateSlug(post.slug.clone()))
                    .with_context(|| format!("failed to load post {:?}", path));
            }

            posts.push(post);
        }

        // Newest first; slug breaks ties so the order is stable
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let title = fm
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ContentError::MissingField("title"))?;
        let date = fm
            .parse_date()?
            .ok_or(ContentError::MissingField("date"))?;

        let source = self.relative_source(path);
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("unreadable file name"))?
            .to_string();

        let url_path = format!("{}/{}/", POSTS_DIR, slug);
        let permalink = full_url_for(&self.ink.config, &url_path);

        let content_html = self.renderer.render(body)?;

        Ok(Post {
            title,
            date,
            description: fm.description.filter(|d| !d.trim().is_empty()),
            image: fm.image.filter(|i| !i.trim().is_empty()),
            raw: body.to_string(),
            content: content_html,
            slug,
            source,
            full_source: path.to_path_buf(),
            path: url_path,
            permalink,
        })
    }

    /// Load all standalone pages (markdown files outside content/posts)
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.ink.content_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            let relative = path.strip_prefix(&self.ink.content_dir).unwrap_or(path);
            let first_component = relative
                .components()
                .next()
                .and_then(|c| c.as_os_str().to_str());

            // posts/ is handled by load_posts; _-prefixed dirs are private
            if let Some(first) = first_component {
                if first == POSTS_DIR || first.starts_with('_') {
                    continue;
                }
            }

            if !path.is_file() || !is_markdown_file(path) || self.is_skipped(path) {
                continue;
            }

            let page = self
                .load_page(path)
                .with_context(|| format!("failed to load page {:?}", path))?;
            pages.push(page);
        }

        pages.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(pages)
    }

    /// Load a single page from a file
    fn load_page(&self, path: &Path) -> Result<Page> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let source = self.relative_source(path);

        // A page may omit its title; the file stem stands in for display,
        // while the head falls back to the site default via the override.
        let title = fm
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled")
                    .to_string()
            });

        let date = fm.parse_date()?;

        let url_path = page_url_path(&source);
        let permalink = full_url_for(&self.ink.config, &url_path);

        let content_html = self.renderer.render(body)?;

        Ok(Page {
            title,
            date,
            description: fm.description.filter(|d| !d.trim().is_empty()),
            image: fm.image.filter(|i| !i.trim().is_empty()),
            raw: body.to_string(),
            content: content_html,
            source,
            full_source: path.to_path_buf(),
            path: url_path,
            permalink,
        })
    }

    /// Source path relative to the content dir
    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.ink.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Check a path against the configured skip_render globs
    fn is_skipped(&self, path: &Path) -> bool {
        let relative = path
            .strip_prefix(&self.ink.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        self.skip_patterns.iter().any(|p| p.matches(&relative))
    }
}

/// Derive a page's URL path from its relative source path.
/// `about/index.md` maps to `about/`, `contact.md` to `contact/`.
fn page_url_path(source: &str) -> String {
    let without_ext = source
        .trim_end_matches(".markdown")
        .trim_end_matches(".md");

    if without_ext == "index" {
        String::new()
    } else if let Some(parent) = without_ext.strip_suffix("/index") {
        format!("{}/", parent)
    } else {
        format!("{}/", without_ext)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site(base: &Path) -> Inkpress {
        fs::create_dir_all(base.join("content/posts")).unwrap();
        Inkpress::new(base).unwrap()
    }

    fn write_post(base: &Path, name: &str, body: &str) {
        fs::write(base.join("content/posts").join(name), body).unwrap();
    }

    #[test]
    fn test_load_posts_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let ink = site(dir.path());
        write_post(
            dir.path(),
            "older.md",
            "---\ntitle: Older\ndate: 2023-01-01\n---\nOld.\n",
        );
        write_post(
            dir.path(),
            "newer.md",
            "---\ntitle: Newer\ndate: 2024-06-01\n---\nNew.\n",
        );

        let posts = ContentLoader::new(&ink).load_posts().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].slug, "newer");
        assert_eq!(posts[1].slug, "older");
        assert_eq!(posts[0].path, "posts/newer/");
    }

    #[test]
    fn test_missing_title_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ink = site(dir.path());
        write_post(dir.path(), "bad.md", "---\ndate: 2024-01-01\n---\nBody.\n");

        let err = ContentLoader::new(&ink).load_posts().unwrap_err();
        assert!(format!("{:#}", err).contains("title"));
    }

    #[test]
    fn test_missing_date_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ink = site(dir.path());
        write_post(dir.path(), "bad.md", "---\ntitle: No Date\n---\nBody.\n");

        let err = ContentLoader::new(&ink).load_posts().unwrap_err();
        assert!(format!("{:#}", err).contains("date"));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ink = site(dir.path());
        fs::create_dir_all(dir.path().join("content/posts/nested")).unwrap();
        write_post(
            dir.path(),
            "dup.md",
            "---\ntitle: A\ndate: 2024-01-01\n---\nA.\n",
        );
        write_post(
            dir.path(),
            "nested/dup.md",
            "---\ntitle: B\ndate: 2024-01-02\n---\nB.\n",
        );

        let err = ContentLoader::new(&ink).load_posts().unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate post slug"));
    }

    #[test]
    fn test_load_pages_and_url_paths() {
        let dir = tempfile::tempdir().unwrap();
        let ink = site(dir.path());
        fs::create_dir_all(dir.path().join("content/about")).unwrap();
        fs::write(
            dir.path().join("content/about/index.md"),
            "---\ntitle: About Me\ndescription: Who writes this\n---\nHi.\n",
        )
        .unwrap();

        let pages = ContentLoader::new(&ink).load_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "About Me");
        assert_eq!(pages[0].path, "about/");
        let over = pages[0].meta_override();
        assert_eq!(over.description.as_deref(), Some("Who writes this"));
    }

    #[test]
    fn test_skip_render_glob() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content/posts")).unwrap();
        fs::write(
            dir.path().join("site.yml"),
            "skip_render:\n  - \"drafts/**\"\n",
        )
        .unwrap();
        let ink = Inkpress::new(dir.path()).unwrap();
        fs::create_dir_all(dir.path().join("content/drafts")).unwrap();
        fs::write(
            dir.path().join("content/drafts/wip.md"),
            "---\ntitle: WIP\n---\nNot yet.\n",
        )
        .unwrap();

        let pages = ContentLoader::new(&ink).load_pages().unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn test_page_url_path() {
        assert_eq!(page_url_path("about/index.md"), "about/");
        assert_eq!(page_url_path("contact.md"), "contact/");
        assert_eq!(page_url_path("index.md"), "");
    }
}
