//! Built-in folio theme templates using the Tera template engine
//!
//! All templates are embedded directly in the binary; the shared layout
//! wraps every page's content in the site chrome (header, nav, footer)
//! and injects the pre-composed head tags.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::helpers;

/// Theme stylesheet, written to `css/folio.css` in the output directory
const THEME_CSS: &str = include_str!("folio/folio.css");

/// Template renderer with the embedded folio theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all folio templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // The generator produces HTML fragments (post bodies, head tags);
        // autoescaping would double-escape them
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("index.html", include_str!("folio/index.html")),
            ("post.html", include_str!("folio/post.html")),
            ("page.html", include_str!("folio/page.html")),
            ("archive.html", include_str!("folio/archive.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("folio/partials/head.html"),
            ),
            ("partials/nav.html", include_str!("folio/partials/nav.html")),
            (
                "partials/footer.html",
                include_str!("folio/partials/footer.html"),
            ),
            (
                "partials/pager.html",
                include_str!("folio/partials/pager.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("display_date", display_date_filter);

        Ok(Self { tera })
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Write theme assets (stylesheet) into the output directory
    pub fn write_assets(&self, public_dir: &Path) -> Result<()> {
        let css_dir = public_dir.join("css");
        fs::create_dir_all(&css_dir)?;
        fs::write(css_dir.join("folio.css"), THEME_CSS)?;
        Ok(())
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(helpers::truncate(
        &s,
        length,
        Some(&omission),
    )))
}

/// Tera filter: render an ISO date as "March 2, 2024"
fn display_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("display_date", "value", String, value);

    match chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        Ok(date) => Ok(tera::Value::String(
            date.format("%B %-d, %Y").to_string(),
        )),
        // Not a date; show as-is
        Err(_) => Ok(tera::Value::String(s)),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub posts: Vec<PostData>,
    pub pages: Vec<PageData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub date: String,
    pub path: String,
    pub permalink: String,
    pub description: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub date: String,
    pub path: String,
    pub permalink: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total: usize,
    pub current: usize,
    pub current_url: String,
    pub prev_link: String,
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveYearData {
    pub year: i32,
    pub posts: Vec<PostData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub root: String,
    pub language: String,
    pub archive_dir: String,
    pub per_page: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_context() -> Context {
        let mut context = Context::new();
        context.insert(
            "config",
            &ConfigData {
                title: "Site".to_string(),
                description: "Desc".to_string(),
                author: "Jo".to_string(),
                url: "https://example.com".to_string(),
                root: "/".to_string(),
                language: "en".to_string(),
                archive_dir: "archive".to_string(),
                per_page: 10,
            },
        );
        context.insert("nav_items", &Vec::<NavItem>::new());
        context.insert("current_year", "2024");
        context.insert("head_tags", "<title>Site</title>");
        context
    }

    #[test]
    fn test_layout_preserves_content() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();

        let content = "<p>sentinel <em>content</em> tree &clubs;</p>";
        context.insert("page_title", "About Me");
        context.insert("page_date", "");
        context.insert("page_content", content);

        let html = renderer.render("page.html", &context).unwrap();
        // The chrome must wrap the content without mutating or dropping it
        assert!(html.contains(content));
        assert!(html.contains(r#"<header class="site-header">"#));
        assert!(html.contains(r#"<footer class="site-footer">"#));
    }

    #[test]
    fn test_layout_injects_head_tags() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert("head_tags", "<title>About - Site</title>");
        context.insert("page_title", "About");
        context.insert("page_date", "");
        context.insert("page_content", "<p>hi</p>");

        let html = renderer.render("page.html", &context).unwrap();
        assert!(html.contains("<title>About - Site</title>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert("page_title", "About");
        context.insert("page_date", "2024-03-02");
        context.insert("page_content", "<p>hi</p>");

        let first = renderer.render("page.html", &context).unwrap();
        let second = renderer.render("page.html", &context).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_index_lists_posts() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert(
            "page_posts",
            &vec![PostData {
                title: "Hello".to_string(),
                date: "2024-03-02".to_string(),
                path: "/posts/hello/".to_string(),
                permalink: "https://example.com/posts/hello/".to_string(),
                description: "A greeting".to_string(),
                content: "<p>Hello there.</p>".to_string(),
            }],
        );
        context.insert(
            "pagination",
            &PaginationData {
                per_page: 10,
                total: 1,
                current: 1,
                current_url: "/".to_string(),
                prev_link: String::new(),
                next_link: String::new(),
            },
        );

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains(r#"<a href="/posts/hello/">Hello</a>"#));
        assert!(html.contains("A greeting"));
        assert!(html.contains("March 2, 2024"));
        // single page of posts renders no pagination chrome
        assert!(!html.contains("pagination-prev"));
    }

    #[test]
    fn test_display_date_filter_passthrough() {
        let value = tera::Value::String("not a date".to_string());
        let out = display_date_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(out, tera::Value::String("not a date".to_string()));
    }
}
