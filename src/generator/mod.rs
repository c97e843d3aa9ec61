//! Generator module - renders the site with the embedded folio theme
//!
//! Each page render is an independent computation from (content, metadata
//! override, site defaults) to chrome-wrapped markup plus head tags; no
//! mutable state is shared across renders.

use anyhow::{Context as _, Result};
use chrono::Datelike;
use std::collections::BTreeMap;
use std::fs;
use tera::Context;
use walkdir::WalkDir;

use crate::content::{Page, Post};
use crate::helpers::{encode_url, url_for};
use crate::meta::{MetaOverride, SiteDefaults};
use crate::templates::{
    ArchiveYearData, ConfigData, NavItem, NavPost, PageData, PaginationData, PostData, SiteData,
    TemplateRenderer,
};
use crate::Inkpress;

/// Static site generator using the embedded folio theme
pub struct Generator {
    ink: Inkpress,
    renderer: TemplateRenderer,
    defaults: SiteDefaults,
}

impl Generator {
    /// Create a new generator
    pub fn new(ink: &Inkpress) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let defaults = ink.config.site_defaults();

        Ok(Self {
            ink: ink.clone(),
            renderer,
            defaults,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[Post], pages: &[Page]) -> Result<()> {
        fs::create_dir_all(&self.ink.public_dir)?;

        self.renderer.write_assets(&self.ink.public_dir)?;
        self.copy_content_assets()?;

        let site_data = self.build_site_data(posts, pages);
        let config_data = self.build_config_data();
        let nav_items = self.build_nav(pages);

        self.generate_index_pages(posts, &site_data, &config_data, &nav_items)?;
        self.generate_post_pages(posts, &site_data, &config_data, &nav_items)?;
        self.generate_page_pages(pages, &site_data, &config_data, &nav_items)?;
        self.generate_archive_page(posts, &site_data, &config_data, &nav_items)?;
        self.generate_atom_feed(posts)?;

        Ok(())
    }

    /// Build site data for templates
    fn build_site_data(&self, posts: &[Post], pages: &[Page]) -> SiteData {
        SiteData {
            posts: posts.iter().map(|p| self.post_data(p)).collect(),
            pages: pages.iter().map(|p| self.page_data(p)).collect(),
        }
    }

    fn post_data(&self, post: &Post) -> PostData {
        PostData {
            title: post.title.clone(),
            date: post.date.format("%Y-%m-%d").to_string(),
            path: url_for(&self.ink.config, &post.path),
            permalink: post.permalink.clone(),
            description: post.description.clone().unwrap_or_default(),
            content: post.content.clone(),
        }
    }

    fn page_data(&self, page: &Page) -> PageData {
        PageData {
            title: page.title.clone(),
            date: page
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            path: url_for(&self.ink.config, &page.path),
            permalink: page.permalink.clone(),
            content: page.content.clone(),
        }
    }

    /// Build config data for templates
    fn build_config_data(&self) -> ConfigData {
        let config = &self.ink.config;
        ConfigData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
            language: config.language.clone(),
            archive_dir: config.archive_dir.clone(),
            per_page: config.per_page,
        }
    }

    /// Navigation: every standalone page plus the archive listing
    fn build_nav(&self, pages: &[Page]) -> Vec<NavItem> {
        let mut items: Vec<NavItem> = pages
            .iter()
            .filter(|p| !p.path.is_empty())
            .map(|p| NavItem {
                name: p.title.clone(),
                path: url_for(&self.ink.config, &p.path),
            })
            .collect();

        items.sort_by(|a, b| a.name.cmp(&b.name));

        items.push(NavItem {
            name: "Archive".to_string(),
            path: url_for(&self.ink.config, &format!("{}/", self.ink.config.archive_dir)),
        });

        items
    }

    /// Create a base context with the variables every template expects
    fn create_base_context(
        &self,
        site_data: &SiteData,
        config_data: &ConfigData,
        nav_items: &[NavItem],
    ) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("config", config_data);
        context.insert("nav_items", nav_items);
        context.insert(
            "current_year",
            &chrono::Local::now().format("%Y").to_string(),
        );
        context
    }

    /// Write rendered HTML under the public dir, creating parents as needed
    fn write_output(&self, relative: &str, html: &str) -> Result<()> {
        let output_path = self.ink.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, html)
            .with_context(|| format!("failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Generate index pages with pagination. The index carries no metadata
    /// override, so the site defaults apply unchanged.
    fn generate_index_pages(
        &self,
        posts: &[Post],
        site_data: &SiteData,
        config_data: &ConfigData,
        nav_items: &[NavItem],
    ) -> Result<()> {
        let per_page = self.ink.config.per_page.max(1);
        let total_pages = posts.len().div_ceil(per_page).max(1);
        let pagination_dir = &self.ink.config.pagination_dir;

        let head_tags = MetaOverride::default().merge_over(&self.defaults).head_tags();

        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(posts.len());
            let page_posts: Vec<PostData> =
                posts[start..end].iter().map(|p| self.post_data(p)).collect();

            let page_url = |n: usize| -> String {
                if n == 1 {
                    url_for(&self.ink.config, "")
                } else {
                    url_for(&self.ink.config, &format!("{}/{}/", pagination_dir, n))
                }
            };

            let pagination = PaginationData {
                per_page,
                total: total_pages,
                current: page_num,
                current_url: page_url(page_num),
                prev_link: if page_num > 1 {
                    page_url(page_num - 1)
                } else {
                    String::new()
                },
                next_link: if page_num < total_pages {
                    page_url(page_num + 1)
                } else {
                    String::new()
                },
            };

            let mut context = self.create_base_context(site_data, config_data, nav_items);
            context.insert("head_tags", &head_tags);
            context.insert("page_posts", &page_posts);
            context.insert("pagination", &pagination);

            let html = self.renderer.render("index.html", &context)?;

            let relative = if page_num == 1 {
                "index.html".to_string()
            } else {
                format!("{}/{}/index.html", pagination_dir, page_num)
            };
            self.write_output(&relative, &html)?;
        }

        Ok(())
    }

    /// Generate one page per post, with prev/next navigation
    fn generate_post_pages(
        &self,
        posts: &[Post],
        site_data: &SiteData,
        config_data: &ConfigData,
        nav_items: &[NavItem],
    ) -> Result<()> {
        for (i, post) in posts.iter().enumerate() {
            // posts are ordered newest first: "previous" is the older one
            let prev_post = posts.get(i + 1).map(|p| NavPost {
                title: p.title.clone(),
                path: url_for(&self.ink.config, &p.path),
            });
            let next_post = (i > 0).then(|| NavPost {
                title: posts[i - 1].title.clone(),
                path: url_for(&self.ink.config, &posts[i - 1].path),
            });

            let head_tags = post.meta_override().merge_over(&self.defaults).head_tags();

            let mut context = self.create_base_context(site_data, config_data, nav_items);
            context.insert("head_tags", &head_tags);
            context.insert("page_title", &post.title);
            context.insert("page_date", &post.date.format("%Y-%m-%d").to_string());
            context.insert("page_content", &post.content);
            if let Some(ref prev) = prev_post {
                context.insert("prev_post", prev);
            }
            if let Some(ref next) = next_post {
                context.insert("next_post", next);
            }

            let html = self.renderer.render("post.html", &context)?;
            self.write_output(&format!("{}index.html", post.path), &html)?;
        }

        Ok(())
    }

    /// Generate standalone pages
    fn generate_page_pages(
        &self,
        pages: &[Page],
        site_data: &SiteData,
        config_data: &ConfigData,
        nav_items: &[NavItem],
    ) -> Result<()> {
        for page in pages {
            if page.path.is_empty() {
                // the root index belongs to the post listing
                tracing::warn!(
                    "Skipping {:?}: the site root is generated from the post list",
                    page.source
                );
                continue;
            }

            let head_tags = page.meta_override().merge_over(&self.defaults).head_tags();

            let mut context = self.create_base_context(site_data, config_data, nav_items);
            context.insert("head_tags", &head_tags);
            context.insert("page_title", &page.title);
            context.insert(
                "page_date",
                &page
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            );
            context.insert("page_content", &page.content);

            let html = self.renderer.render("page.html", &context)?;
            self.write_output(&format!("{}index.html", page.path), &html)?;
        }

        Ok(())
    }

    /// Generate the archive page, posts grouped by year, newest year first
    fn generate_archive_page(
        &self,
        posts: &[Post],
        site_data: &SiteData,
        config_data: &ConfigData,
        nav_items: &[NavItem],
    ) -> Result<()> {
        let mut years_map: BTreeMap<i32, Vec<PostData>> = BTreeMap::new();
        for post in posts {
            years_map
                .entry(post.date.year())
                .or_default()
                .push(self.post_data(post));
        }

        let archive_years: Vec<ArchiveYearData> = years_map
            .into_iter()
            .rev()
            .map(|(year, posts)| ArchiveYearData { year, posts })
            .collect();

        let head_tags = MetaOverride {
            title: Some(format!("Archive - {}", self.ink.config.title)),
            ..Default::default()
        }
        .merge_over(&self.defaults)
        .head_tags();

        let mut context = self.create_base_context(site_data, config_data, nav_items);
        context.insert("head_tags", &head_tags);
        context.insert("archive_years", &archive_years);

        let html = self.renderer.render("archive.html", &context)?;
        self.write_output(
            &format!("{}/index.html", self.ink.config.archive_dir),
            &html,
        )?;
        tracing::info!("Generated archive page");

        Ok(())
    }

    /// Generate the Atom feed. The feed timestamp is the newest post's date,
    /// so identical content produces an identical feed.
    fn generate_atom_feed(&self, posts: &[Post]) -> Result<()> {
        let config = &self.ink.config;
        let base_url = config.url.trim_end_matches('/');

        let updated = posts
            .first()
            .map(|p| format!("{}T00:00:00Z", p.date.format("%Y-%m-%d")))
            .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string());

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!(
            "  <link href=\"{}/atom.xml\" rel=\"self\"/>\n",
            base_url
        ));
        feed.push_str(&format!("  <link href=\"{}/\"/>\n", base_url));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}/</id>\n", base_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for post in posts.iter().take(20) {
            let href = format!("{}{}", base_url, encode_url(&url_for(config, &post.path)));
            let date = format!("{}T00:00:00Z", post.date.format("%Y-%m-%d"));

            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", href));
            feed.push_str(&format!("    <id>{}</id>\n", href));
            feed.push_str(&format!("    <published>{}</published>\n", date));
            feed.push_str(&format!("    <updated>{}</updated>\n", date));

            if let Some(ref description) = post.description {
                feed.push_str(&format!(
                    "    <summary>{}</summary>\n",
                    escape_xml(description)
                ));
            }

            let content = absolutize_urls(&post.content, base_url);
            let content = strip_invalid_xml_chars(&content);
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                content
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        self.write_output("atom.xml", &feed)?;
        tracing::info!("Generated atom.xml");

        Ok(())
    }

    /// Copy content assets (images, etc.) to the public directory
    fn copy_content_assets(&self) -> Result<()> {
        let content_dir = &self.ink.content_dir;
        if !content_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            // Markdown files are rendered, not copied
            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("md") | Some("markdown")) {
                continue;
            }

            let relative = path.strip_prefix(content_dir)?;

            // _-prefixed directories are private to the author
            if relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('_'))
            {
                continue;
            }

            let dest = self.ink.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Convert root-relative hrefs and srcs in HTML content to absolute URLs
fn absolutize_urls(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip control characters XML 1.0 does not allow
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
        })
        .collect()
}
