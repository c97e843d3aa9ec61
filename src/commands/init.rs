//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Inkpress;

/// Default site configuration written by `inkpress init`
const DEFAULT_CONFIG: &str = r#"# Site
title: My Site
description: A personal blog
author: Anonymous
language: en

# URL
url: https://example.com
root: /

# Metadata defaults
# Social-preview image used when a page supplies none
default_image: ""

# Directory
content_dir: content
public_dir: public
archive_dir: archive
pagination_dir: page
skip_render: []

# Writing
new_post_name: ":title.md"

# Code highlighting
highlight:
  theme: base16-ocean.dark
  line_numbers: false

# Pagination
per_page: 10
"#;

const POST_SCAFFOLD: &str = r#"---
title: {{ title }}
date: {{ date }}
description:
image:
---
"#;

const PAGE_SCAFFOLD: &str = r#"---
title: {{ title }}
description:
---
"#;

const ABOUT_PAGE: &str = r#"---
title: About
description: Who writes this site and why
---

Hi, I write here about the software I build and the things it breaks.

Elsewhere: [sourcehut](https://example.com), [fediverse](https://example.com).
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("content/about"))?;
    fs::create_dir_all(target_dir.join("scaffolds"))?;

    fs::write(target_dir.join("site.yml"), DEFAULT_CONFIG)?;
    fs::write(target_dir.join("scaffolds/post.md"), POST_SCAFFOLD)?;
    fs::write(target_dir.join("scaffolds/page.md"), PAGE_SCAFFOLD)?;
    fs::write(target_dir.join("content/about/index.md"), ABOUT_PAGE)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
description: A first post to check everything renders
---

Welcome to your new site. This post exists so the first build has
something to show; replace it with your own writing.

Code blocks can carry a language and a filename hint:

```rust:main.rs
fn main() {{
    println!("hello");
}}
```

Run `inkpress build` to generate the site into `public/`, or
`inkpress server` to preview it with live reload.
"#,
        now.format("%Y-%m-%d")
    );

    fs::write(
        target_dir.join("content/posts/hello-world.md"),
        sample_post,
    )?;

    Ok(())
}

/// Run the init command with an existing Inkpress instance
pub fn run(ink: &Inkpress) -> Result<()> {
    init_site(&ink.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::loader::ContentLoader;

    #[test]
    fn test_init_scaffolds_a_loadable_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("site.yml").exists());
        assert!(dir.path().join("scaffolds/post.md").exists());

        let ink = Inkpress::new(dir.path()).unwrap();
        let loader = ContentLoader::new(&ink);

        let posts = loader.load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "hello-world");

        let pages = loader.load_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "About");
    }
}
