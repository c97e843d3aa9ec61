//! Create a new post or page

use anyhow::Result;
use std::fs;

use crate::Inkpress;

/// Create a new post or page from its scaffold
pub fn create_document(ink: &Inkpress, title: &str, layout: &str, path: Option<&str>) -> Result<()> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);

    let (target_dir, filename) = match layout {
        "page" => (ink.content_dir.join(&slug), "index.md".to_string()),
        "post" => {
            let filename = if let Some(p) = path {
                format!("{}.md", p)
            } else {
                ink.config
                    .new_post_name
                    .replace(":title", &slug)
                    .replace(":year", &now.format("%Y").to_string())
                    .replace(":month", &now.format("%m").to_string())
                    .replace(":day", &now.format("%d").to_string())
            };
            (ink.content_dir.join("posts"), filename)
        }
        other => anyhow::bail!("Unknown layout: {}. Available: post, page", other),
    };

    fs::create_dir_all(&target_dir)?;
    let file_path = target_dir.join(&filename);

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = ink.base_dir.join("scaffolds").join(format!("{}.md", layout));
    let scaffold_content = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
    } else {
        "---\ntitle: {{ title }}\ndate: {{ date }}\n---\n".to_string()
    };

    let content = scaffold_content
        .replace("{{ title }}", title)
        .replace("{{ date }}", &now.format("%Y-%m-%d").to_string());

    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(())
}

/// Run the new command
pub fn run(ink: &Inkpress, title: &str, layout: Option<&str>) -> Result<()> {
    create_document(ink, title, layout.unwrap_or("post"), None)
}
