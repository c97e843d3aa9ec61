//! Markdown rendering with syntax highlighting
//!
//! Fenced code blocks may carry an info string of the form `lang` or
//! `lang:filename`; the filename renders as a caption above the block.

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::html_escape;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

/// Language and filename hint parsed from a fence info string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CodeLabel {
    lang: Option<String>,
    filename: Option<String>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with default settings
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<CodeLabel> = None;
        let mut code_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block = Some(match kind {
                        CodeBlockKind::Fenced(info) => parse_fence_info(&info),
                        CodeBlockKind::Indented => CodeLabel::default(),
                    });
                    code_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(label) = code_block.take() {
                        let highlighted = self.highlight_code(&code_content, &label);
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    code_content.push_str(&text);
                }
                other => {
                    if code_block.is_none() {
                        events.push(other);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block and wrap it with its optional filename caption
    fn highlight_code(&self, code: &str, label: &CodeLabel) -> String {
        let lang = label.lang.as_deref().unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .unwrap_or_else(|| {
                self.theme_set
                    .themes
                    .values()
                    .next()
                    .expect("no syntect themes available")
            });

        let body = match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Ok(highlighted) => highlighted,
            Err(_) => {
                // Fallback to a plain code block
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    lang,
                    html_escape(code)
                )
            }
        };

        let caption = label
            .filename
            .as_deref()
            .map(|name| {
                format!(
                    r#"<figcaption class="code-filename">{}</figcaption>"#,
                    html_escape(name)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<figure class="code-block code-{}">{}{}</figure>"#,
            lang, caption, body
        )
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();
        let line_count = lines.len();

        let mut gutter = String::new();
        let mut code_lines = String::new();

        for (i, line) in lines.iter().enumerate() {
            gutter.push_str(&format!(r#"<span class="line-number">{}</span>"#, i + 1));
            code_lines.push_str(line);
            if i < line_count - 1 {
                gutter.push('\n');
                code_lines.push('\n');
            }
        }

        format!(
            r#"<div class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></div>"#,
            lang, gutter, code_lines
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a fence info string into language and filename hint
fn parse_fence_info(info: &str) -> CodeLabel {
    let info = info.trim();
    if info.is_empty() {
        return CodeLabel::default();
    }

    match info.split_once(':') {
        Some((lang, filename)) => CodeLabel {
            lang: non_empty(lang),
            filename: non_empty(filename),
        },
        None => CodeLabel {
            lang: non_empty(info),
            filename: None,
        },
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
