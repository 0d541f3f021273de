//! Markdown rendering: heading anchors, TOC extraction, link rewriting,
//! diagram placeholders and syntax highlighting in one event pass, followed
//! by sanitization.

use std::collections::HashMap;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::SiteConfig;
use crate::render::{sanitize, urls};

/// One table-of-contents entry, valid for a single rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    /// Heading level, 2 or 3
    pub level: u8,
}

/// Result of rendering one markdown document
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Markdown document renderer
pub struct DocumentRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    highlight_enabled: bool,
    highlight_theme: String,
    site_url: String,
    root: String,
}

impl DocumentRenderer {
    /// Create a renderer for a site
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            highlight_enabled: config.highlight.enable,
            highlight_theme: config.highlight.theme.clone(),
            site_url: config.url.clone(),
            root: config.root.clone(),
        }
    }

    /// Render one document. `source` is the markdown path relative to the
    /// site base; relative links and images inside the document are resolved
    /// against its directory.
    pub fn render(&self, source: &str, markdown: &str) -> RenderedDocument {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let events = self.rewrite_events(source, parser);
        let (events, toc) = assign_heading_ids(events);

        let mut raw_html = String::new();
        html::push_html(&mut raw_html, events.into_iter());

        RenderedDocument {
            html: sanitize::clean(&raw_html),
            toc,
        }
    }

    /// First pass: code blocks (highlight / mermaid placeholder), image and
    /// link rewriting.
    fn rewrite_events<'a>(
        &self,
        source: &str,
        parser: Parser<'a>,
    ) -> Vec<Event<'a>> {
        let mut events: Vec<Event<'a>> = Vec::new();
        // (language, buffered source) while inside a fenced block
        let mut code: Option<(Option<String>, String)> = None;
        // (src, title, buffered alt text) while inside an image
        let mut image: Option<(String, String, String)> = None;
        let mut external_link = false;

        for event in parser {
            if let Some((_, _, alt)) = image.as_mut() {
                match event {
                    Event::End(TagEnd::Image) => {
                        let (src, title, alt) = image.take().unwrap_or_default();
                        events.push(Event::Html(image_html(&src, &title, &alt).into()));
                    }
                    Event::Text(text) | Event::Code(text) => alt.push_str(&text),
                    Event::SoftBreak | Event::HardBreak => alt.push(' '),
                    _ => {}
                }
                continue;
            }

            if let Some((lang, buffer)) = code.as_mut() {
                match event {
                    Event::Text(text) => buffer.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        let html = self.code_block_html(lang.as_deref(), buffer);
                        events.push(Event::Html(html.into()));
                        code = None;
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .filter(|l| !l.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }

                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    let src = self.rewrite_target(source, &dest_url);
                    image = Some((src, title.to_string(), String::new()));
                }

                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let href = self.rewrite_target(source, &dest_url);
                    if urls::is_cross_origin(&href, &self.site_url) {
                        external_link = true;
                        events.push(Event::Html(external_anchor(&href, &title).into()));
                    } else {
                        events.push(Event::Start(Tag::Link {
                            link_type,
                            dest_url: CowStr::from(href),
                            title,
                            id,
                        }));
                    }
                }
                Event::End(TagEnd::Link) if external_link => {
                    external_link = false;
                    events.push(Event::Html("</a>".into()));
                }

                other => events.push(other),
            }
        }

        events
    }

    /// Resolve a link/image target against the document's directory; absolute
    /// schemes, anchors and protocol-relative values pass through, as do
    /// values that fail to resolve.
    fn rewrite_target(&self, source: &str, value: &str) -> String {
        if urls::is_external_ref(value) {
            return value.to_string();
        }
        urls::resolve_relative(&self.root, source, value).unwrap_or_else(|| value.to_string())
    }

    fn code_block_html(&self, lang: Option<&str>, code: &str) -> String {
        if lang == Some("mermaid") {
            return format!("<div class=\"mermaid\">{}</div>", html_escape(code));
        }

        if self.highlight_enabled {
            if let Some(highlighted) = self.highlight_code(code, lang) {
                return highlighted;
            }
        }

        match lang {
            Some(lang) => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                html_escape(lang),
                html_escape(code)
            ),
            None => format!("<pre><code>{}</code></pre>", html_escape(code)),
        }
    }

    fn highlight_code(&self, code: &str, lang: Option<&str>) -> Option<String> {
        let lang = lang?;
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))?;
        let theme = self
            .theme_set
            .themes
            .get(&self.highlight_theme)
            .or_else(|| self.theme_set.themes.values().next())?;

        highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
    }
}

/// Second pass: assign slug ids to h2/h3 headings and collect the TOC.
fn assign_heading_ids(events: Vec<Event<'_>>) -> (Vec<Event<'_>>, Vec<TocEntry>) {
    let mut out = Vec::with_capacity(events.len());
    let mut toc = Vec::new();
    let mut slugger = Slugger::default();

    let mut iter = events.into_iter();
    while let Some(event) = iter.next() {
        let (level, classes, attrs) = match event {
            Event::Start(Tag::Heading {
                level,
                classes,
                attrs,
                ..
            }) => (level, classes, attrs),
            other => {
                out.push(other);
                continue;
            }
        };

        if !matches!(level, HeadingLevel::H2 | HeadingLevel::H3) {
            out.push(Event::Start(Tag::Heading {
                level,
                id: None,
                classes,
                attrs,
            }));
            continue;
        }

        let mut inner = Vec::new();
        let mut text = String::new();
        for ev in iter.by_ref() {
            match &ev {
                Event::End(TagEnd::Heading(l)) if *l == level => break,
                Event::Text(t) | Event::Code(t) => {
                    text.push_str(t);
                    inner.push(ev);
                }
                Event::SoftBreak | Event::HardBreak => {
                    text.push(' ');
                    inner.push(ev);
                }
                _ => inner.push(ev),
            }
        }

        let text = text.trim().to_string();
        let id = slugger.slug(&text);
        toc.push(TocEntry {
            id: id.clone(),
            text,
            level: if level == HeadingLevel::H2 { 2 } else { 3 },
        });

        out.push(Event::Start(Tag::Heading {
            level,
            id: Some(CowStr::from(id)),
            classes,
            attrs,
        }));
        out.extend(inner);
        out.push(Event::End(TagEnd::Heading(level)));
    }

    (out, toc)
}

/// Per-document slug generator with collision suffixes (`intro`, `intro-2`)
#[derive(Default)]
struct Slugger {
    counts: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.counts.entry(base.clone()).or_insert(0);
        *count += 1;
        let n = *count;
        if n == 1 {
            base
        } else {
            format!("{}-{}", base, n)
        }
    }
}

/// Lowercase, keep letters/digits, whitespace runs become single hyphens,
/// everything else is stripped; empty results fall back to `section`.
fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    if out.is_empty() {
        "section".to_string()
    } else {
        out
    }
}

fn image_html(src: &str, title: &str, alt: &str) -> String {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(" title=\"{}\"", html_escape(title))
    };
    format!(
        "<img src=\"{}\" alt=\"{}\"{} loading=\"lazy\" decoding=\"async\">",
        html_escape(src),
        html_escape(alt),
        title_attr
    )
}

fn external_anchor(href: &str, title: &str) -> String {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(" title=\"{}\"", html_escape(title))
    };
    format!(
        "<a href=\"{}\"{} target=\"_blank\" rel=\"noopener noreferrer\">",
        html_escape(href),
        title_attr
    )
}

/// Simple HTML escaping
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> DocumentRenderer {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        DocumentRenderer::new(&config)
    }

    #[test]
    fn test_heading_ids_and_toc() {
        let doc = renderer().render(
            "docs/a.md",
            "## Getting Started\n\nText.\n\n### Deep Dive\n\nMore.",
        );
        assert!(doc.html.contains("<h2 id=\"getting-started\">"));
        assert!(doc.html.contains("<h3 id=\"deep-dive\">"));
        assert_eq!(
            doc.toc,
            vec![
                TocEntry {
                    id: "getting-started".to_string(),
                    text: "Getting Started".to_string(),
                    level: 2
                },
                TocEntry {
                    id: "deep-dive".to_string(),
                    text: "Deep Dive".to_string(),
                    level: 3
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_headings_get_suffixes() {
        let doc = renderer().render("a.md", "## Intro\n\n## Intro\n\n## Intro");
        let ids: Vec<_> = doc.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "intro-2", "intro-3"]);
    }

    #[test]
    fn test_h1_and_h4_excluded_from_toc() {
        let doc = renderer().render("a.md", "# Title\n\n## Section\n\n#### Minor");
        assert_eq!(doc.toc.len(), 1);
        assert_eq!(doc.toc[0].id, "section");
        assert_eq!(doc.toc[0].level, 2);
    }

    #[test]
    fn test_unicode_heading_slug() {
        let doc = renderer().render("a.md", "## 模型 评估!");
        assert_eq!(doc.toc[0].id, "模型-评估");
    }

    #[test]
    fn test_symbol_only_heading_falls_back() {
        let doc = renderer().render("a.md", "## ???\n\n## !!!");
        let ids: Vec<_> = doc.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["section", "section-2"]);
    }

    #[test]
    fn test_relative_image_rewritten_with_lazy_attrs() {
        let doc = renderer().render("docs/a.md", "![diagram](img/x.png)");
        assert!(doc.html.contains("src=\"/docs/img/x.png\""));
        assert!(doc.html.contains("alt=\"diagram\""));
        assert!(doc.html.contains("loading=\"lazy\""));
        assert!(doc.html.contains("decoding=\"async\""));
    }

    #[test]
    fn test_absolute_and_anchor_refs_untouched() {
        let doc = renderer().render(
            "docs/a.md",
            "![x](https://cdn.example.com/x.png)\n\n[jump](#section)",
        );
        assert!(doc.html.contains("src=\"https://cdn.example.com/x.png\""));
        assert!(doc.html.contains("href=\"#section\""));
    }

    #[test]
    fn test_relative_link_rewritten() {
        let doc = renderer().render("docs/a.md", "[other](../notes/b.md)");
        assert!(doc.html.contains("href=\"/notes/b.md\""));
    }

    #[test]
    fn test_cross_origin_link_opens_new_context() {
        let doc = renderer().render("a.md", "[ext](https://other.com/page)");
        assert!(doc.html.contains("target=\"_blank\""));
        assert!(doc.html.contains("rel=\"noopener noreferrer\""));
        assert!(doc.html.contains(">ext</a>"));
    }

    #[test]
    fn test_same_origin_link_stays_plain() {
        let doc = renderer().render("a.md", "[own](https://example.com/page)");
        assert!(doc.html.contains("href=\"https://example.com/page\""));
        assert!(!doc.html.contains("target="));
    }

    #[test]
    fn test_mermaid_fence_becomes_placeholder() {
        let doc = renderer().render("a.md", "```mermaid\ngraph TD;\n  A-->B;\n```");
        assert!(doc.html.contains("<div class=\"mermaid\">"));
        assert!(doc.html.contains("A--&gt;B"));
        assert!(!doc.html.contains("<code"));
    }

    #[test]
    fn test_code_fence_highlighted() {
        let doc = renderer().render("a.md", "```rust\nfn main() {}\n```");
        assert!(doc.html.contains("<pre"));
        assert!(doc.html.contains("main"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_block() {
        let doc = renderer().render("a.md", "```nosuchlang\nx < y\n```");
        assert!(doc.html.contains("language-nosuchlang"));
        assert!(doc.html.contains("x &lt; y"));
    }

    #[test]
    fn test_inline_script_is_sanitized() {
        let doc = renderer().render("a.md", "hello\n\n<script>alert(1)</script>");
        assert!(doc.html.contains("hello"));
        assert!(!doc.html.contains("script"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Hello,  World!  "), "hello-world");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("---"), "section");
        assert_eq!(slugify(""), "section");
    }
}
