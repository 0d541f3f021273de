//! Generator module - renders the content index into static HTML files using
//! built-in Tera templates

mod templates;

use anyhow::{bail, Context as _, Result};
use std::fs;

use tera::Context;
use walkdir::WalkDir;

use crate::index::ContentItem;
use crate::query::{filter_options, FilterOptions};
use crate::render::{urls, DiagramProcessor, DocumentRenderer, TocEntry};
use crate::Notepress;
use templates::{
    CardData, FacetOption, FacetsData, NavItem, PostPageData, SiteData, TemplateRenderer,
    THEME_ASSETS,
};

/// Body shown on a detail page whose markdown source could not be loaded
const CONTENT_ERROR_HTML: &str =
    r#"<div class="content-error"><p>This document could not be loaded.</p></div>"#;

/// Static site generator
pub struct Generator {
    app: Notepress,
    renderer: TemplateRenderer,
    documents: DocumentRenderer,
    diagrams: DiagramProcessor,
}

impl Generator {
    /// Create a new generator
    pub fn new(app: &Notepress) -> Result<Self> {
        Ok(Self {
            app: app.clone(),
            renderer: TemplateRenderer::new()?,
            documents: DocumentRenderer::new(&app.config),
            diagrams: DiagramProcessor::new(&app.config.diagram),
        })
    }

    /// Generate the entire site. `items` is the published slice of the index,
    /// already sorted newest first.
    pub fn generate(&self, items: &[ContentItem]) -> Result<()> {
        fs::create_dir_all(&self.app.public_dir)?;

        self.write_theme_assets()?;
        self.copy_content_assets()?;

        let cards = self.build_cards(items);
        let facets = filter_options(items);

        self.generate_index_page(&cards, &facets)?;
        self.generate_post_pages(items, &cards)?;
        self.generate_not_found_page()?;

        tracing::info!("Generated {} detail pages", cards.len());
        Ok(())
    }

    /// Create a base context with common variables
    fn base_context(&self) -> Context {
        let config = &self.app.config;
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: config.title.clone(),
                subtitle: config.subtitle.clone(),
                description: config.description.clone(),
                author: config.author.clone(),
                language: config.language.clone(),
            },
        );
        context.insert("root", &urls::url_for(&config.root, ""));
        context.insert(
            "current_year",
            &chrono::Utc::now().format("%Y").to_string(),
        );
        context
    }

    fn build_cards(&self, items: &[ContentItem]) -> Vec<CardData> {
        let config = &self.app.config;
        items
            .iter()
            .map(|item| CardData {
                id: item.id.clone(),
                url: urls::post_url(&config.root, &config.post_dir, &item.id),
                title: item.title.clone(),
                type_code: item.kind.clone(),
                type_label: config.type_label(&item.kind),
                topics: item.topics.clone(),
                year: item.year().unwrap_or_default().to_string(),
                date_display: item.display_date(&config.date_format),
                summary: item.summary.clone(),
                search_text: item.search_text.clone(),
            })
            .collect()
    }

    /// Generate the list page with its filter controls. Every card carries the
    /// filter dimensions as data attributes for the client script.
    fn generate_index_page(&self, cards: &[CardData], facets: &FilterOptions) -> Result<()> {
        let config = &self.app.config;
        let facets = FacetsData {
            types: facets
                .types
                .iter()
                .map(|code| FacetOption {
                    value: code.clone(),
                    label: config.type_label(code),
                })
                .collect(),
            topics: facets.topics.clone(),
            years: facets.years.clone(),
        };

        let mut context = self.base_context();
        context.insert("cards", cards);
        context.insert("facets", &facets);

        let html = self.renderer.render("index.html", &context)?;
        let output_path = self.app.public_dir.join("index.html");
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);

        Ok(())
    }

    /// Generate one detail page per item. A failure to load or render one
    /// item's source degrades that page to an error note instead of failing
    /// the whole generation.
    fn generate_post_pages(&self, items: &[ContentItem], cards: &[CardData]) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if !is_safe_id(&item.id) {
                tracing::warn!("Skipping item with unusable id {:?}", item.id);
                continue;
            }

            let (content, toc) = match self.render_body(item) {
                Ok(rendered) => rendered,
                Err(err) => {
                    tracing::warn!("Failed to render '{}': {:#}", item.id, err);
                    (CONTENT_ERROR_HTML.to_string(), Vec::new())
                }
            };

            // Items are newest first: previous means older, next means newer
            let prev = cards.get(i + 1).map(nav_item);
            let next = i.checked_sub(1).and_then(|j| cards.get(j)).map(nav_item);

            let mut context = self.base_context();
            context.insert(
                "page",
                &PostPageData {
                    title: item.title.clone(),
                    type_label: self.app.config.type_label(&item.kind),
                    date_display: item.display_date(&self.app.config.date_format),
                    topics: item.topics.clone(),
                    summary: item.summary.clone(),
                },
            );
            context.insert("content", &content);
            context.insert("toc", &toc);
            if let Some(prev) = &prev {
                context.insert("prev", prev);
            }
            if let Some(next) = &next {
                context.insert("next", next);
            }

            let html = self.renderer.render("post.html", &context)?;

            let output_path = self
                .app
                .public_dir
                .join(&self.app.config.post_dir)
                .join(&item.id)
                .join("index.html");
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create dir {:?}", parent))?;
            }
            fs::write(&output_path, &html)
                .with_context(|| format!("write {:?}", output_path))?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        Ok(())
    }

    /// Load and render one item's markdown source
    fn render_body(&self, item: &ContentItem) -> Result<(String, Vec<TocEntry>)> {
        if item.source.is_empty() {
            bail!("item has no source");
        }

        let path = self.app.base_dir.join(&item.source);
        let markdown =
            fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;

        let document = self.documents.render(&item.source, &markdown);
        let html = self.diagrams.process(&document.html);
        Ok((html, document.toc))
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let context = self.base_context();
        let html = self.renderer.render("404.html", &context)?;
        fs::write(self.app.public_dir.join("404.html"), html)?;
        Ok(())
    }

    /// Write the embedded theme files into the output directory
    fn write_theme_assets(&self) -> Result<()> {
        for (relative, contents) in THEME_ASSETS {
            let dest = self.app.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, contents)?;
        }
        Ok(())
    }

    /// Copy non-markdown files (images, attachments) from the content
    /// directory, preserving their site-relative paths so rewritten links in
    /// rendered documents resolve.
    fn copy_content_assets(&self) -> Result<()> {
        let content_dir = &self.app.content_dir;
        if !content_dir.is_dir() {
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

            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("md") | Some("markdown")) {
                continue;
            }

            let relative = path.strip_prefix(&self.app.base_dir)?;
            let dest = self.app.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

fn nav_item(card: &CardData) -> NavItem {
    NavItem {
        title: card.title.clone(),
        url: card.url.clone(),
    }
}

/// Ids become output directory names; reject anything that would escape the
/// post directory.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains('/')
        && !id.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RawContentItem;
    use std::path::Path;

    fn item(json: &str) -> ContentItem {
        let raw: RawContentItem = serde_json::from_str(json).unwrap();
        ContentItem::from_raw(raw)
    }

    fn site_with_content() -> (tempfile::TempDir, Vec<ContentItem>) {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(content.join("docs")).unwrap();
        fs::write(
            content.join("docs/first.md"),
            "## Overview\n\nHello.\n\n### Details\n\n![pic](img/x.png)\n",
        )
        .unwrap();
        fs::write(content.join("second.md"), "Plain body.\n").unwrap();

        let items = vec![
            item(
                r#"{"id": "first", "title": "First Post", "status": "published",
                    "date": "2024-05-01", "type": "article", "topic": ["ai"],
                    "summary": "The first one", "source": "content/docs/first.md"}"#,
            ),
            item(
                r#"{"id": "second", "title": "Second Post", "status": "published",
                    "date": "2023-01-01", "type": "video-note",
                    "source": "content/second.md"}"#,
            ),
        ];
        (dir, items)
    }

    fn generate(dir: &Path, items: &[ContentItem]) -> Notepress {
        let app = Notepress::new(dir).unwrap();
        Generator::new(&app).unwrap().generate(items).unwrap();
        app
    }

    #[test]
    fn test_generates_index_page_with_cards_and_facets() {
        let (dir, items) = site_with_content();
        let app = generate(dir.path(), &items);

        let html = fs::read_to_string(app.public_dir.join("index.html")).unwrap();
        assert!(html.contains("First Post"));
        assert!(html.contains(r#"href="/posts/first/""#));
        assert!(html.contains(r#"data-type="article""#));
        assert!(html.contains(r#"data-year="2024""#));
        assert!(html.contains("data-search="));
        // Type select shows labels, values stay raw codes
        assert!(html.contains(r#"<option value="video-note">Video notes</option>"#));
        assert!(html.contains(r#"<option value="2023">2023</option>"#));
    }

    #[test]
    fn test_generates_detail_pages_with_toc_and_nav() {
        let (dir, items) = site_with_content();
        let app = generate(dir.path(), &items);

        let html =
            fs::read_to_string(app.public_dir.join("posts/first/index.html")).unwrap();
        assert!(html.contains("<h2 id=\"overview\">"));
        assert!(html.contains("href=\"#details\""));
        assert!(html.contains("src=\"/content/docs/img/x.png\""));
        // Newest item has no newer neighbour, only an older one
        assert!(html.contains("Second Post"));
        assert!(html.contains("post-nav-prev"));
        assert!(!html.contains("post-nav-next"));

        let second =
            fs::read_to_string(app.public_dir.join("posts/second/index.html")).unwrap();
        assert!(second.contains("post-nav-next"));
        assert!(second.contains("First Post"));
    }

    #[test]
    fn test_missing_source_degrades_to_error_note() {
        let (dir, mut items) = site_with_content();
        items.push(item(
            r#"{"id": "broken", "title": "Broken", "status": "published",
                "source": "content/missing.md"}"#,
        ));
        let app = generate(dir.path(), &items);

        let html =
            fs::read_to_string(app.public_dir.join("posts/broken/index.html")).unwrap();
        assert!(html.contains("content-error"));
        assert!(html.contains("Broken"));
    }

    #[test]
    fn test_empty_site_gets_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let app = generate(dir.path(), &[]);

        let html = fs::read_to_string(app.public_dir.join("index.html")).unwrap();
        assert!(html.contains("Nothing published yet"));
        assert!(!html.contains("data-role=\"filters\""));
    }

    #[test]
    fn test_writes_theme_assets_and_not_found_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = generate(dir.path(), &[]);

        assert!(app.public_dir.join("assets/style.css").exists());
        assert!(app.public_dir.join("assets/app.js").exists());
        let html = fs::read_to_string(app.public_dir.join("404.html")).unwrap();
        assert!(html.contains("Page not found"));
    }

    #[test]
    fn test_copies_content_assets_preserving_paths() {
        let (dir, items) = site_with_content();
        fs::create_dir_all(dir.path().join("content/docs/img")).unwrap();
        fs::write(dir.path().join("content/docs/img/x.png"), b"png").unwrap();

        let app = generate(dir.path(), &items);
        assert!(app.public_dir.join("content/docs/img/x.png").exists());
        // Markdown sources are not copied through
        assert!(!app.public_dir.join("content/second.md").exists());
    }

    #[test]
    fn test_unsafe_ids_are_skipped() {
        let (dir, mut items) = site_with_content();
        items.push(item(
            r#"{"id": "../escape", "title": "Escape", "status": "published",
                "source": "content/second.md"}"#,
        ));
        let app = generate(dir.path(), &items);
        assert!(!dir.path().join("public/escape/index.html").exists());
        assert!(app.public_dir.join("posts/first/index.html").exists());
    }

    #[test]
    fn test_titles_are_escaped_in_templates() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::write(dir.path().join("content/a.md"), "body\n").unwrap();
        let items = vec![item(
            r#"{"id": "a", "title": "<script>alert(1)</script>", "status": "published",
                "source": "content/a.md"}"#,
        )];
        let app = generate(dir.path(), &items);

        let html = fs::read_to_string(app.public_dir.join("index.html")).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
