//! Built-in theme templates using the Tera template engine
//!
//! The whole theme (templates, stylesheet, client script) is embedded in the
//! binary, so a site directory needs nothing beyond its index and content.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Template renderer with the embedded theme loaded
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Autoescaping would also mangle slashes in generated URLs, so it is
        // disabled; templates escape item metadata (titles, topics, ...)
        // explicitly and insert rendered markdown as-is.
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("404.html", include_str!("theme/404.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Static theme files written into the output directory on every generation
pub const THEME_ASSETS: &[(&str, &str)] = &[
    ("assets/style.css", include_str!("theme/style.css")),
    ("assets/app.js", include_str!("theme/app.js")),
];

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
}

/// One list-page card. The `data-*` filter attributes on the card element are
/// fed from `type_code`, `topics`, `year` and `search_text`.
#[derive(Debug, Clone, Serialize)]
pub struct CardData {
    pub id: String,
    pub url: String,
    pub title: String,
    pub type_code: String,
    pub type_label: String,
    pub topics: Vec<String>,
    pub year: String,
    pub date_display: Option<String>,
    pub summary: String,
    pub search_text: String,
}

/// A `<select>` option with a display label distinct from its value
#[derive(Debug, Clone, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
}

/// Filter facets as rendered into the list page controls
#[derive(Debug, Clone, Serialize)]
pub struct FacetsData {
    pub types: Vec<FacetOption>,
    pub topics: Vec<String>,
    pub years: Vec<String>,
}

/// Previous/next navigation target on a detail page
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub title: String,
    pub url: String,
}

/// Detail page header fields
#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    pub type_label: String,
    pub date_display: Option<String>,
    pub topics: Vec<String>,
    pub summary: String,
}
