//! Site configuration (_config.yml)

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Layout
    pub index_file: String,
    pub content_dir: String,
    pub public_dir: String,
    pub post_dir: String,

    /// Display labels for type codes (`article`, `video-note`, ...)
    #[serde(default)]
    pub type_labels: HashMap<String, String>,

    // Date format (chrono strftime)
    pub date_format: String,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub diagram: DiagramConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "notepress".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            index_file: "content-index.json".to_string(),
            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            post_dir: "posts".to_string(),

            type_labels: default_type_labels(),

            date_format: "%Y-%m-%d".to_string(),

            highlight: HighlightConfig::default(),
            diagram: DiagramConfig::default(),
            extra: HashMap::new(),
        }
    }
}

fn default_type_labels() -> HashMap<String, String> {
    [
        ("article", "Article"),
        ("video-note", "Video notes"),
        ("audio-note", "Audio notes"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Display label for a type code; unknown codes fall back to the raw code.
    pub fn type_label(&self, kind: &str) -> String {
        if let Some(label) = self.type_labels.get(kind) {
            label.clone()
        } else if kind.is_empty() {
            "Uncategorized".to_string()
        } else {
            kind.to_string()
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Diagram pre-rendering configuration
///
/// When the command is found on PATH, mermaid blocks are rendered to SVG at
/// build time; otherwise the placeholders are left for the client-side loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub command: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            command: "mmdc".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.index_file, "content-index.json");
        assert_eq!(config.root, "/");
        assert_eq!(config.type_label("article"), "Article");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Hub
url: https://hub.example.com
index_file: data/content-index.json
type_labels:
  article: Post
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Hub");
        assert_eq!(config.index_file, "data/content-index.json");
        assert_eq!(config.type_label("article"), "Post");
        // Unknown codes pass through
        assert_eq!(config.type_label("video-note"), "video-note");
    }

    #[test]
    fn test_empty_type_label() {
        let config = SiteConfig::default();
        assert_eq!(config.type_label(""), "Uncategorized");
    }
}
