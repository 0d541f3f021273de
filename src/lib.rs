//! notepress: a static site generator for JSON-indexed markdown content hubs
//!
//! A site is a directory holding a `content-index.json` describing every
//! content item, the markdown sources the index points at, and an optional
//! `_config.yml`. notepress renders the index into a filterable list page and
//! one detail page per published item.

pub mod commands;
pub mod config;
pub mod generator;
pub mod index;
pub mod query;
pub mod render;
pub mod server;

use anyhow::Result;
use std::path::Path;

/// The main notepress application
#[derive(Clone)]
pub struct Notepress {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content index file
    pub index_path: std::path::PathBuf,
    /// Directory holding markdown sources and their assets
    pub content_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Notepress {
    /// Create a new notepress instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let index_path = base_dir.join(&config.index_file);
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            index_path,
            content_dir,
            public_dir,
        })
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
