//! Content store - reads the index once per process and memoizes it

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

use super::{ContentItem, RawContentItem, Status};

/// Failure to load the content index
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read content index {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content index {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads `content-index.json` and caches the normalized items for the
/// lifetime of the store. Commands create one store per run, so a rebuild
/// always re-reads the file; within a run every caller sees one read.
pub struct ContentStore {
    index_path: PathBuf,
    cache: OnceLock<Vec<ContentItem>>,
}

impl ContentStore {
    /// Create a store for the given index file
    pub fn new<P: AsRef<Path>>(index_path: P) -> Self {
        Self {
            index_path: index_path.as_ref().to_path_buf(),
            cache: OnceLock::new(),
        }
    }

    /// Load and normalize the content index, memoized
    pub fn load(&self) -> Result<&[ContentItem], LoadError> {
        if let Some(items) = self.cache.get() {
            return Ok(items);
        }

        let items = self.read_index()?;
        Ok(self.cache.get_or_init(|| items))
    }

    /// Published items sorted by effective date descending; items with
    /// unparseable dates sort last
    pub fn published(&self) -> Result<Vec<ContentItem>, LoadError> {
        let mut items: Vec<ContentItem> = self
            .load()?
            .iter()
            .filter(|item| item.status == Status::Published)
            .cloned()
            .collect();
        items.sort_by_key(|item| std::cmp::Reverse(item.sort_timestamp()));
        Ok(items)
    }

    /// Drop the memoized index so the next `load` re-reads the file
    pub fn reset(&mut self) {
        self.cache.take();
    }

    fn read_index(&self) -> Result<Vec<ContentItem>, LoadError> {
        let content = fs::read_to_string(&self.index_path).map_err(|source| LoadError::Read {
            path: self.index_path.clone(),
            source,
        })?;

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|source| LoadError::Parse {
                path: self.index_path.clone(),
                source,
            })?;

        // Skip malformed entries instead of failing the whole index
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<RawContentItem>(entry) {
                Ok(raw) => items.push(ContentItem::from_raw(raw)),
                Err(e) => {
                    tracing::warn!("Skipping malformed index entry: {}", e);
                }
            }
        }

        Ok(items)
    }
}
