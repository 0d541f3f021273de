//! Content index - loads and normalizes `content-index.json`

mod item;
mod store;

pub use item::{ContentItem, RawContentItem, Status};
pub use store::{ContentStore, LoadError};
