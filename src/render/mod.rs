//! Document rendering - markdown to sanitized HTML with TOC extraction

pub mod diagram;
mod markdown;
mod sanitize;
pub mod urls;

pub use diagram::DiagramProcessor;
pub use markdown::{DocumentRenderer, RenderedDocument, TocEntry};
pub use sanitize::clean;
