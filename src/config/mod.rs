//! Configuration module

mod site;

pub use site::DiagramConfig;
pub use site::HighlightConfig;
pub use site::SiteConfig;
