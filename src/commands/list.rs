//! List indexed content

use anyhow::Result;

use crate::index::ContentStore;
use crate::query::{filter_options, query_content, ContentFilters};
use crate::Notepress;

/// Print the filter facets and the items matching the given filters
pub fn run(app: &Notepress, filters: &ContentFilters) -> Result<()> {
    let store = ContentStore::new(&app.index_path);
    let items = store.published()?;

    let options = filter_options(&items);
    let matches = query_content(&items, filters);

    println!(
        "Published items: {} ({} matching)",
        items.len(),
        matches.len()
    );
    println!("Types:  {}", options.types.join(", "));
    println!("Topics: {}", options.topics.join(", "));
    println!("Years:  {}", options.years.join(", "));
    println!();

    for item in matches {
        println!(
            "  {}  {} - {} [{}]",
            item.display_date(&app.config.date_format)
                .unwrap_or_else(|| "(no date)".to_string()),
            app.config.type_label(&item.kind),
            item.title,
            item.id
        );
    }

    Ok(())
}
