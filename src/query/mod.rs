//! Query engine - filter facets and keyword/type/topic/year predicates

use indexmap::IndexSet;
use serde::Serialize;

use crate::index::ContentItem;

/// Distinct filter facets derived from a list of items
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    /// Type codes in first-seen order
    pub types: Vec<String>,
    /// Union of all topics in first-seen order
    pub topics: Vec<String>,
    /// 4-character year prefixes, sorted descending
    pub years: Vec<String>,
}

/// Active filters; an empty value means no constraint for that dimension
#[derive(Debug, Clone, Default)]
pub struct ContentFilters {
    pub keyword: String,
    pub kind: Option<String>,
    pub topic: Option<String>,
    pub year: Option<String>,
}

/// Collect the filter facets of a list of items
pub fn filter_options(items: &[ContentItem]) -> FilterOptions {
    let mut types: IndexSet<String> = IndexSet::new();
    let mut topics: IndexSet<String> = IndexSet::new();
    let mut years: IndexSet<String> = IndexSet::new();

    for item in items {
        if !item.kind.is_empty() {
            types.insert(item.kind.clone());
        }
        for topic in &item.topics {
            topics.insert(topic.clone());
        }
        if let Some(year) = item.year() {
            years.insert(year.to_string());
        }
    }

    let mut years: Vec<String> = years.into_iter().collect();
    // Lexicographic descending equals numeric descending for 4-digit years
    years.sort_by(|a, b| b.cmp(a));

    FilterOptions {
        types: types.into_iter().collect(),
        topics: topics.into_iter().collect(),
        years,
    }
}

/// Apply all four predicates, ANDed. With default filters this is the
/// identity over `items`.
pub fn query_content<'a>(items: &'a [ContentItem], filters: &ContentFilters) -> Vec<&'a ContentItem> {
    let keyword = filters.keyword.trim().to_lowercase();
    let kind = active(&filters.kind);
    let topic = active(&filters.topic);
    let year = active(&filters.year);

    items
        .iter()
        .filter(|item| {
            if let Some(kind) = kind {
                if item.kind != kind {
                    return false;
                }
            }

            if let Some(topic) = topic {
                if !item.topics.iter().any(|t| t == topic) {
                    return false;
                }
            }

            if let Some(year) = year {
                if item.year() != Some(year) {
                    return false;
                }
            }

            if !keyword.is_empty() && !item.search_text.contains(&keyword) {
                return false;
            }

            true
        })
        .collect()
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
