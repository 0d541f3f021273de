//! Content item model and normalization

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Publication status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Published,
}

/// One element of the content index file, as written by authors.
/// Only `id` and `title` are required; everything else has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContentItem {
    pub id: String,
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "string_or_vec")]
    pub topic: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A normalized content item. Never mutated after construction.
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    /// Type code (`article`, `video-note`, `audio-note`, ...)
    pub kind: String,
    pub status: Status,
    /// Effective date: `date` falling back to `updatedAt`
    pub date: String,
    pub updated_at: String,
    pub topics: Vec<String>,
    pub summary: String,
    /// Markdown source path, relative to the site base directory
    pub source: String,
    /// Precomputed lowercase blob of title + summary + topics + raw type
    /// code, used for keyword matching
    pub search_text: String,
}

impl ContentItem {
    /// Normalize a raw index entry
    pub fn from_raw(raw: RawContentItem) -> Self {
        let kind = raw.kind.unwrap_or_default();
        let kind = if kind.is_empty() {
            "article".to_string()
        } else {
            kind
        };

        let status = match raw.status.as_deref() {
            Some("published") => Status::Published,
            _ => Status::Draft,
        };

        let raw_date = raw.date.unwrap_or_default();
        let raw_updated = raw.updated_at.unwrap_or_default();
        let date = if raw_date.is_empty() {
            raw_updated.clone()
        } else {
            raw_date
        };
        let updated_at = if raw_updated.is_empty() {
            date.clone()
        } else {
            raw_updated
        };

        let summary = raw.summary.unwrap_or_default();
        let search_text = [
            raw.title.as_str(),
            summary.as_str(),
            &raw.topic.join(" "),
            kind.as_str(),
        ]
        .join(" ")
        .to_lowercase();

        Self {
            id: raw.id,
            title: raw.title,
            kind,
            status,
            date,
            updated_at,
            topics: raw.topic,
            summary,
            source: raw.source.unwrap_or_default(),
            search_text,
        }
    }

    /// The effective date string (`date` already carries the fallback)
    pub fn effective_date(&self) -> &str {
        &self.date
    }

    /// 4-character year prefix of the effective date, if it has one
    pub fn year(&self) -> Option<&str> {
        self.date.get(0..4).filter(|y| !y.is_empty())
    }

    /// Unix timestamp used for recency sorting; unparseable dates sort as 0
    pub fn sort_timestamp(&self) -> i64 {
        parse_datetime(&self.date).map_or(0, |dt| dt.and_utc().timestamp())
    }

    /// Effective date formatted for display. Dates in unknown formats are
    /// shown as written; missing dates return `None`.
    pub fn display_date(&self, format: &str) -> Option<String> {
        let s = self.date.trim();
        if s.is_empty() {
            return None;
        }
        Some(match parse_datetime(s) {
            Some(dt) => dt.format(format).to_string(),
            None => s.to_string(),
        })
    }
}

/// Parse a date string in the formats the index uses
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}
