//! URL helpers for link/image rewriting

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use url::Url;

lazy_static! {
    /// Absolute schemes, pure anchors and protocol-relative references are
    /// never rewritten
    static ref ABSOLUTE_REF: Regex =
        Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*:|#|//)").unwrap();
}

/// URL-safe encoding for content ids used in hrefs
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Whether a reference should be left untouched by rewriting
pub fn is_external_ref(value: &str) -> bool {
    ABSOLUTE_REF.is_match(value)
}

/// Resolve a relative reference against the directory of `source` (a path
/// relative to the site base) into a root-absolute URL. Returns `None` for
/// values that cannot be resolved; callers skip those elements.
pub fn resolve_relative(root: &str, source: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let base_path = format!(
        "{}/{}",
        root.trim_matches('/'),
        source.trim_start_matches('/')
    );

    // A throwaway origin gives us RFC 3986 reference resolution; only the
    // path/query/fragment survive into the output.
    let base = Url::parse("http://notepress.invalid/")
        .ok()?
        .join(&base_path)
        .ok()?;
    let resolved = base.join(value).ok()?;

    let mut out = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = resolved.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    Some(out)
}

/// Whether a reference points at an http(s) origin other than the site's own.
/// Mirrors resolving the href against the current page before comparing, so
/// root-relative paths always count as same-origin. Malformed URLs return
/// false and are left alone.
pub fn is_cross_origin(href: &str, site_url: &str) -> bool {
    let Ok(site) = Url::parse(site_url) else {
        return false;
    };
    let Ok(resolved) = site.join(href) else {
        return false;
    };
    matches!(resolved.scheme(), "http" | "https") && resolved.origin() != site.origin()
}

/// Percent-encode a content id for use in a URL path segment
pub fn encode_id(id: &str) -> String {
    utf8_percent_encode(id, ID_SEGMENT).to_string()
}

/// Root-absolute URL for a detail page
pub fn post_url(root: &str, post_dir: &str, id: &str) -> String {
    format!(
        "/{}/{}/",
        format!("{}/{}", root.trim_matches('/'), post_dir.trim_matches('/'))
            .trim_matches('/'),
        encode_id(id)
    )
}

/// Prefix a site-relative path with the configured root
pub fn url_for(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_refs() {
        assert!(is_external_ref("https://example.com/a"));
        assert!(is_external_ref("mailto:a@b.c"));
        assert!(is_external_ref("#section"));
        assert!(is_external_ref("//cdn.example.com/x.js"));
        assert!(!is_external_ref("img/x.png"));
        assert!(!is_external_ref("../other.md"));
        assert!(!is_external_ref("/already/rooted.png"));
    }

    #[test]
    fn test_resolve_same_directory() {
        assert_eq!(
            resolve_relative("/", "docs/a.md", "img/x.png"),
            Some("/docs/img/x.png".to_string())
        );
    }

    #[test]
    fn test_resolve_parent_directory() {
        assert_eq!(
            resolve_relative("/", "content/docs/a.md", "../shared/x.png"),
            Some("/content/shared/x.png".to_string())
        );
    }

    #[test]
    fn test_resolve_keeps_query_and_fragment() {
        assert_eq!(
            resolve_relative("/", "docs/a.md", "b.md?v=1#top"),
            Some("/docs/b.md?v=1#top".to_string())
        );
    }

    #[test]
    fn test_resolve_with_root() {
        assert_eq!(
            resolve_relative("/hub/", "docs/a.md", "img/x.png"),
            Some("/hub/docs/img/x.png".to_string())
        );
    }

    #[test]
    fn test_cross_origin() {
        let site = "https://example.com";
        assert!(is_cross_origin("https://other.com/page", site));
        assert!(!is_cross_origin("https://example.com/page", site));
        assert!(!is_cross_origin("/docs/a.md", site));
        assert!(!is_cross_origin("#anchor", site));
        assert!(!is_cross_origin("mailto:a@b.c", site));
    }

    #[test]
    fn test_post_url_encodes_id() {
        assert_eq!(post_url("/", "posts", "p1"), "/posts/p1/");
        assert_eq!(post_url("/", "posts", "a b"), "/posts/a%20b/");
        assert_eq!(post_url("/hub/", "posts", "p1"), "/hub/posts/p1/");
    }

    #[test]
    fn test_url_for() {
        assert_eq!(url_for("/", "assets/style.css"), "/assets/style.css");
        assert_eq!(url_for("/hub/", "index.html"), "/hub/index.html");
        assert_eq!(url_for("/", ""), "/");
    }
}
