//! HTML sanitization profile
//!
//! Matches the front-end contract: script/style/iframe/object/embed and
//! unknown attributes are stripped, while the attributes the renderer itself
//! assigns (heading ids, link target/rel, img loading/decoding, highlight
//! classes and inline span styles) survive.

use ammonia::Builder;
use lazy_static::lazy_static;

lazy_static! {
    static ref CLEANER: Builder<'static> = {
        let mut builder = Builder::default();
        builder
            .add_tag_attributes("h2", ["id"])
            .add_tag_attributes("h3", ["id"])
            .add_tag_attributes("a", ["target", "rel"])
            .add_tag_attributes("img", ["loading", "decoding"])
            .add_tag_attributes("div", ["class"])
            .add_tag_attributes("code", ["class"])
            .add_tag_attributes("pre", ["class", "style"])
            .add_tag_attributes("span", ["class", "style"])
            // rel is managed by the renderer, not rewritten here
            .link_rel(None);
        builder
    };
}

/// Sanitize rendered HTML
pub fn clean(html: &str) -> String {
    CLEANER.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_and_style() {
        let html = r#"<p>ok</p><script>alert(1)</script><style>p{color:red}</style>"#;
        let cleaned = clean(html);
        assert!(cleaned.contains("<p>ok</p>"));
        assert!(!cleaned.contains("script"));
        assert!(!cleaned.contains("alert"));
        assert!(!cleaned.contains("color:red"));
    }

    #[test]
    fn test_strips_embedding_tags() {
        let html = r#"<iframe src="x"></iframe><object></object><embed>"#;
        let cleaned = clean(html);
        assert!(!cleaned.contains("iframe"));
        assert!(!cleaned.contains("object"));
        assert!(!cleaned.contains("embed"));
    }

    #[test]
    fn test_strips_event_handlers_and_js_urls() {
        let cleaned = clean(r#"<a href="javascript:alert(1)" onclick="x()">hi</a>"#);
        assert!(!cleaned.contains("javascript:"));
        assert!(!cleaned.contains("onclick"));
        assert!(cleaned.contains("hi"));
    }

    #[test]
    fn test_keeps_heading_ids_and_link_target() {
        let html = r#"<h2 id="intro">Intro</h2><a href="https://other.com/" target="_blank" rel="noopener noreferrer">x</a>"#;
        let cleaned = clean(html);
        assert!(cleaned.contains(r#"id="intro""#));
        assert!(cleaned.contains(r#"target="_blank""#));
        assert!(cleaned.contains("noopener"));
    }

    #[test]
    fn test_keeps_diagram_placeholder() {
        let html = r#"<div class="mermaid">graph TD; A--&gt;B</div>"#;
        let cleaned = clean(html);
        assert!(cleaned.contains(r#"class="mermaid""#));
        assert!(cleaned.contains("graph TD"));
    }

    #[test]
    fn test_keeps_img_lazy_attributes() {
        let html = r#"<img src="/docs/img/x.png" alt="x" loading="lazy" decoding="async">"#;
        let cleaned = clean(html);
        assert!(cleaned.contains(r#"loading="lazy""#));
        assert!(cleaned.contains(r#"decoding="async""#));
    }
}
