//! Diagram post-processing
//!
//! Rendered documents carry `<div class="mermaid">` placeholders with the
//! escaped diagram source inside. When a mermaid CLI is installed we render
//! each placeholder to inline SVG at generation time; otherwise the
//! placeholders pass through untouched and the theme's client script renders
//! them in the browser.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::config::DiagramConfig;

lazy_static! {
    // Only matches untouched placeholders; processed divs carry extra
    // attributes and never match again.
    static ref MERMAID_BLOCK: Regex =
        Regex::new(r#"(?s)<div class="mermaid">(.*?)</div>"#).unwrap();
}

/// Renders mermaid placeholders to SVG via an external command
pub struct DiagramProcessor {
    command: String,
    resolved: OnceLock<Option<PathBuf>>,
}

impl DiagramProcessor {
    pub fn new(config: &DiagramConfig) -> Self {
        Self {
            command: config.command.clone(),
            resolved: OnceLock::new(),
        }
    }

    /// Process every untouched placeholder in `html`. Each failure degrades
    /// that one diagram to its escaped source with a fallback marker; a
    /// missing command leaves the whole document unchanged.
    pub fn process(&self, html: &str) -> String {
        if !html.contains("class=\"mermaid\"") {
            return html.to_string();
        }
        let Some(command) = self.command_path() else {
            return html.to_string();
        };

        MERMAID_BLOCK
            .replace_all(html, |caps: &Captures| {
                let escaped = &caps[1];
                match self.render_svg(command, &html_unescape(escaped)) {
                    Ok(svg) => format!(
                        "<div class=\"mermaid\" data-diagram-state=\"rendered\">{}</div>",
                        svg
                    ),
                    Err(err) => {
                        warn!("diagram rendering failed: {:#}", err);
                        format!(
                            "<div class=\"mermaid mermaid-fallback\" data-diagram-state=\"fallback\">{}</div>",
                            escaped
                        )
                    }
                }
            })
            .into_owned()
    }

    /// Locate the configured command once; later calls reuse the result.
    fn command_path(&self) -> Option<&Path> {
        self.resolved
            .get_or_init(|| match which::which(&self.command) {
                Ok(path) => Some(path),
                Err(_) => {
                    debug!(
                        "diagram command '{}' not found, diagrams are left to the client",
                        self.command
                    );
                    None
                }
            })
            .as_deref()
    }

    fn render_svg(&self, command: &Path, source: &str) -> Result<String> {
        let dir = tempfile::tempdir().context("create diagram temp dir")?;
        let input = dir.path().join("diagram.mmd");
        let output = dir.path().join("diagram.svg");
        fs::write(&input, source).context("write diagram source")?;

        let result = Command::new(command)
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .output()
            .with_context(|| format!("run {}", command.display()))?;
        if !result.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.command,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            );
        }

        fs::read_to_string(&output).context("read rendered diagram")
    }
}

/// Inverse of the renderer's escaping, applied before handing the source to
/// the external command.
fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(command: &str) -> DiagramProcessor {
        DiagramProcessor::new(&DiagramConfig {
            command: command.to_string(),
        })
    }

    const PLACEHOLDER: &str = "<p>before</p><div class=\"mermaid\">graph TD; A--&gt;B;</div>";

    #[test]
    fn test_missing_command_leaves_html_unchanged() {
        let processed = processor("no-such-diagram-tool").process(PLACEHOLDER);
        assert_eq!(processed, PLACEHOLDER);
    }

    #[test]
    fn test_html_without_placeholders_passes_through() {
        let html = "<p>plain</p>";
        assert_eq!(processor("false").process(html), html);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_degrades_to_fallback() {
        let processed = processor("false").process(PLACEHOLDER);
        assert!(processed.contains("mermaid-fallback"));
        assert!(processed.contains("data-diagram-state=\"fallback\""));
        // Escaped source is preserved for the reader
        assert!(processed.contains("A--&gt;B;"));
        assert!(processed.contains("<p>before</p>"));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command_inlines_svg() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-mmdc");
        fs::write(&script, "#!/bin/sh\nprintf '<svg><g>ok</g></svg>' > \"$4\"\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let processed = processor(script.to_str().unwrap()).process(PLACEHOLDER);
        assert!(processed.contains("data-diagram-state=\"rendered\""));
        assert!(processed.contains("<svg><g>ok</g></svg>"));
    }

    #[cfg(unix)]
    #[test]
    fn test_processed_output_is_stable() {
        let processed = processor("false").process(PLACEHOLDER);
        // Fallback divs no longer match the placeholder pattern
        assert_eq!(processor("false").process(&processed), processed);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(html_unescape("A--&gt;B &amp;&amp; C"), "A-->B && C");
        assert_eq!(html_unescape("&quot;x&quot; &#39;y&#39;"), "\"x\" 'y'");
    }
}
