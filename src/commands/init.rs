//! Initialize a new notepress site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("content"))?;

    let config_content = r#"# notepress configuration

# Site
title: notepress
subtitle: ''
description: ''
author: ''
language: en

# URL
url: http://example.com
root: /

# Layout
index_file: content-index.json
content_dir: content
public_dir: public
post_dir: posts

# Display labels for type codes
type_labels:
  article: Article
  video-note: Video notes
  audio-note: Audio notes

# Date format (chrono strftime)
date_format: '%Y-%m-%d'

highlight:
  enable: true
  theme: base16-ocean.dark

# Set to a mermaid CLI on PATH to pre-render diagrams at build time
diagram:
  command: mmdc
"#;
    fs::write(target_dir.join("_config.yml"), config_content)?;

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let index = serde_json::json!([
        {
            "id": "hello-world",
            "title": "Hello World",
            "type": "article",
            "status": "published",
            "date": today,
            "topic": ["getting-started"],
            "summary": "A first content item to build on.",
            "source": "content/hello-world.md"
        }
    ]);
    fs::write(
        target_dir.join("content-index.json"),
        serde_json::to_string_pretty(&index)?,
    )?;

    let sample_doc = r#"## Welcome

This site is driven by `content-index.json`: every entry there points at a
markdown document and carries the metadata shown on the list page.

### Next steps

- Add markdown files under `content/`
- Describe them in `content-index.json`
- Run `notepress generate`, or `notepress server` to preview with live reload

### Diagrams

```mermaid
graph LR;
  index[content-index.json] --> pages[Static pages];
```
"#;
    fs::write(target_dir.join("content/hello-world.md"), sample_doc)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Notepress;

    #[test]
    fn test_init_scaffolds_a_working_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("_config.yml").exists());
        assert!(dir.path().join("content-index.json").exists());
        assert!(dir.path().join("content/hello-world.md").exists());

        // The scaffold generates end to end
        let app = Notepress::new(dir.path()).unwrap();
        app.generate().unwrap();

        let html = fs::read_to_string(app.public_dir.join("index.html")).unwrap();
        assert!(html.contains("Hello World"));
        let post =
            fs::read_to_string(app.public_dir.join("posts/hello-world/index.html")).unwrap();
        assert!(post.contains("<h2 id=\"welcome\">"));
    }
}
