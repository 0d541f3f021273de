//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::Generator;
use crate::index::ContentStore;
use crate::Notepress;

/// Generate the static site
pub fn run(app: &Notepress) -> Result<()> {
    let start = std::time::Instant::now();

    let store = ContentStore::new(&app.index_path);
    let items = store.published()?;
    tracing::info!("Loaded {} published items", items.len());

    let generator = Generator::new(app)?;
    generator.generate(&items)?;

    tracing::info!("Generated in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Watch for file changes and regenerate
pub async fn watch(app: &Notepress) -> Result<()> {
    let (tx, rx) = channel();

    // Debounce to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if app.content_dir.exists() {
        debouncer
            .watcher()
            .watch(&app.content_dir, RecursiveMode::Recursive)?;
    }
    if app.index_path.exists() {
        debouncer
            .watcher()
            .watch(&app.index_path, RecursiveMode::NonRecursive)?;
    }
    let config_path = app.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(_events)) => {
                tracing::info!("File changed, regenerating...");
                // Re-read the directory so config and index edits take effect
                if let Err(e) = Notepress::new(&app.base_dir).and_then(|fresh| fresh.generate()) {
                    tracing::error!("Generation failed: {}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(_) => break,
        }
    }

    Ok(())
}
