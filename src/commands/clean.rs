//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Notepress;

/// Remove the generated output
pub fn run(app: &Notepress) -> Result<()> {
    if app.public_dir.exists() {
        fs::remove_dir_all(&app.public_dir)?;
        tracing::info!("Deleted: {:?}", app.public_dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app = Notepress::new(dir.path()).unwrap();
        fs::create_dir_all(app.public_dir.join("assets")).unwrap();
        fs::write(app.public_dir.join("index.html"), "x").unwrap();

        run(&app).unwrap();
        assert!(!app.public_dir.exists());

        // Cleaning twice is fine
        run(&app).unwrap();
    }
}
