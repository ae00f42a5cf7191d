//! Command-line interface module.

mod args;
pub mod assets;
pub mod export;

pub use args::{Cli, Commands, OptionArgs, SourceArgs};

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::asset::source::{EmptyStyleSource, FileStyleSource, SnapshotStyleSource, StyleSource};
use crate::debug;

/// Style source for `--styles`: a JSON snapshot or a folder of CSS files.
pub fn style_source(styles: Option<&Path>) -> Result<Arc<dyn StyleSource>> {
    let Some(path) = styles else {
        debug!("styles"; "no host styles given, app stylesheets stay empty");
        return Ok(Arc::new(EmptyStyleSource));
    };
    if path.is_dir() {
        return Ok(Arc::new(FileStyleSource::new(path)));
    }
    if path.extension().is_some_and(|ext| ext == "json") {
        return Ok(Arc::new(SnapshotStyleSource::new(path)));
    }
    bail!(
        "`{}` is neither a JSON style snapshot nor a directory of CSS files",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_style_source_kinds() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("styles.json");
        let css = dir.path().join("app.css");
        std::fs::write(&snapshot, "{}").unwrap();
        std::fs::write(&css, ".a{}").unwrap();

        assert!(style_source(None).is_ok());
        assert!(style_source(Some(dir.path())).is_ok());
        assert!(style_source(Some(&snapshot)).is_ok());
        assert!(style_source(Some(&css)).is_err());
    }
}
