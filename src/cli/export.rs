//! `export` command: write rendered pages and every asset they need.

use std::path::Path;

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use tokio_util::sync::CancellationToken;

use super::style_source;
use crate::asset::AssetRegistry;
use crate::config::ExportConfig;
use crate::core::{self, Location};
use crate::site::{ExportFile, Website};
use crate::utils::fs;

/// Rendered pages under `pages`, in path order.
pub async fn collect_pages(pages: &Path) -> Result<Vec<ExportFile>> {
    let mut paths: Vec<_> = WalkDir::new(pages)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        })
        .collect();
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        if core::is_shutdown() {
            bail!("interrupted while reading pages");
        }
        let relative = path.strip_prefix(pages).unwrap_or(&path);
        let html = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("cannot read page `{}`", path.display()))?;
        files.push(ExportFile {
            source: Location::new(&relative.to_string_lossy()),
            html,
            modified: fs::modified(&path).await.unwrap_or_else(std::time::SystemTime::now),
        });
    }
    Ok(files)
}

pub async fn export_site(
    config: &ExportConfig,
    styles: Option<&Path>,
    pages: &Path,
    output: &Path,
    cancel: CancellationToken,
) -> Result<()> {
    let files = collect_pages(pages).await?;
    let mut registry = AssetRegistry::with_cancel(config, style_source(styles)?, cancel);

    Website::build(&mut registry, &files, output)
        .await
        .with_context(|| format!("cannot export `{}`", pages.display()))?;
    Ok(())
}
