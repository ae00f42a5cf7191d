//! Site assembly: writes downloads and pages using the registry's views.
//!
//! ```text
//! Website::build
//!   -> reload dynamic assets
//!   -> file tree (temporary asset, sidebar only)
//!   -> write downloads (unchanged files skipped)
//!   -> write pages with head references spliced in
//! ```

mod error;
mod page;
mod tree;

pub use error::ExportError;
pub use page::ExportFile;

use std::path::Path;

use crate::asset::source::BundledSource;
use crate::asset::{
    Asset, AssetRecord, AssetRegistry, AssetType, Download, InlinePolicy, Mutability,
};
use crate::core::Location;
use crate::logger::ProgressLine;
use crate::utils::fs;
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// What one export wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub pages: usize,
    pub downloads_written: usize,
    pub downloads_skipped: usize,
}

pub struct Website;

impl Website {
    /// Export `files` into `destination`.
    ///
    /// Fails before touching any asset when there is nothing to export.
    /// Output already written is left in place when a later write fails.
    pub async fn build(
        registry: &mut AssetRegistry,
        files: &[ExportFile],
        destination: &Path,
    ) -> Result<ExportReport, ExportError> {
        if files.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        registry.reload_assets().await;
        let options = registry.options().clone();
        if options.sidebar.enable {
            let outputs: Vec<_> = files.iter().map(|f| f.output_path(&options)).collect();
            let record = AssetRecord::new(
                tree::FILE_NAME,
                AssetType::Html,
                InlinePolicy::Auto,
                Mutability::Temporary,
            );
            let tree = Asset::new(record, BundledSource::text(tree::render(&outputs)));
            registry.load_temporary(tree).await;
        }
        if registry.cancel_token().is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        let root = Location::new(&destination.to_string_lossy());
        let mut report = ExportReport::default();

        let downloads = registry.downloads(&root);
        for download in &downloads {
            if write_download(download).await? {
                report.downloads_written += 1;
            } else {
                report.downloads_skipped += 1;
            }
        }

        let shared_head = page_head(registry);
        let body = page_body(registry);
        let progress = ProgressLine::new("export", &[("pages", files.len())]);
        for file in files {
            if registry.cancel_token().is_cancelled() {
                return Err(ExportError::Cancelled);
            }
            let output = file.output_path(&options);
            let head = format!("<base href=\"{}\">\n{shared_head}", page::base_href(&output));
            let html = page::assemble(&file.html, file.source.stem(), &head, &body);

            let path = root.joined(&output.path()).to_std_path();
            fs::write_creating(&path, html.as_bytes())
                .await
                .map_err(|source| ExportError::Write { path, source })?;
            report.pages += 1;
            progress.inc("pages");
        }
        progress.finish();

        log!(
            "export";
            "{}, {} ({} unchanged)",
            plural_count(report.pages, "page"),
            plural_count(report.downloads_written, "asset"),
            report.downloads_skipped
        );
        Ok(report)
    }
}

/// Write one download unless the file on disk is already current.
async fn write_download(download: &Download<'_>) -> Result<bool, ExportError> {
    let path = download.target.to_std_path();
    let data = download.asset.data.as_bytes();

    if let Some(modified) = download.asset.source_stat.modified
        && fs::is_up_to_date(&path, modified).await
        && tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.len() == data.len() as u64)
    {
        debug!("export"; "unchanged {}", download.target.path());
        return Ok(false);
    }

    fs::write_creating(&path, data)
        .await
        .map_err(|source| ExportError::Write { path, source })?;
    Ok(true)
}

fn find_named<'a>(registry: &'a AssetRegistry, kind: AssetType, name: &str) -> Option<&'a Asset> {
    registry
        .assets_of_type(kind)
        .into_iter()
        .find(|asset| asset.record.file_name == name && !asset.record.data.is_empty())
}

/// Markup opening every page body: the file tree, then inline assets.
fn page_body(registry: &AssetRegistry) -> String {
    let options = registry.options();
    let mut parts = Vec::new();
    if options.sidebar.enable
        && let Some(tree) = find_named(registry, AssetType::Html, tree::FILE_NAME)
    {
        parts.push(tree.html(options));
    }
    parts.push(registry.body_inlines());
    parts.retain(|part| !part.is_empty());
    parts.join("\n")
}

/// Head fragment shared by every page: registry head references, the
/// graph view module and custom head content.
fn page_head(registry: &AssetRegistry) -> String {
    let options = registry.options();
    let mut parts = vec![registry.head_references()];

    if options.graph_view_enabled()
        && options.include_js
        && let Some(graph) = find_named(registry, AssetType::Script, "graph-view.js")
    {
        let record = &graph.record;
        parts.push(if options.inline_js {
            format!("<script type=\"module\">{}</script>", record.data.to_text())
        } else {
            format!(
                "<script type=\"module\" src=\"{}\"></script>",
                record.asset_path(None, options).path()
            )
        });
    }

    if let Some(custom) = find_named(registry, AssetType::Html, "custom-head-content.html") {
        parts.push(custom.html(options));
    }

    parts.retain(|part| !part.is_empty());
    parts.join("\n")
}
