//! `assets` command: list what an export would write, without writing.

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;

use super::style_source;
use crate::asset::{AssetRegistry, AssetType, Download};
use crate::config::ExportConfig;
use crate::core::Location;
use crate::log;
use crate::utils::plural::plural_count;

fn format_size(bytes: usize) -> String {
    match bytes {
        0..1024 => format!("{bytes} B"),
        1024..1_048_576 => format!("{:.1} KiB", bytes as f64 / 1024.0),
        _ => format!("{:.1} MiB", bytes as f64 / 1_048_576.0),
    }
}

fn row(download: &Download<'_>) -> String {
    let asset = download.asset;
    format!(
        "{:<48} {:<7} {:<13} {:>6} {:>10}",
        download.target.path(),
        format!("{:?}", asset.kind).to_lowercase(),
        format!("{:?}", asset.inline_policy),
        asset.load_priority,
        format_size(asset.data.len())
    )
}

pub async fn list_assets(
    config: &ExportConfig,
    styles: Option<&Path>,
    kind: Option<AssetType>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut registry = AssetRegistry::with_cancel(config, style_source(styles)?, cancel);
    registry.reload_assets().await;

    let downloads: Vec<_> = registry
        .downloads(&Location::empty())
        .into_iter()
        .filter(|download| kind.is_none_or(|kind| download.asset.kind == kind))
        .collect();

    println!(
        "{}",
        format!(
            "{:<48} {:<7} {:<13} {:>6} {:>10}",
            "target", "type", "policy", "prio", "size"
        )
        .bold()
    );
    for download in &downloads {
        println!("{}", row(download));
    }
    log!("assets"; "{} to write", plural_count(downloads.len(), "file"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1_048_576), "3.0 MiB");
    }
}
