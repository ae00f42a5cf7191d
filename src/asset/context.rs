//! Shared state every asset load reads from.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::LibraryLayout;
use super::source::{Fetcher, StyleSource};
use crate::config::{ExportConfig, ExportOptions};

/// Vault directories the dynamic sources read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    pub root: PathBuf,
    /// Settings folder holding `themes/`, `snippets/` and `appearance.json`.
    pub config_dir: PathBuf,
    pub plugins: PathBuf,
    /// Base for root-relative stylesheet urls.
    pub resources: PathBuf,
}

impl VaultPaths {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            root: config.vault_root.clone(),
            config_dir: config.config_dir(),
            plugins: config.plugins_dir(),
            resources: config.resources_dir(),
        }
    }
}

/// Read-only view handed to every loader during one load wave.
pub struct LoadContext {
    pub options: Arc<ExportOptions>,
    pub layout: LibraryLayout,
    pub vault: VaultPaths,
    pub styles: Arc<dyn StyleSource>,
    pub fetcher: Fetcher,
    pub cancel: CancellationToken,
    /// Bumped by every [`set_options`](Self::set_options). Loaders that
    /// report unchanged input fold it into their fingerprint, since
    /// stylesheet url rewriting depends on the options.
    pub generation: u64,
}

impl LoadContext {
    pub fn new(
        config: &ExportConfig,
        styles: Arc<dyn StyleSource>,
        cancel: CancellationToken,
    ) -> Self {
        let options = Arc::new(config.export.clone());
        Self {
            layout: LibraryLayout::new(&options.library_dir, options.slugify_paths),
            fetcher: Fetcher::new(options.fetch_timeout, cancel.clone()),
            vault: VaultPaths::from_config(config),
            options,
            styles,
            cancel,
            generation: 0,
        }
    }

    /// Swap the options, recomputing everything derived from them.
    pub fn set_options(&mut self, options: ExportOptions) {
        self.layout = LibraryLayout::new(&options.library_dir, options.slugify_paths);
        self.fetcher = Fetcher::new(options.fetch_timeout, self.cancel.clone());
        self.options = Arc::new(options);
        self.generation += 1;
    }
}
