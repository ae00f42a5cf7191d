//! Asset registry: owns every asset of one export session.
//!
//! # Scheduling
//!
//! Loads run as one concurrent wave per call, started in descending
//! `load_priority` order and joined before returning. A failed load never
//! fails the wave; it leaves the asset empty and the filters below drop it.
//!
//! # Views
//!
//! [`downloads`](AssetRegistry::downloads) and
//! [`head_references`](AssetRegistry::head_references) share one filter
//! pipeline over the flattened asset tree:
//!
//! ```text
//! flatten (registration order, children breadth-first)
//!   -> feature off        (graph view, search)
//!   -> include_css off    (styles)
//!   -> include_js off     (scripts)
//!   -> duplicate target   (first registered wins)
//!   -> empty data         (online references excepted in pages)
//!   -> inlined type       (downloads only)
//!   -> stable sort by priority, descending
//! ```
//!
//! All mutation goes through `&mut self`, so no view can observe a
//! half-finished load wave.

use std::cmp::Reverse;
use std::sync::Arc;
use std::time::SystemTime;

use futures::future::join_all;
use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;

use super::source::StyleSource;
use super::{Asset, AssetRecord, AssetType, InlinePolicy, LoadContext, LoadOutcome, Mutability};
use crate::config::{ExportConfig, ExportOptions};
use crate::core::Location;
use crate::logger::ProgressLine;
use crate::utils::{fs, plural::plural_count};
use crate::{debug, log};

/// A file the page writer has to materialize.
#[derive(Debug)]
pub struct Download<'a> {
    pub asset: &'a AssetRecord,
    /// Target rooted at the export destination.
    pub target: Location,
}

pub struct AssetRegistry {
    /// Top-level assets in registration order.
    assets: Vec<Asset>,
    ctx: LoadContext,
    initialized: bool,
}

impl AssetRegistry {
    /// Registry holding the built-in asset set.
    pub fn new(config: &ExportConfig, styles: Arc<dyn StyleSource>) -> Self {
        Self::with_cancel(config, styles, CancellationToken::new())
    }

    /// Registry whose loads abort once `cancel` fires.
    pub fn with_cancel(
        config: &ExportConfig,
        styles: Arc<dyn StyleSource>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            assets: super::builtin::assets(),
            ctx: LoadContext::new(config, styles, cancel),
            initialized: false,
        }
    }

    /// Add an asset. Temporary assets are evicted by the next reload.
    pub fn register(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    /// Load a temporary asset and register it.
    pub async fn load_temporary(&mut self, mut asset: Asset) -> LoadOutcome {
        asset.record.mutability = Mutability::Temporary;
        let outcome = asset.load(&self.ctx).await;
        self.assets.push(asset);
        outcome
    }

    /// Token cancelling every in-flight load of this session.
    pub fn cancel_token(&self) -> CancellationToken {
        self.ctx.cancel.clone()
    }

    pub fn options(&self) -> &ExportOptions {
        &self.ctx.options
    }

    pub fn context(&self) -> &LoadContext {
        &self.ctx
    }

    /// Swap the options. Static assets are reloaded by the next reload.
    pub fn set_options(&mut self, options: ExportOptions) {
        self.ctx.set_options(options);
        self.initialized = false;
    }

    /// Load every registered asset, then date static content to the
    /// executable's build time.
    pub async fn initialize(&mut self) {
        let total = self.assets.len();
        let failed = self.load_wave(|_| true, total).await;

        let built = match std::env::current_exe() {
            Ok(exe) => fs::modified(&exe).await,
            Err(_) => None,
        };
        let built = built.unwrap_or(SystemTime::UNIX_EPOCH);
        for asset in &mut self.assets {
            if asset.record.mutability == Mutability::Static {
                asset.record.source_stat.modified = Some(built);
            }
        }

        self.initialized = true;
        debug!("assets"; "initialized {}, {} failed", plural_count(total, "asset"), failed);
    }

    /// Evict temporary assets and reload the dynamic ones.
    ///
    /// Falls back to a full [`initialize`](Self::initialize) when nothing
    /// has been loaded yet under the current options.
    pub async fn reload_assets(&mut self) {
        self.assets
            .retain(|asset| asset.record.mutability != Mutability::Temporary);
        if !self.initialized {
            self.initialize().await;
            return;
        }

        let total = self
            .assets
            .iter()
            .filter(|asset| asset.record.mutability == Mutability::Dynamic)
            .count();
        let failed = self
            .load_wave(|asset| asset.record.mutability == Mutability::Dynamic, total)
            .await;
        if failed > 0 {
            log!("assets"; "{} could not be loaded", plural_count(failed, "asset"));
        }
    }

    /// Load the selected top-level assets concurrently, highest priority
    /// first. Returns the number of failures.
    async fn load_wave(&mut self, select: impl Fn(&Asset) -> bool, total: usize) -> usize {
        let ctx = &self.ctx;
        let mut selected: Vec<&mut Asset> = self
            .assets
            .iter_mut()
            .filter(|asset| asset.record.mutability != Mutability::Child && select(asset))
            .collect();
        selected.sort_by_key(|asset| Reverse(asset.record.load_priority));

        let progress = ProgressLine::new("assets", &[("assets", total)]);
        let outcomes = join_all(selected.into_iter().map(|asset| {
            let progress = &progress;
            async move {
                let outcome = asset.load(ctx).await;
                progress.inc("assets");
                outcome
            }
        }))
        .await;
        progress.finish();

        outcomes.iter().filter(|outcome| outcome.is_failed()).count()
    }

    // ========================================================================
    // queries
    // ========================================================================

    /// Every asset, top-level ones in registration order followed by their
    /// children breadth-first. Computed fresh on every call.
    fn flatten(&self) -> Vec<&Asset> {
        let mut all: Vec<&Asset> = self.assets.iter().collect();
        let mut next = 0;
        while next < all.len() {
            let asset = all[next];
            all.extend(asset.record.children.iter());
            next += 1;
        }
        all
    }

    pub fn assets_of_type(&self, kind: AssetType) -> Vec<&Asset> {
        self.flatten()
            .into_iter()
            .filter(|asset| asset.record.kind == kind)
            .collect()
    }

    pub fn assets_of_inline_policy(&self, policy: InlinePolicy) -> Vec<&Asset> {
        self.flatten()
            .into_iter()
            .filter(|asset| asset.record.inline_policy == policy)
            .collect()
    }

    /// Files that must be written under `destination`, highest priority
    /// first.
    pub fn downloads(&self, destination: &Location) -> Vec<Download<'_>> {
        let options = self.options();
        let candidates = self.flatten().into_iter().filter(|asset| {
            let record = &asset.record;
            record.inline_policy.is_reference(record.kind, options)
        });

        filter(candidates, options, View::Downloads)
            .into_iter()
            .map(|asset| Download {
                asset: &asset.record,
                target: destination.joined(&asset.record.target.path()),
            })
            .collect()
    }

    /// Markup for every page head, highest priority first.
    pub fn head_references(&self) -> String {
        let options = self.options();
        let candidates = self
            .flatten()
            .into_iter()
            .filter(|asset| asset.record.inline_policy.in_head());

        filter(candidates, options, View::Page)
            .into_iter()
            .map(|asset| asset.html(options))
            .filter(|html| !html.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Markup of assets embedded at the point of use (`Inline` policy),
    /// highest priority first.
    pub fn body_inlines(&self) -> String {
        let options = self.options();
        let candidates = self
            .flatten()
            .into_iter()
            .filter(|asset| asset.record.inline_policy == InlinePolicy::Inline);

        filter(candidates, options, View::Page)
            .into_iter()
            .map(|asset| asset.html(options))
            .filter(|html| !html.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Downloads,
    /// Markup embedded in or referenced from pages.
    Page,
}

fn filter<'a>(
    candidates: impl Iterator<Item = &'a Asset>,
    options: &ExportOptions,
    view: View,
) -> Vec<&'a Asset> {
    let mut seen = FxHashSet::default();
    let mut kept: Vec<&Asset> = candidates
        .filter(|asset| asset.record.feature.is_none_or(|feature| feature.enabled(options)))
        .filter(|asset| options.include_css || asset.record.kind != AssetType::Style)
        .filter(|asset| options.include_js || asset.record.kind != AssetType::Script)
        .filter(|asset| seen.insert(asset.record.target.path()))
        .filter(|asset| {
            let record = &asset.record;
            let online = view == View::Page
                && record.online_url.is_some()
                && !options.offline_resources;
            !record.data.is_empty() || online
        })
        .filter(|asset| view == View::Page || !options.inlines(asset.record.kind))
        .collect();

    kept.sort_by_key(|asset| Reverse(asset.record.load_priority));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::source::{BundledSource, EmptyStyleSource};
    use crate::asset::{AssetData, Feature, LoadMethod, test_config};

    fn new_registry(configure: impl FnOnce(&mut ExportConfig)) -> (tempfile::TempDir, AssetRegistry) {
        let (dir, config) = test_config(configure);
        (dir, AssetRegistry::new(&config, Arc::new(EmptyStyleSource)))
    }

    fn script(name: &str, policy: InlinePolicy, priority: i64, body: &str) -> Asset {
        let record = AssetRecord::new(name, AssetType::Script, policy, Mutability::Temporary)
            .with_load_method(LoadMethod::Default)
            .with_priority(priority);
        Asset::new(record, BundledSource::text(body))
    }

    fn names(downloads: &[Download<'_>]) -> Vec<String> {
        downloads.iter().map(|d| d.asset.file_name.clone()).collect()
    }

    /// Offline bundles would try to reach the CDNs; keep the libraries as
    /// online references instead.
    fn offline_libraries(config: &mut ExportConfig) {
        config.export.offline_resources = false;
    }

    #[tokio::test]
    async fn test_head_references_follow_priority_with_stable_ties() {
        let (_dir, mut registry) = new_registry(|c| {
            offline_libraries(c);
            c.export.inline_js = true;
            c.export.graph_view.enable = false;
        });
        registry.reload_assets().await;
        registry.load_temporary(script("first.js", InlinePolicy::InlineHead, 50, "a(1)")).await;
        registry.load_temporary(script("second.js", InlinePolicy::InlineHead, 50, "a(2)")).await;
        registry.load_temporary(script("top.js", InlinePolicy::InlineHead, 60, "a(3)")).await;

        let head = registry.head_references();
        let top = head.find("a(3)").unwrap();
        let first = head.find("a(1)").unwrap();
        let second = head.find("a(2)").unwrap();
        assert!(top < first && first < second);

        // webpage.js (100) before the temporaries, deferred.js (-1000) after.
        let webpage = head.find("<script async>").unwrap();
        assert!(webpage < top);
        assert!(head.rfind("<script defer>").unwrap() > second);
    }

    #[tokio::test]
    async fn test_duplicate_targets_keep_first_registered() {
        let (_dir, mut registry) = new_registry(offline_libraries);
        registry.reload_assets().await;
        registry.load_temporary(script("dup.js", InlinePolicy::Download, 1, "first()")).await;
        registry.load_temporary(script("dup.js", InlinePolicy::Download, 900, "second()")).await;

        let downloads = registry.downloads(&Location::new("out"));
        let dups: Vec<_> = downloads
            .iter()
            .filter(|d| d.asset.file_name == "dup.js")
            .collect();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].asset.data.to_text(), "first()");
        assert_eq!(dups[0].target.path(), "out/lib/scripts/dup.js");
    }

    #[tokio::test]
    async fn test_filter_matrix_without_sidebars() {
        let (_dir, mut registry) = new_registry(|c| {
            offline_libraries(c);
            c.export.include_css = false;
            c.export.graph_view.enable = true;
            c.export.sidebar.enable = false;
        });
        registry.reload_assets().await;

        let downloads = registry.downloads(&Location::new("out"));
        assert!(!downloads.is_empty());
        assert!(downloads.iter().all(|d| d.asset.kind != AssetType::Style));
        assert!(downloads.iter().all(|d| d.asset.feature != Some(Feature::GraphView)));
        assert!(!registry.head_references().contains("graph-render-worker"));
    }

    #[tokio::test]
    async fn test_downloads_drop_inlined_types() {
        let (_dir, mut registry) = new_registry(|c| {
            offline_libraries(c);
            c.export.inline_css = true;
        });
        registry.reload_assets().await;

        let downloads = registry.downloads(&Location::new("out"));
        let names = names(&downloads);
        assert!(names.iter().all(|name| !name.ends_with(".css")));
        assert!(names.contains(&"webpage.js".to_string()));
        assert!(names.contains(&"graph-view.js".to_string()));
        assert!(names.contains(&"favicon.png".to_string()));
        assert!(!names.contains(&"pixi.js".to_string()));
        assert!(registry.head_references().contains("<style>"));
    }

    #[tokio::test]
    async fn test_online_libraries_stay_in_head() {
        let (_dir, mut registry) = new_registry(offline_libraries);
        registry.reload_assets().await;

        let head = registry.head_references();
        assert!(head.contains("https://cdnjs.cloudflare.com/ajax/libs/pixi.js/7.4.0/pixi.min.js"));
        assert!(!head.contains("minisearch"));
        let downloads = registry.downloads(&Location::new("out"));
        assert!(!names(&downloads).contains(&"pixi.js".to_string()));
    }

    #[tokio::test]
    async fn test_downloads_sorted_by_priority() {
        let (_dir, mut registry) = new_registry(offline_libraries);
        registry.reload_assets().await;

        let downloads = registry.downloads(&Location::new("out"));
        let priorities: Vec<_> = downloads.iter().map(|d| d.asset.load_priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by_key(|p| Reverse(*p));
        assert_eq!(priorities, sorted);
        assert!(downloads.iter().all(|d| d.target.path().starts_with("out/")));
    }

    #[tokio::test]
    async fn test_reload_evicts_temporaries_and_refreshes_dynamic() {
        let (dir, mut registry) = new_registry(offline_libraries);
        registry.reload_assets().await;
        registry.load_temporary(script("tmp.js", InlinePolicy::Download, 1, "t()")).await;
        assert_eq!(registry.assets_of_type(AssetType::Script).iter().filter(|a| a.record.file_name == "tmp.js").count(), 1);

        let snippets = dir.path().join(".obsidian/snippets");
        std::fs::create_dir_all(&snippets).unwrap();
        std::fs::write(snippets.join("wide.css"), ".wide{width:100%}").unwrap();
        std::fs::write(
            dir.path().join(".obsidian/appearance.json"),
            r#"{"enabledCssSnippets":["wide"]}"#,
        )
        .unwrap();

        registry.reload_assets().await;
        assert!(registry.assets_of_type(AssetType::Script).iter().all(|a| a.record.file_name != "tmp.js"));
        let snippets = registry
            .assets_of_type(AssetType::Style)
            .into_iter()
            .find(|a| a.record.file_name == "snippets.css")
            .unwrap();
        assert!(snippets.record.data.to_text().contains(".wide"));
    }

    #[tokio::test]
    async fn test_option_change_rewrites_unchanged_theme() {
        let (dir, mut registry) = new_registry(|c| {
            offline_libraries(c);
            c.export.style.theme = Some("Fonty".into());
        });
        let theme_dir = dir.path().join(".obsidian/themes/Fonty");
        std::fs::create_dir_all(theme_dir.join("fonts")).unwrap();
        std::fs::write(theme_dir.join("theme.css"), ".x{src:url('fonts/a.woff2')}").unwrap();
        std::fs::write(theme_dir.join("fonts/a.woff2"), b"wOF2data").unwrap();

        registry.reload_assets().await;
        let downloads = registry.downloads(&Location::new("out"));
        assert!(names(&downloads).contains(&"a.woff2".to_string()));

        let mut options = registry.options().clone();
        options.inline_fonts = true;
        registry.set_options(options);
        registry.reload_assets().await;

        let theme = registry
            .assets_of_type(AssetType::Style)
            .into_iter()
            .find(|a| a.record.file_name == "theme.css")
            .unwrap();
        let css = theme.record.data.to_text();
        assert!(css.contains("data:font/woff2"), "stale theme: {css}");
        assert!(!css.contains("../fonts/a.woff2"));
        let downloads = registry.downloads(&Location::new("out"));
        assert!(!names(&downloads).contains(&"a.woff2".to_string()));
    }

    #[tokio::test]
    async fn test_static_assets_dated_after_initialize() {
        let (_dir, mut registry) = new_registry(offline_libraries);
        registry.initialize().await;
        let main = registry
            .assets_of_inline_policy(InlinePolicy::AutoHead)
            .into_iter()
            .find(|a| a.record.file_name == "main-styles.css")
            .unwrap();
        assert!(main.record.source_stat.modified.is_some());
        assert!(!main.record.data.is_empty());
    }

    #[tokio::test]
    async fn test_children_flattened_into_queries() {
        let (dir, mut registry) = new_registry(offline_libraries);
        std::fs::create_dir_all(dir.path().join("fonts")).unwrap();
        std::fs::write(dir.path().join("fonts/inter.woff2"), b"wOF2data").unwrap();
        registry.reload_assets().await;

        let record = AssetRecord::new("fonts.css", AssetType::Style, InlinePolicy::AutoHead, Mutability::Temporary);
        let css = "@font-face{src:url('fonts/inter.woff2')}";
        let outcome = registry.load_temporary(Asset::new(record, BundledSource::text(css))).await;
        assert!(matches!(outcome, LoadOutcome::Loaded));

        let fonts = registry.assets_of_type(AssetType::Font);
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].record.data, AssetData::Bytes(b"wOF2data".to_vec()));
        let downloads = registry.downloads(&Location::new("out"));
        assert!(names(&downloads).contains(&"inter.woff2".to_string()));
    }

    #[tokio::test]
    async fn test_body_inlines() {
        let (_dir, mut registry) = new_registry(offline_libraries);
        registry.reload_assets().await;
        let body = registry.body_inlines();
        assert!(body.starts_with("<script defer>"));
        assert!(!body.contains("<style>"));

        let (_dir, mut registry) = new_registry(|c| {
            offline_libraries(c);
            c.export.include_js = false;
        });
        registry.reload_assets().await;
        assert_eq!(registry.body_inlines(), "");
    }

    #[tokio::test]
    async fn test_cancelled_session_yields_no_downloads() {
        let (_dir, mut registry) = new_registry(offline_libraries);
        registry.cancel_token().cancel();
        registry.reload_assets().await;
        assert!(registry.downloads(&Location::new("out")).is_empty());
    }
}
