//! Assets registered by every registry.

use super::source::{
    AppStylesSource, BundledSource, CustomHeadSource, FaviconSource, MathJaxSource,
    PluginStylesSource, RemoteSource, SnippetsSource, SupportedPluginsSource, ThemeSource,
    VariablesSource,
};
use super::{Asset, AssetRecord, AssetType, Feature, InlinePolicy, LoadMethod, Mutability};
use crate::embed::{css, js};

const TINYCOLOR_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/tinycolor/1.6.0/tinycolor.min.js";
const PIXI_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/pixi.js/7.4.0/pixi.min.js";
const MINISEARCH_URL: &str = "https://cdn.jsdelivr.net/npm/minisearch@6.3.0/dist/umd/index.min.js";

/// Head content outranks everything else.
const CUSTOM_HEAD_PRIORITY: i64 = 100_000_000_000;

fn record(name: &str, kind: AssetType, policy: InlinePolicy, mutability: Mutability) -> AssetRecord {
    AssetRecord::new(name, kind, policy, mutability)
}

fn bundled(record: AssetRecord, content: &'static str) -> Asset {
    Asset::new(record.with_minify(true), BundledSource::text(content))
}

fn shipped(name: &str, kind: AssetType, policy: InlinePolicy) -> AssetRecord {
    record(name, kind, policy, Mutability::Static)
}

fn library(name: &str, url: &'static str, feature: Feature) -> Asset {
    let record = shipped(name, AssetType::Script, InlinePolicy::AutoHead)
        .with_online_url(url)
        .with_feature(feature);
    Asset::new(record, RemoteSource::new(url))
}

fn dynamic_style(name: &str, method: LoadMethod, priority: i64) -> AssetRecord {
    record(name, AssetType::Style, InlinePolicy::AutoHead, Mutability::Dynamic)
        .with_minify(true)
        .with_load_method(method)
        .with_priority(priority)
}

/// The built-in set, in registration order.
pub fn assets() -> Vec<Asset> {
    use AssetType::{Html, Media, Script, Style};
    use InlinePolicy::{Auto, AutoHead, Download, Inline, InlineHead};

    vec![
        // bundled
        bundled(
            shipped("main-styles.css", Style, AutoHead).with_priority(4),
            css::MAIN_STYLES,
        ),
        bundled(
            shipped("deferred.css", Style, InlineHead)
                .with_load_method(LoadMethod::Defer)
                .with_priority(-1000),
            css::DEFERRED,
        ),
        bundled(shipped("webpage.js", Script, AutoHead), js::WEBPAGE),
        bundled(
            shipped("deferred.js", Script, InlineHead)
                .with_load_method(LoadMethod::Defer)
                .with_priority(-1000),
            js::DEFERRED,
        ),
        bundled(
            shipped("theme-load.js", Script, Inline).with_load_method(LoadMethod::Defer),
            js::THEME_LOAD,
        ),
        bundled(
            shipped("graph-view.js", Script, Download).with_feature(Feature::GraphView),
            js::GRAPH_VIEW,
        ),
        bundled(
            shipped("graph-render-worker.js", Script, AutoHead).with_feature(Feature::GraphView),
            js::GRAPH_RENDER_WORKER,
        ),
        // libraries
        library("tinycolor.js", TINYCOLOR_URL, Feature::GraphView),
        library("pixi.js", PIXI_URL, Feature::GraphView),
        library("minisearch.js", MINISEARCH_URL, Feature::Search),
        // vault and host styles
        Asset::new(
            dynamic_style("obsidian.css", LoadMethod::Default, 10),
            AppStylesSource,
        ),
        Asset::new(
            dynamic_style("other-plugins.css", LoadMethod::Async, 9),
            PluginStylesSource::default(),
        ),
        Asset::new(
            dynamic_style("theme.css", LoadMethod::Default, 8),
            ThemeSource::default(),
        ),
        Asset::new(
            dynamic_style("snippets.css", LoadMethod::Async, 20),
            SnippetsSource,
        ),
        Asset::new(
            dynamic_style("global-variable-styles.css", LoadMethod::Async, 6),
            VariablesSource,
        ),
        Asset::new(
            dynamic_style("supported-plugins.css", LoadMethod::Async, 5),
            SupportedPluginsSource,
        ),
        Asset::new(
            record("mathjax.css", Style, Inline, Mutability::Dynamic).with_minify(true),
            MathJaxSource::default(),
        ),
        // head
        Asset::new(
            record("favicon.png", Media, AutoHead, Mutability::Dynamic).at_root(),
            FaviconSource,
        ),
        Asset::new(
            record("custom-head-content.html", Html, Auto, Mutability::Dynamic)
                .with_load_method(LoadMethod::Default)
                .with_priority(CUSTOM_HEAD_PRIORITY),
            CustomHeadSource,
        ),
    ]
}
