//! Sources backed by the host's live stylesheets.

use async_trait::async_trait;

use super::{AssetLoader, LoadStatus, RuleFilter, StyleSheet};
use crate::asset::{AssetData, AssetError, AssetRecord, LoadContext};
use crate::debug;
use crate::embed;
use crate::utils::hash;

const APP_FILTER: RuleFilter = RuleFilter {
    always_discard: &[
        "cm-", "cm6", "workspace-", ":root", "CodeMirror", "xfa", "modal", "@-webkit", "leaf",
        "plugins", "-split", "empty-state", "search-result-", "mobile", "tablet", "phone",
        "linux", "macos", "mod-windows", "is-frameless",
    ],
    discard: &[
        "ghost", "pdf", "annotation", "data-main-rotation", "spread", "load", "setting",
        "filter", "decorator", "node-insert", "app-container", "dictionary", "status",
        "windows", "titlebar", "source", "#main-horizontal", "menu", "message", "suggestion",
        "prompt", "tab", "HyperMD", "workspace", "publish", "backlink", "sync", "vault",
        "textLayer", "header", "rename", "edit", "progress", "native", "aria", "tooltip",
        "drop", "sidebar", "is-hidden-frameless", "obsidian-app", "show-view-header",
        "is-maximized", "is-translucent", "community", "Layer",
    ],
    keep: &[
        "tree", "scrollbar", "input[type", "table", "markdown-rendered", "css-settings-manager",
        "inline-embed", "background", "token", "-plugin-",
    ],
};

/// The application stylesheet (`app.css`), stripped of editor and chrome
/// rules, followed by the exported-page overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppStylesSource;

#[async_trait]
impl AssetLoader for AppStylesSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let sheets = ctx.styles.sheets().await?;
        let app = sheets
            .iter()
            .find(|sheet| sheet.href.as_deref().is_some_and(|href| href.contains("app.css")));

        let mut css = app
            .map(|sheet| APP_FILTER.apply(&sheet.rules))
            .unwrap_or_default();
        css.push_str(embed::css::APP_OVERRIDES);
        record.data = AssetData::Text(css);
        Ok(LoadStatus::Changed)
    }
}

/// Owner ids of sheets injected by plugins the export supports.
const SUPPORTED_OWNERS: &[&str] = &[
    "ADMONITIONS_CUSTOM_STYLE_SHEET",
    "css-settings-manager",
    "colored-tags-wrangler",
    "highlightr-styles",
];

fn is_svelte(sheet: &StyleSheet) -> bool {
    if sheet.owner_id.as_deref().is_some_and(|id| id.contains("svelte")) {
        return true;
    }
    let text = sheet.text();
    let head = match text.char_indices().nth(1000) {
        Some((end, _)) => &text[..end],
        None => &text,
    };
    head.contains(".svelte-")
}

/// Sheets of supported plugins, plus svelte component sheets when enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportedPluginsSource;

#[async_trait]
impl AssetLoader for SupportedPluginsSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let svelte = ctx.options.style.svelte_css;
        let mut css = String::new();
        for sheet in ctx.styles.sheets().await? {
            let supported = sheet
                .owner_id
                .as_deref()
                .is_some_and(|id| SUPPORTED_OWNERS.contains(&id));
            if supported || (svelte && is_svelte(&sheet)) {
                debug!("assets"; "including stylesheet {}", sheet.owner_id.as_deref().unwrap_or("?"));
                css.push_str(&sheet.text());
                css.push_str("\n/* ---- */\n");
            }
        }
        record.data = AssetData::Text(css);
        Ok(LoadStatus::Changed)
    }
}

const MATHJAX_OWNER: &str = "MJX-CHTML-styles";

/// The MathJax sheet. Only re-serialized when its change marker moves.
#[derive(Debug, Clone, Default)]
pub struct MathJaxSource {
    last_marker: Option<(String, u64)>,
}

#[async_trait]
impl AssetLoader for MathJaxSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let sheets = ctx.styles.sheets().await?;
        let Some(sheet) = sheets.iter().find(|sheet| sheet.owned_by(MATHJAX_OWNER)) else {
            self.last_marker = None;
            record.data = AssetData::Empty;
            return Ok(LoadStatus::Changed);
        };

        let text = sheet.text();
        let marker = (
            sheet
                .change_marker
                .clone()
                .unwrap_or_else(|| hash::fingerprint(&text)),
            ctx.generation,
        );
        if self.last_marker.as_ref() == Some(&marker) {
            return Ok(LoadStatus::Unchanged);
        }

        self.last_marker = Some(marker);
        record.data = AssetData::Text(text);
        Ok(LoadStatus::Changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{
        Asset, AssetType, FixedStyleSource, InlinePolicy, LoadOutcome, Mutability,
        test_context_with,
    };
    use std::sync::Arc;

    fn sheet(href: Option<&str>, owner: Option<&str>, rules: &[&str]) -> StyleSheet {
        StyleSheet {
            href: href.map(str::to_string),
            owner_id: owner.map(str::to_string),
            rules: rules.iter().map(|r| r.to_string()).collect(),
            change_marker: None,
        }
    }

    fn style(name: &str, loader: impl AssetLoader + 'static) -> Asset {
        let record = AssetRecord::new(name, AssetType::Style, InlinePolicy::AutoHead, Mutability::Dynamic);
        Asset::new(record, loader)
    }

    #[tokio::test]
    async fn test_app_styles_filtered() {
        let styles = FixedStyleSource::new(vec![
            sheet(Some("app://obsidian.md/other.css"), None, &[".x{}"]),
            sheet(
                Some("app://obsidian.md/app.css"),
                None,
                &[".cm-line{}", ".markdown-rendered p{}", ".menu{}", ".callout{}"],
            ),
        ]);
        let (_dir, ctx) = test_context_with(Arc::new(styles), |_| {});
        let mut asset = style("obsidian.css", AppStylesSource);
        asset.load(&ctx).await;

        let css = asset.record.data.to_text();
        assert!(css.starts_with(".markdown-rendered p{}\n.callout{}\n"));
        assert!(!css.contains(".cm-line"));
        assert!(!css.contains(".menu"));
        assert!(!css.contains(".x{}"));
    }

    #[tokio::test]
    async fn test_supported_plugins_and_svelte() {
        let styles = FixedStyleSource::new(vec![
            sheet(None, Some("highlightr-styles"), &[".hl{}"]),
            sheet(None, Some("random"), &[".r{}"]),
            sheet(None, Some("style-1"), &[".card.svelte-1x2y{}"]),
        ]);
        let styles = Arc::new(styles);

        let (_dir, ctx) = test_context_with(styles.clone(), |_| {});
        let mut asset = style("supported-plugins.css", SupportedPluginsSource);
        asset.load(&ctx).await;
        let css = asset.record.data.to_text().into_owned();
        assert!(css.contains(".hl{}"));
        assert!(!css.contains(".r{}"));
        assert!(!css.contains("svelte"));

        let (_dir, ctx) = test_context_with(styles, |c| c.export.style.svelte_css = true);
        asset.load(&ctx).await;
        assert!(asset.record.data.to_text().contains(".card.svelte-1x2y{}"));
    }

    #[tokio::test]
    async fn test_mathjax_change_marker() {
        let mut mathjax = sheet(None, Some(MATHJAX_OWNER), &["mjx-c{}"]);
        mathjax.change_marker = Some("1".into());
        let (_dir, ctx) = test_context_with(Arc::new(FixedStyleSource::new(vec![mathjax])), |_| {});

        let mut asset = style("mathjax.css", MathJaxSource::default());
        assert!(matches!(asset.load(&ctx).await, LoadOutcome::Loaded));
        assert!(matches!(asset.load(&ctx).await, LoadOutcome::Unchanged));
        assert_eq!(asset.record.data.to_text(), "mjx-c{}\n");
    }
}
