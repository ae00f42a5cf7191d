//! Sources that read files from the vault and its settings folder.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use super::{AssetLoader, LoadStatus, RuleFilter, split_rules};
use crate::asset::{AssetData, AssetError, AssetRecord, LoadContext, SourceStat, html};
use crate::config::ExportOptions;
use crate::core::{Location, PathRules};
use crate::utils::{fs, mime};
use crate::{debug, embed, log};

/// The parts of `appearance.json` the export cares about.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Appearance {
    css_theme: Option<String>,
    enabled_css_snippets: Vec<String>,
}

impl Appearance {
    /// Missing or unreadable settings count as defaults.
    async fn read(config_dir: &Path) -> Self {
        let path = config_dir.join("appearance.json");
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                log!("assets"; "ignoring malformed {}: {}", path.display(), err);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

async fn stat(path: &Path) -> SourceStat {
    match tokio::fs::metadata(path).await {
        Ok(meta) => SourceStat {
            modified: meta.modified().ok(),
            size: meta.len(),
        },
        Err(_) => SourceStat::default(),
    }
}

fn source_location(path: &Path) -> Option<Location> {
    Some(Location::new(&path.to_string_lossy()))
}

/// Resolve a vault-relative configured path.
fn in_vault(configured: &str, ctx: &LoadContext) -> Location {
    Location::new_in(configured, &ctx.vault.root.to_string_lossy())
}

// ============================================================================
// theme
// ============================================================================

const DEFAULT_THEME: &str = "Default";
const DEFAULT_THEME_CSS: &str = "/* Using default theme. */";

const THEME_FILTER: RuleFilter = RuleFilter {
    always_discard: &[],
    discard: &["cm-", "cm6", "CodeMirror", "pdf"],
    keep: &[
        "@media", "tree", "scrollbar", "input[type", "table", "markdown-rendered", "inline-embed",
    ],
};

/// The active theme's `theme.css`, without editor-only rules.
#[derive(Debug, Clone, Default)]
pub struct ThemeSource {
    /// Theme name, file mtime and options generation of the last load.
    last: Option<(String, Option<SystemTime>, u64)>,
}

#[async_trait]
impl AssetLoader for ThemeSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let configured = ctx.options.style.theme.clone().filter(|t| !t.trim().is_empty());
        let name = match configured {
            Some(name) => name,
            None => Appearance::read(&ctx.vault.config_dir)
                .await
                .css_theme
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_THEME.to_string()),
        };

        let path = ctx
            .vault
            .config_dir
            .join("themes")
            .join(&name)
            .join("theme.css");
        let key = (name.clone(), fs::modified(&path).await, ctx.generation);
        if self.last.as_ref() == Some(&key) && !record.data.is_empty() {
            debug!("assets"; "theme {} unchanged", name);
            return Ok(LoadStatus::Unchanged);
        }

        record.source = None;
        record.source_stat = SourceStat::default();
        let css = if name == DEFAULT_THEME {
            DEFAULT_THEME_CSS.to_string()
        } else {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    record.source = source_location(&path);
                    record.source_stat = stat(&path).await;
                    THEME_FILTER.apply(&split_rules(&content))
                }
                Err(_) => {
                    log!("assets"; "cannot find theme at {}", path.display());
                    String::new()
                }
            }
        };

        debug!("assets"; "theme {} loaded", name);
        self.last = Some(key);
        record.data = AssetData::Text(css);
        Ok(LoadStatus::Changed)
    }
}

// ============================================================================
// snippets
// ============================================================================

static PUBLISH_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^publish ").ok());

/// Enabled CSS snippets, concatenated.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetsSource;

#[async_trait]
impl AssetLoader for SnippetsSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let names = match &ctx.options.style.snippets {
            Some(names) => names.clone(),
            None => {
                Appearance::read(&ctx.vault.config_dir)
                    .await
                    .enabled_css_snippets
            }
        };

        let dir = ctx.vault.config_dir.join("snippets");
        let mut css = String::from("\n");
        for name in names {
            let path = dir.join(format!("{name}.css"));
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    css.push_str(&content);
                    css.push('\n');
                }
                Err(_) => debug!("assets"; "snippet {} not found", name),
            }
        }

        // `publish` rules need to outrank the exported page's own selectors.
        if let Some(prefix) = PUBLISH_PREFIX.as_ref() {
            css = prefix
                .replace_all(&css, "html body[class].publish ")
                .into_owned();
        }
        record.data = AssetData::Text(css);
        Ok(LoadStatus::Changed)
    }
}

// ============================================================================
// plugin styles
// ============================================================================

/// `styles.css` of every plugin listed in `style.plugin_css`.
#[derive(Debug, Clone, Default)]
pub struct PluginStylesSource {
    last: Option<(Vec<String>, u64)>,
}

impl PluginStylesSource {
    fn styles_path(plugins: &Path, id: &str) -> PathBuf {
        plugins.join(id.replace('\n', "")).join("styles.css")
    }
}

#[async_trait]
impl AssetLoader for PluginStylesSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let ids = &ctx.options.style.plugin_css;
        if self
            .last
            .as_ref()
            .is_some_and(|(last, generation)| last == ids && *generation == ctx.generation)
        {
            return Ok(LoadStatus::Unchanged);
        }

        let mut css = String::new();
        for id in ids.iter().filter(|id| !id.trim().is_empty()) {
            let path = Self::styles_path(&ctx.vault.plugins, id);
            if let Ok(style) = tokio::fs::read_to_string(&path).await {
                debug!("assets"; "plugin style {} ({} bytes)", id, style.len());
                css.push_str(&style);
            }
        }

        self.last = Some((ids.clone(), ctx.generation));
        record.data = AssetData::Text(css);
        Ok(LoadStatus::Changed)
    }
}

// ============================================================================
// favicon
// ============================================================================

/// Configured site icon, or the bundled one when none is configured or
/// the configured file cannot be read.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaviconSource;

impl FaviconSource {
    fn use_default(record: &mut AssetRecord) {
        record.file_name = "favicon.png".to_string();
        record.data = AssetData::Bytes(embed::DEFAULT_ICON.to_vec());
        record.source = None;
        record.source_stat = SourceStat::default();
    }
}

#[async_trait]
impl AssetLoader for FaviconSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let configured = ctx.options.head.favicon.trim();
        if configured.is_empty() {
            Self::use_default(record);
            return Ok(LoadStatus::Changed);
        }

        let location = in_vault(configured, ctx);
        let path = location.absoluted().to_std_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let ext = match location.extension().to_ascii_lowercase() {
                    ext if !ext.is_empty() => ext,
                    _ => mime::sniff(&bytes).map_or("png", |(ext, _)| ext).to_string(),
                };
                record.file_name = format!("favicon.{ext}");
                record.source = source_location(&path);
                record.source_stat = stat(&path).await;
                record.data = AssetData::Bytes(bytes);
            }
            Err(err) => {
                log!("assets"; "favicon {}: {}, using the bundled icon", path.display(), err);
                Self::use_default(record);
            }
        }
        Ok(LoadStatus::Changed)
    }

    fn html(&self, record: &AssetRecord, options: &ExportOptions) -> Option<String> {
        let href = if options.inline_media {
            record.data_uri()
        } else {
            html::reference_href(record, options)
        };
        Some(format!("<link rel=\"icon\" href=\"{href}\">"))
    }
}

// ============================================================================
// custom head
// ============================================================================

/// HTML file spliced into every page head.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomHeadSource;

#[async_trait]
impl AssetLoader for CustomHeadSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let configured = ctx.options.head.custom_head.trim();
        record.source = None;
        record.source_stat = SourceStat::default();
        if configured.is_empty() {
            record.data = AssetData::Empty;
            return Ok(LoadStatus::Changed);
        }

        let location = in_vault(configured, ctx);
        fs::validate(&location, &PathRules::existing_file(&["html"]))
            .await
            .map_err(|reason| AssetError::Validation {
                path: configured.to_string(),
                reason,
            })?;

        let path = location.absoluted().to_std_path();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| AssetError::io(&path, err))?;
        record.source = source_location(&path);
        record.source_stat = stat(&path).await;
        record.data = AssetData::Text(content);
        Ok(LoadStatus::Changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, AssetType, InlinePolicy, LoadOutcome, Mutability, test_context};
    use crate::core::PathViolation;

    fn asset(name: &str, kind: AssetType, loader: impl AssetLoader + 'static) -> Asset {
        let record = AssetRecord::new(name, kind, InlinePolicy::AutoHead, Mutability::Dynamic);
        Asset::new(record, loader)
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_theme_default_and_missing() {
        let (_dir, ctx) = test_context(|_| {});
        let mut theme = asset("theme.css", AssetType::Style, ThemeSource::default());
        theme.load(&ctx).await;
        assert_eq!(theme.record.data.to_text(), DEFAULT_THEME_CSS);

        let (_dir, ctx) = test_context(|c| c.export.style.theme = Some("Gone".into()));
        let mut theme = asset("theme.css", AssetType::Style, ThemeSource::default());
        theme.load(&ctx).await;
        assert!(theme.record.data.is_empty());
    }

    #[tokio::test]
    async fn test_theme_from_appearance_filtered_and_cached() {
        let (dir, ctx) = test_context(|_| {});
        write(dir.path(), ".obsidian/appearance.json", r#"{"cssTheme":"Minimal"}"#);
        write(
            dir.path(),
            ".obsidian/themes/Minimal/theme.css",
            ".cm-line{color:red} .callout{color:blue} .pdf table{}",
        );

        let mut theme = asset("theme.css", AssetType::Style, ThemeSource::default());
        assert!(matches!(theme.load(&ctx).await, LoadOutcome::Loaded));
        assert_eq!(
            theme.record.data.to_text(),
            ".callout{color:blue}\n.pdf table{}\n"
        );
        assert!(theme.record.source_stat.modified.is_some());
        assert!(matches!(theme.load(&ctx).await, LoadOutcome::Unchanged));
    }

    #[tokio::test]
    async fn test_snippets_publish_prefix() {
        let (dir, ctx) = test_context(|_| {});
        write(
            dir.path(),
            ".obsidian/appearance.json",
            r#"{"enabledCssSnippets":["wide","missing"]}"#,
        );
        write(dir.path(), ".obsidian/snippets/wide.css", "publish .x{}\n.y{}");

        let mut snippets = asset("snippets.css", AssetType::Style, SnippetsSource);
        snippets.load(&ctx).await;
        assert_eq!(
            snippets.record.data.to_text(),
            "\nhtml body[class].publish .x{}\n.y{}\n"
        );
    }

    #[tokio::test]
    async fn test_plugin_styles() {
        let (dir, mut ctx) = test_context(|c| {
            c.export.style.plugin_css = vec!["banners".into(), " ".into(), "absent".into()];
        });
        write(dir.path(), ".obsidian/plugins/banners/styles.css", ".banner{}");

        let mut plugins = asset("other-plugins.css", AssetType::Style, PluginStylesSource::default());
        assert!(matches!(plugins.load(&ctx).await, LoadOutcome::Loaded));
        assert_eq!(plugins.record.data.to_text(), ".banner{}");
        assert!(matches!(plugins.load(&ctx).await, LoadOutcome::Unchanged));

        // Same plugin list, new options: url rewriting has to run again.
        let options = (*ctx.options).clone();
        ctx.set_options(options);
        assert!(matches!(plugins.load(&ctx).await, LoadOutcome::Loaded));
    }

    fn favicon() -> Asset {
        let record = AssetRecord::new("favicon.png", AssetType::Media, InlinePolicy::AutoHead, Mutability::Dynamic)
            .at_root();
        Asset::new(record, FaviconSource)
    }

    #[tokio::test]
    async fn test_favicon_fallback() {
        let (_dir, ctx) = test_context(|c| c.export.head.favicon = "missing.ico".into());
        let mut icon = favicon();
        icon.load(&ctx).await;
        assert_eq!(icon.record.data.as_bytes(), embed::DEFAULT_ICON);
        assert_eq!(icon.record.target.path(), "favicon.png");
    }

    #[tokio::test]
    async fn test_favicon_configured() {
        let (dir, ctx) = test_context(|c| c.export.head.favicon = "icons/site.svg".into());
        write(dir.path(), "icons/site.svg", "<svg/>");
        let mut icon = favicon();
        icon.load(&ctx).await;
        assert_eq!(icon.record.target.path(), "favicon.svg");
        assert_eq!(icon.html(&ctx.options), "<link rel=\"icon\" href=\"favicon.svg\">");

        let mut inline = (*ctx.options).clone();
        inline.inline_media = true;
        assert_eq!(
            icon.html(&inline),
            "<link rel=\"icon\" href=\"data:image/svg+xml;base64,PHN2Zy8+\">"
        );
    }

    #[tokio::test]
    async fn test_custom_head_validation() {
        let (dir, ctx) = test_context(|c| c.export.head.custom_head = "head.txt".into());
        write(dir.path(), "head.txt", "<meta>");
        let mut head = asset("custom-head-content.html", AssetType::Html, CustomHeadSource);
        let outcome = head.load(&ctx).await;
        assert!(matches!(
            outcome,
            LoadOutcome::Failed(AssetError::Validation {
                reason: PathViolation::Extension(_),
                ..
            })
        ));
        assert!(head.record.data.is_empty());

        let (dir, ctx) = test_context(|c| c.export.head.custom_head = "head.html".into());
        write(dir.path(), "head.html", "<meta name=\"x\">");
        head.load(&ctx).await;
        assert_eq!(head.record.data.to_text(), "<meta name=\"x\">");
        assert_eq!(head.record.target.path(), "lib/html/custom-head-content.html");
    }
}
