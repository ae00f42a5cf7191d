//! Asset record: identity, content and emission settings of one asset.
//!
//! An [`Asset`] pairs a plain [`AssetRecord`] with the [`AssetLoader`] that
//! knows how to (re)produce its content. Loading always runs the shared
//! finishing step afterwards:
//!
//! 1. compute the output target from file name and type
//! 2. for stylesheets, discover and load child assets, then rewrite
//!    host-application selectors
//! 3. minify when both the asset and the options allow it

use std::borrow::Cow;
use std::sync::LazyLock;
use std::time::SystemTime;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use futures::future::BoxFuture;
use regex::Regex;

use super::error::{AssetError, SkipReason};
use super::source::{AssetLoader, LoadStatus};
use super::{AssetType, Feature, InlinePolicy, LoadContext, LoadMethod, Mutability};
use crate::config::ExportOptions;
use crate::core::Location;
use crate::utils::mime;
use crate::{debug, log};

// ============================================================================
// content
// ============================================================================

/// Asset content, possibly not yet loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssetData {
    #[default]
    Empty,
    Text(String),
    Bytes(Vec<u8>),
}

impl AssetData {
    /// Empty text counts as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Content as text, decoding bytes lossily.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.as_bytes())
    }
}

impl From<String> for AssetData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for AssetData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for AssetData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Modification time and size of the content's origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStat {
    pub modified: Option<SystemTime>,
    pub size: u64,
}

/// Outcome of child discovery for one stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildReport {
    pub succeeded: usize,
    pub skipped: Vec<(String, SkipReason)>,
}

// ============================================================================
// record
// ============================================================================

/// Everything known about an asset except how to load it.
#[derive(Debug)]
pub struct AssetRecord {
    pub file_name: String,
    pub kind: AssetType,
    pub data: AssetData,
    /// Originating file, when the content comes from disk.
    pub source: Option<Location>,
    pub source_stat: SourceStat,
    /// Output-relative target, recomputed on every load.
    pub target: Location,
    pub mutability: Mutability,
    pub inline_policy: InlinePolicy,
    pub load_method: LoadMethod,
    /// Higher loads and renders first.
    pub load_priority: i64,
    pub minify: bool,
    pub online_url: Option<String>,
    pub feature: Option<Feature>,
    pub children: Vec<Asset>,
    pub child_report: ChildReport,
    pub loaded: bool,
    /// Declared MIME type, overriding the one implied by the extension.
    pub mime: Option<String>,
    /// Target sits at the output root instead of the library folder.
    pub at_root: bool,
}

impl AssetRecord {
    pub fn new(
        file_name: impl Into<String>,
        kind: AssetType,
        inline_policy: InlinePolicy,
        mutability: Mutability,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            data: AssetData::Empty,
            source: None,
            source_stat: SourceStat::default(),
            target: Location::empty(),
            mutability,
            inline_policy,
            load_method: LoadMethod::Async,
            load_priority: 100,
            minify: false,
            online_url: None,
            feature: None,
            children: Vec::new(),
            child_report: ChildReport::default(),
            loaded: false,
            mime: None,
            at_root: false,
        }
    }

    pub fn with_load_method(mut self, method: LoadMethod) -> Self {
        self.load_method = method;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.load_priority = priority;
        self
    }

    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    pub fn with_online_url(mut self, url: impl Into<String>) -> Self {
        self.online_url = Some(url.into());
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn at_root(mut self) -> Self {
        self.at_root = true;
        self
    }

    /// Path other content should use to refer to this asset.
    ///
    /// Inlined assets have no path. Without a referrer the target itself
    /// (relative to the output root) is returned.
    pub fn asset_path(&self, referrer: Option<&Location>, options: &ExportOptions) -> Location {
        if self.inline_policy.is_inline(self.kind, options) {
            return Location::empty();
        }
        match referrer {
            Some(from) => Location::relative(from, &self.target),
            None => self.target.clone(),
        }
    }

    /// Content as a base64 `data:` URI.
    pub fn data_uri(&self) -> String {
        let mime = match &self.mime {
            Some(declared) if !declared.is_empty() => mime::essence(declared).to_string(),
            _ => {
                let ext = self.target.extension().to_ascii_lowercase();
                let ext = if ext.is_empty() {
                    Location::new(&self.file_name).extension().to_ascii_lowercase()
                } else {
                    ext
                };
                match mime::from_extension(&ext) {
                    mime::types::OCTET_STREAM if self.kind.is_text() => "text/plain".to_string(),
                    known => mime::essence(known).to_string(),
                }
            }
        };
        format!("data:{mime};base64,{}", self.data.to_base64())
    }

    fn compute_target(&self, ctx: &LoadContext) -> Location {
        if !self.at_root {
            return ctx.layout.target_for(self.kind, &self.file_name);
        }
        let mut target = Location::new(&self.file_name);
        if ctx.options.slugify_paths {
            target.slugify();
        }
        target
    }

    /// Shared finishing step run after every successful source load.
    async fn finalize(&mut self, ctx: &LoadContext) {
        self.target = self.compute_target(ctx);
        self.children.clear();
        self.child_report = ChildReport::default();

        if self.kind == AssetType::Style && matches!(self.data, AssetData::Text(_)) {
            let text = super::style::rewrite_children(self, ctx).await;
            self.data = AssetData::Text(replace_selectors(&text));
        }

        if self.minify
            && ctx.options.minify
            && let AssetData::Text(text) = &self.data
        {
            self.data = AssetData::Text(super::minify::minify(self.kind, text));
        }

        self.loaded = true;
    }
}

/// Host-application selectors and the exported-page selectors they become.
static SELECTOR_REPLACEMENTS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\[href", "[data-href"),
        (r"\.workspace-leaf-content", ".leaf-content"),
        (r"\.leaf>.leaf-content", ".leaf .leaf-content"),
        (r"\.markdown-reading-view", "#center-content"),
        (
            r"\.markdown-preview-sizer|\.markdown-preview-section",
            ".markdown-preview-sizer",
        ),
        (r"\.horizontal-main-container|\.workspace", "#main-horizontal"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Some((Regex::new(pattern).ok()?, replacement)))
    .collect()
});

fn replace_selectors(css: &str) -> String {
    SELECTOR_REPLACEMENTS
        .iter()
        .fold(css.to_string(), |text, (pattern, replacement)| {
            pattern.replace_all(&text, *replacement).into_owned()
        })
}

// ============================================================================
// asset
// ============================================================================

/// Result of one load call.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    /// Source reported no change; previous content kept.
    Unchanged,
    /// Content cleared; the registry's filters drop the asset.
    Failed(AssetError),
}

impl LoadOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A record together with the loader that produces its content.
pub struct Asset {
    pub record: AssetRecord,
    loader: Box<dyn AssetLoader>,
}

impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("file_name", &self.record.file_name)
            .field("kind", &self.record.kind)
            .field("target", &self.record.target.path())
            .finish_non_exhaustive()
    }
}

impl Asset {
    pub fn new(record: AssetRecord, loader: impl AssetLoader + 'static) -> Self {
        Self {
            record,
            loader: Box::new(loader),
        }
    }

    /// (Re)load content from the source, then finalize it.
    ///
    /// Never fails outright: errors clear the content and are returned as
    /// [`LoadOutcome::Failed`]. Boxed because stylesheet children load
    /// through this same path.
    pub fn load<'a>(&'a mut self, ctx: &'a LoadContext) -> BoxFuture<'a, LoadOutcome> {
        async move {
            let status = if ctx.cancel.is_cancelled() {
                Err(AssetError::Cancelled)
            } else {
                self.loader.load(&mut self.record, ctx).await
            };

            match status {
                Ok(LoadStatus::Unchanged) if self.record.loaded => LoadOutcome::Unchanged,
                Ok(_) => {
                    self.record.finalize(ctx).await;
                    LoadOutcome::Loaded
                }
                Err(err) => {
                    self.record.target = self.record.compute_target(ctx);
                    self.record.data = AssetData::Empty;
                    self.record.children.clear();
                    self.record.loaded = false;
                    if err.is_quiet() || self.record.mutability == Mutability::Child {
                        debug!("assets"; "{}: {}", self.record.file_name, err);
                    } else {
                        log!("assets"; "{}: {}", self.record.file_name, err);
                    }
                    LoadOutcome::Failed(err)
                }
            }
        }
        .boxed()
    }

    /// Markup for this asset under the current options.
    pub fn html(&self, options: &ExportOptions) -> String {
        if self.record.inline_policy == InlinePolicy::None {
            return String::new();
        }
        self.loader
            .html(&self.record, options)
            .unwrap_or_else(|| super::html::render(&self.record, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::source::BundledSource;
    use crate::asset::test_context;

    #[test]
    fn test_asset_data() {
        assert!(AssetData::Empty.is_empty());
        assert!(AssetData::from("").is_empty());
        assert!(!AssetData::from(vec![0u8]).is_empty());
        assert_eq!(AssetData::from("hi").to_base64(), "aGk=");
        assert_eq!(AssetData::from(b"ok".to_vec()).to_text(), "ok");
    }

    #[test]
    fn test_replace_selectors() {
        let css = ".workspace-leaf-content a[href] {} .markdown-preview-section {}";
        assert_eq!(
            replace_selectors(css),
            ".leaf-content a[data-href] {} .markdown-preview-sizer {}"
        );
        assert_eq!(
            replace_selectors(".horizontal-main-container {}"),
            "#main-horizontal {}"
        );
    }

    #[test]
    fn test_data_uri_uses_extension_mime() {
        let mut record = AssetRecord::new("dot.png", AssetType::Media, InlinePolicy::Auto, Mutability::Child);
        record.data = AssetData::Bytes(vec![1, 2, 3]);
        assert_eq!(record.data_uri(), "data:image/png;base64,AQID");

        let record = record.with_mime("image/svg+xml; charset=utf-8");
        assert!(record.data_uri().starts_with("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn test_load_computes_target_and_is_idempotent() {
        let (_dir, ctx) = test_context(|_| {});
        let record = AssetRecord::new("Main Styles.css", AssetType::Style, InlinePolicy::AutoHead, Mutability::Static)
            .with_minify(true);
        let mut asset = Asset::new(record, BundledSource::text("body {\n  color: red;\n}\n"));

        assert!(matches!(asset.load(&ctx).await, LoadOutcome::Loaded));
        let first = asset.record.data.clone();
        assert_eq!(asset.record.target.path(), "lib/styles/main-styles.css");
        assert!(!first.to_text().contains('\n'));

        asset.load(&ctx).await;
        assert_eq!(asset.record.data, first);
    }

    #[tokio::test]
    async fn test_asset_path_relative_to_referrer() {
        let (_dir, ctx) = test_context(|_| {});
        let record = AssetRecord::new("font.woff2", AssetType::Font, InlinePolicy::Auto, Mutability::Child);
        let mut asset = Asset::new(record, BundledSource::bytes(vec![1]));
        asset.load(&ctx).await;

        let referrer = Location::new("lib/styles/theme.css");
        let path = asset.record.asset_path(Some(&referrer), &ctx.options);
        assert_eq!(path.path(), "../fonts/font.woff2");

        let mut inline = (*ctx.options).clone();
        inline.inline_fonts = true;
        assert!(asset.record.asset_path(Some(&referrer), &inline).is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_load_clears_data() {
        let (_dir, ctx) = test_context(|_| {});
        let record = AssetRecord::new("a.js", AssetType::Script, InlinePolicy::Auto, Mutability::Static);
        let mut asset = Asset::new(record, BundledSource::text("let a = 1;"));
        asset.load(&ctx).await;
        assert!(!asset.record.data.is_empty());

        ctx.cancel.cancel();
        let outcome = asset.load(&ctx).await;
        assert!(matches!(outcome, LoadOutcome::Failed(AssetError::Cancelled)));
        assert!(asset.record.data.is_empty());
    }
}
