//! Asset classification.

use clap::ValueEnum;

use crate::config::ExportOptions;

/// What an asset is, which decides its folder and its HTML form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum AssetType {
    Style,
    Script,
    Media,
    Html,
    Font,
    Other,
}

impl AssetType {
    /// Classify a (dot-less) file extension. Unknown extensions are `Other`.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "avif" | "bmp" | "ico" | "mp4"
            | "webm" | "ogg" | "mp3" | "wav" | "flac" | "aac" | "m4a" | "opus" => Self::Media,
            "js" | "ts" => Self::Script,
            "css" | "scss" | "sass" | "less" => Self::Style,
            "html" | "htm" => Self::Html,
            "ttf" | "woff" | "woff2" | "eot" | "otf" => Self::Font,
            _ => Self::Other,
        }
    }

    /// Whether content of this type is handled as text.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Style | Self::Script | Self::Html)
    }
}

/// Where an asset ends up relative to the pages that use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlinePolicy {
    /// Inline or download depending on the type's `inline_*` option,
    /// referenced from the page head.
    AutoHead,
    /// Inline or download depending on the type's `inline_*` option.
    Auto,
    /// Always embedded where it is used.
    Inline,
    /// Always a standalone file.
    Download,
    /// Always a standalone file, referenced from the page head.
    DownloadHead,
    /// Always embedded into the page head.
    InlineHead,
    /// Never emitted.
    None,
}

impl InlinePolicy {
    /// Content is embedded into the page.
    pub fn is_inline(self, kind: AssetType, options: &ExportOptions) -> bool {
        match self {
            Self::Inline | Self::InlineHead => true,
            Self::Auto | Self::AutoHead => options.inlines(kind),
            Self::Download | Self::DownloadHead | Self::None => false,
        }
    }

    /// Content is a standalone file the page refers to.
    pub fn is_reference(self, kind: AssetType, options: &ExportOptions) -> bool {
        match self {
            Self::Download | Self::DownloadHead => true,
            Self::Auto | Self::AutoHead => !options.inlines(kind),
            Self::Inline | Self::InlineHead | Self::None => false,
        }
    }

    /// Contributes to the shared head fragment.
    pub fn in_head(self) -> bool {
        matches!(self, Self::DownloadHead | Self::AutoHead | Self::InlineHead)
    }
}

/// How often an asset's content can change within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    /// Never changes; loaded once.
    Static,
    /// Recomputed on every export.
    Dynamic,
    /// Exists for one export, evicted by the next reload.
    Temporary,
    /// Owned by a parent asset and loaded with it.
    Child,
}

/// Script/stylesheet loading attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadMethod {
    #[default]
    Default,
    Async,
    Defer,
}

impl LoadMethod {
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Async => "async",
            Self::Defer => "defer",
        }
    }
}

/// Page feature an asset belongs to; dropped when the feature is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    GraphView,
    Search,
}

impl Feature {
    pub fn enabled(self, options: &ExportOptions) -> bool {
        match self {
            Self::GraphView => options.graph_view_enabled(),
            Self::Search => options.search_enabled(),
        }
    }
}
