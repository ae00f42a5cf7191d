//! Markup forms of an asset: the tags a page uses to embed or reference it.

use super::{AssetRecord, AssetType, LoadMethod};
use crate::config::ExportOptions;
use crate::core::Location;

/// Render the default markup for `record`.
///
/// Inlined assets embed their content; referenced assets point at their
/// target. Assets with an online URL are always referenced by that URL
/// when offline resources are disabled.
/// Anything that is neither yields an empty string.
pub fn render(record: &AssetRecord, options: &ExportOptions) -> String {
    let stem = Location::new(&record.file_name).stem().to_string();

    let online = record.online_url.is_some() && !options.offline_resources;

    if record.inline_policy.is_inline(record.kind, options) && !online {
        return match record.kind {
            AssetType::Style => format!("<style>{}</style>", record.data.to_text()),
            AssetType::Script => format!(
                "<script{}>{}</script>",
                attribute(record.load_method),
                record.data.to_text()
            ),
            AssetType::Media => format!(
                "<{} src=\"{}\"/>",
                media_tag(&extension(record)),
                record.data_uri()
            ),
            AssetType::Html => record.data.to_text().into_owned(),
            AssetType::Font => format!(
                "<style>@font-face{{font-family:'{stem}';src:url({}) format('{}');}}</style>",
                record.data_uri(),
                font_format(&extension(record))
            ),
            AssetType::Other => String::new(),
        };
    }

    if !record.inline_policy.is_reference(record.kind, options) && !online {
        return String::new();
    }

    let href = reference_href(record, options);
    match record.kind {
        AssetType::Style if record.load_method == LoadMethod::Async => format!(
            "<link rel=\"preload\" href=\"{href}\" as=\"style\" \
             onload=\"this.onload=null;this.rel='stylesheet'\">\
             <noscript><link rel=\"stylesheet\" href=\"{href}\"></noscript>"
        ),
        AssetType::Style => format!("<link rel=\"stylesheet\" href=\"{href}\">"),
        AssetType::Script => format!(
            "<script{} id=\"{stem}-script\" src=\"{href}\" \
             onload='this.onload=null;this.setAttribute(\"loaded\", \"true\")'></script>",
            attribute(record.load_method)
        ),
        AssetType::Media => {
            let loading = match record.load_method {
                LoadMethod::Default => "",
                LoadMethod::Async => " loading=\"lazy\"",
                LoadMethod::Defer => " loading=\"eager\"",
            };
            format!(
                "<{} src=\"{href}\"{loading} />",
                media_tag(&extension(record))
            )
        }
        AssetType::Font => format!(
            "<style>@font-face{{font-family:'{stem}';src:url('{href}') format('{}');}}</style>",
            font_format(&extension(record))
        ),
        AssetType::Html => format!("<include src=\"{href}\"></include>"),
        AssetType::Other => String::new(),
    }
}

/// Where a page should point to fetch `record`.
pub fn reference_href(record: &AssetRecord, options: &ExportOptions) -> String {
    match &record.online_url {
        Some(url) if !options.offline_resources => url.clone(),
        _ => record.asset_path(None, options).path(),
    }
}

fn attribute(method: LoadMethod) -> String {
    match method.attribute() {
        "" => String::new(),
        attr => format!(" {attr}"),
    }
}

fn extension(record: &AssetRecord) -> String {
    let ext = record.target.extension();
    let ext = if ext.is_empty() {
        Location::new(&record.file_name).extension().to_string()
    } else {
        ext.to_string()
    };
    ext.to_ascii_lowercase()
}

/// Element used to embed media of the given extension.
pub fn media_tag(ext: &str) -> &'static str {
    match ext {
        "png" | "jpg" | "jpeg" | "tiff" | "bmp" | "avif" | "apng" | "gif" | "svg" | "webp"
        | "ico" => "img",
        "mp4" | "webm" | "ogg" | "3gp" | "mov" | "mpeg" => "video",
        "mp3" | "wav" | "flac" | "aac" | "m4a" | "opus" => "audio",
        "pdf" => "embed",
        _ => "img",
    }
}

fn font_format(ext: &str) -> &'static str {
    match ext {
        "woff" => "woff",
        "ttf" => "truetype",
        "otf" => "opentype",
        "eot" => "embedded-opentype",
        _ => "woff2",
    }
}
