//! MIME type utilities.
//!
//! Extension to MIME, MIME to extension, and magic-byte sniffing for
//! payloads whose declared type is missing.

/// Common MIME type constants.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";

    pub const PDF: &str = "application/pdf";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const WASM: &str = "application/wasm";
    pub const ZIP: &str = "application/zip";
    pub const GZIP: &str = "application/gzip";

    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const BMP: &str = "image/bmp";

    pub const MP3: &str = "audio/mpeg";
    pub const WAV: &str = "audio/wav";
    pub const OGG_AUDIO: &str = "audio/ogg";
    pub const FLAC: &str = "audio/flac";
    pub const AAC: &str = "audio/aac";
    pub const OPUS: &str = "audio/opus";

    pub const MP4: &str = "video/mp4";
    pub const WEBM: &str = "video/webm";

    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
    pub const EOT: &str = "application/vnd.ms-fontobject";
}

/// Guess MIME type from a (dot-less, lowercase) extension.
pub fn from_extension(ext: &str) -> &'static str {
    match ext {
        "html" | "htm" => types::HTML,
        "css" | "scss" | "sass" | "less" => types::CSS,
        "js" | "mjs" | "cjs" | "ts" => types::JAVASCRIPT,
        "json" => types::JSON,
        "xml" => types::XML,
        "txt" => types::PLAIN,

        "svg" => types::SVG,
        "png" => types::PNG,
        "jpg" | "jpeg" => types::JPEG,
        "gif" => types::GIF,
        "webp" => types::WEBP,
        "avif" => types::AVIF,
        "ico" => types::ICO,
        "bmp" => types::BMP,

        "mp3" => types::MP3,
        "wav" => types::WAV,
        "ogg" | "oga" => types::OGG_AUDIO,
        "flac" => types::FLAC,
        "aac" | "m4a" => types::AAC,
        "opus" => types::OPUS,
        "mp4" | "m4v" => types::MP4,
        "webm" => types::WEBM,

        "woff" => types::WOFF,
        "woff2" => types::WOFF2,
        "ttf" => types::TTF,
        "otf" => types::OTF,
        "eot" => types::EOT,

        "pdf" => types::PDF,
        "wasm" => types::WASM,
        "zip" => types::ZIP,
        "gz" | "gzip" => types::GZIP,

        _ => types::OCTET_STREAM,
    }
}

/// Strip parameters from a MIME type (`text/css; charset=utf-8` -> `text/css`).
pub fn essence(mime: &str) -> &str {
    mime.split(';').next().unwrap_or_default().trim()
}

/// Map a MIME type to a file extension.
///
/// Known types use the table; unknown ones fall back to the subtype with any
/// `+suffix` removed. An empty MIME type maps to an empty extension.
pub fn to_extension(mime: &str) -> String {
    let essence = essence(mime).to_ascii_lowercase();
    let known = match essence.as_str() {
        "" => return String::new(),
        "text/html" => "html",
        "text/css" => "css",
        "text/javascript" | "application/javascript" | "application/x-javascript" => "js",
        "application/json" => "json",
        "text/plain" => "txt",
        "text/xml" | "application/xml" => "xml",
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/avif" => "avif",
        "image/svg+xml" => "svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/bmp" => "bmp",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        "audio/aac" => "aac",
        "audio/mp4" => "m4a",
        "audio/opus" => "opus",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "font/woff" | "application/font-woff" => "woff",
        "font/woff2" | "application/font-woff2" => "woff2",
        "font/ttf" | "application/x-font-ttf" | "font/sfnt" => "ttf",
        "font/otf" | "application/x-font-opentype" => "otf",
        "application/vnd.ms-fontobject" => "eot",
        "application/pdf" => "pdf",
        "application/wasm" => "wasm",
        "application/zip" => "zip",
        "application/gzip" => "gz",
        _ => {
            let subtype = essence.split('/').nth(1).unwrap_or_default();
            let subtype = subtype.split('+').next().unwrap_or_default();
            return if subtype.is_empty() {
                "txt".to_string()
            } else {
                subtype.to_string()
            };
        }
    };
    known.to_string()
}

/// Sniff a payload's type from its leading bytes.
///
/// Returns `(extension, mime)` or `None` when no signature matches.
pub fn sniff(bytes: &[u8]) -> Option<(&'static str, &'static str)> {
    const SIGNATURES: &[(&[u8], usize, &str, &str)] = &[
        (b"\x89PNG\r\n\x1a\n", 0, "png", types::PNG),
        (b"\xff\xd8\xff", 0, "jpg", types::JPEG),
        (b"GIF87a", 0, "gif", types::GIF),
        (b"GIF89a", 0, "gif", types::GIF),
        (b"\x00\x00\x01\x00", 0, "ico", types::ICO),
        (b"BM", 0, "bmp", types::BMP),
        (b"%PDF-", 0, "pdf", types::PDF),
        (b"wOFF", 0, "woff", types::WOFF),
        (b"wOF2", 0, "woff2", types::WOFF2),
        (b"\x00\x01\x00\x00", 0, "ttf", types::TTF),
        (b"OTTO", 0, "otf", types::OTF),
        (b"ID3", 0, "mp3", types::MP3),
        (b"\xff\xfb", 0, "mp3", types::MP3),
        (b"OggS", 0, "ogg", types::OGG_AUDIO),
        (b"fLaC", 0, "flac", types::FLAC),
        (b"\x1a\x45\xdf\xa3", 0, "webm", types::WEBM),
        (b"\x00asm", 0, "wasm", types::WASM),
        (b"PK\x03\x04", 0, "zip", types::ZIP),
        (b"\x1f\x8b", 0, "gz", types::GZIP),
        (b"ftypavif", 4, "avif", types::AVIF),
        (b"ftyp", 4, "mp4", types::MP4),
    ];

    // RIFF containers carry their format at offset 8.
    if bytes.starts_with(b"RIFF") && bytes.len() >= 12 {
        return match &bytes[8..12] {
            b"WEBP" => Some(("webp", types::WEBP)),
            b"WAVE" => Some(("wav", types::WAV)),
            _ => None,
        };
    }

    for (magic, offset, ext, mime) in SIGNATURES {
        if bytes.len() >= offset + magic.len() && &bytes[*offset..offset + magic.len()] == *magic {
            return Some((ext, mime));
        }
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return Some(("svg", types::SVG));
    }
    None
}

/// Check if the MIME type represents text content.
pub fn is_text(mime: &str) -> bool {
    let mime = essence(mime);
    mime.starts_with("text/")
        || mime == essence(types::JSON)
        || mime == essence(types::XML)
        || mime == "image/svg+xml"
        || mime == "application/javascript"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(from_extension("css"), types::CSS);
        assert_eq!(from_extension("woff2"), types::WOFF2);
        assert_eq!(from_extension("png"), types::PNG);
        assert_eq!(from_extension("xyz"), types::OCTET_STREAM);
    }

    #[test]
    fn test_to_extension() {
        assert_eq!(to_extension("image/png"), "png");
        assert_eq!(to_extension("text/css; charset=utf-8"), "css");
        assert_eq!(to_extension("image/svg+xml"), "svg");
        assert_eq!(to_extension("application/x-custom+json"), "x-custom");
        assert_eq!(to_extension("weird"), "txt");
        assert_eq!(to_extension(""), "");
    }

    #[test]
    fn test_sniff() {
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n...."), Some(("png", types::PNG)));
        assert_eq!(sniff(b"wOF2\x00\x01"), Some(("woff2", types::WOFF2)));
        assert_eq!(sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some(("webp", types::WEBP)));
        assert_eq!(sniff(b"\x00\x00\x00\x18ftypmp42"), Some(("mp4", types::MP4)));
        assert_eq!(sniff(b"  <svg xmlns=\"\"/>"), Some(("svg", types::SVG)));
        assert_eq!(sniff(b"plain words"), None);
        assert_eq!(sniff(b""), None);
    }

    #[test]
    fn test_is_text() {
        assert!(is_text(types::HTML));
        assert!(is_text(types::CSS));
        assert!(is_text(types::SVG));
        assert!(!is_text(types::PNG));
        assert!(!is_text(types::WOFF2));
    }
}
