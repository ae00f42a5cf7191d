//! Stylesheet child discovery and `url(...)` rewriting.
//!
//! Runs in three phases so that duplicate references always share one
//! child, whatever order the loads finish in:
//!
//! 1. collect unique urls and plan a child (or a skip reason) for each
//! 2. load every planned child concurrently and wait for all of them
//! 3. substitute each loaded child's path or data URI into its tokens
//!
//! A child that fails to load leaves its reference exactly as written.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::join_all;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use rustc_hash::{FxHashMap, FxHashSet};
use url::Url;

use super::error::SkipReason;
use super::source::{BundledSource, RemoteSource};
use super::{
    Asset, AssetRecord, AssetType, ChildReport, InlinePolicy, LoadContext, LoadMethod, LoadOutcome,
    Mutability,
};
use crate::core::Location;
use crate::utils::{hash, mime};

/// Host-internal url prefixes that mean nothing outside the application.
const INTERNAL_PREFIXES: [&str; 2] = ["app://obsidian.md/", "app://local/"];

/// `url("...")`, `url('...')` and unquoted `url(...)`.
static URL_TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s][^)]*?))\s*\)"#).ok()
});

fn token_url<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map_or("", |m| m.as_str())
        .trim()
}

fn token_quote(caps: &Captures<'_>) -> &'static str {
    if caps.get(1).is_some() {
        "\""
    } else if caps.get(2).is_some() {
        "'"
    } else {
        ""
    }
}

fn strip_internal_prefixes(css: &str) -> String {
    INTERNAL_PREFIXES
        .iter()
        .fold(css.to_string(), |text, prefix| text.replace(prefix, ""))
}

/// Discover, load and substitute the children of a stylesheet.
///
/// Children and the [`ChildReport`] are stored on `parent`; the rewritten
/// text is returned.
pub async fn rewrite_children(parent: &mut AssetRecord, ctx: &LoadContext) -> String {
    let text = strip_internal_prefixes(parent.data.as_text().unwrap_or_default());
    let Some(token) = URL_TOKEN.as_ref() else {
        return text;
    };

    let mut seen = FxHashSet::default();
    let urls: Vec<String> = token
        .captures_iter(&text)
        .map(|caps| token_url(&caps).to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect();
    if urls.is_empty() {
        return text;
    }

    let mut report = ChildReport::default();
    let mut planned = Vec::new();
    for url in urls {
        match plan_child(&url, parent, ctx) {
            Ok(child) => planned.push((url, child)),
            Err(reason) => report.skipped.push((url, reason)),
        }
    }

    let outcomes = join_all(planned.iter_mut().map(|(_, child)| child.load(ctx))).await;

    let mut replacements = FxHashMap::default();
    let mut children = Vec::new();
    for ((url, child), outcome) in planned.into_iter().zip(outcomes) {
        if let LoadOutcome::Failed(err) = outcome {
            report.skipped.push((url, SkipReason::Unavailable(err.to_string())));
            continue;
        }
        if child.record.data.is_empty() {
            report
                .skipped
                .push((url, SkipReason::Unavailable("empty content".into())));
            continue;
        }

        let replacement = if ctx.options.inlines(child.record.kind) {
            child.record.data_uri()
        } else {
            child
                .record
                .asset_path(Some(&parent.target), &ctx.options)
                .path()
        };
        replacements.insert(url, replacement);
        children.push(child);
    }

    report.succeeded = children.len();
    parent.children = children;
    parent.child_report = report;

    token
        .replace_all(&text, |caps: &Captures<'_>| {
            match replacements.get(token_url(caps)) {
                Some(path) => {
                    let quote = token_quote(caps);
                    format!("url({quote}{path}{quote})")
                }
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn child_record(file_name: String, kind: AssetType) -> AssetRecord {
    AssetRecord::new(file_name, kind, InlinePolicy::Auto, Mutability::Child)
        .with_load_method(LoadMethod::Default)
}

/// Decide what to do with one url.
fn plan_child(url: &str, parent: &AssetRecord, ctx: &LoadContext) -> Result<Asset, SkipReason> {
    let options = &ctx.options;
    if url.is_empty() {
        return Err(SkipReason::Empty);
    }
    if url.starts_with('#') {
        return Err(SkipReason::Fragment);
    }
    if url.starts_with("data:") {
        if !options.externalize_data_uris || options.inline_media {
            return Err(SkipReason::InlineData);
        }
        return externalize_data_uri(url);
    }
    if (url.starts_with("//") || Location::new(url).is_remote()) && !options.offline_resources {
        return Err(SkipReason::Online);
    }

    let resolved = resolve_reference(url, parent, ctx)?;
    let location = Location::new(&resolved);
    let file_name = match location.file_name() {
        "" => hash::digest(url),
        name => name.to_string(),
    };
    let kind = AssetType::from_extension(location.extension());
    Ok(Asset::new(
        child_record(file_name, kind),
        RemoteSource::new(resolved),
    ))
}

/// `path` below the vault's resource folder.
fn in_resources(path: &str, ctx: &LoadContext) -> String {
    Location::new(&ctx.vault.resources.to_string_lossy())
        .joined(path)
        .normalized()
        .pathname()
}

/// Turn a reference into something [`RemoteSource`] can load.
///
/// Root-relative references (`/fonts/a.woff2`) resolve against the vault's
/// resource folder. Other relative references resolve against the parent's
/// own location, or the resource folder when the parent has none.
fn resolve_reference(url: &str, parent: &AssetRecord, ctx: &LoadContext) -> Result<String, SkipReason> {
    if let Some(rest) = url.strip_prefix("//") {
        return Ok(format!("https://{rest}"));
    }
    let path = url.split(['?', '#']).next().unwrap_or_default();
    if let Some(rooted) = path.strip_prefix('/') {
        if rooted.trim_matches('/').is_empty() {
            return Err(SkipReason::InvalidUrl);
        }
        return Ok(in_resources(rooted, ctx));
    }
    let location = Location::new(url);
    if location.is_absolute() {
        return Ok(if location.is_remote() { url } else { path }.to_string());
    }
    if path.is_empty() {
        return Err(SkipReason::InvalidUrl);
    }

    match &parent.source {
        Some(source) if source.is_remote() => Url::parse(&source.path())
            .and_then(|base| base.join(url))
            .map(String::from)
            .map_err(|_| SkipReason::InvalidUrl),
        Some(source) => Ok(source.directory().joined(path).normalized().pathname()),
        None => Ok(in_resources(path, ctx)),
    }
}

/// Move a `data:` payload into a child asset named after its content.
fn externalize_data_uri(url: &str) -> Result<Asset, SkipReason> {
    let payload = url.strip_prefix("data:").unwrap_or(url);
    let (header, body) = payload.split_once(',').ok_or(SkipReason::InvalidUrl)?;
    let declared = header.split(';').next().unwrap_or_default().trim();
    let is_base64 = header
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|_| SkipReason::InvalidUrl)?
    } else {
        percent_decode_str(body).collect()
    };
    if bytes.is_empty() {
        return Err(SkipReason::Empty);
    }

    let ext = match mime::to_extension(declared) {
        ext if !ext.is_empty() => ext,
        _ => mime::sniff(&bytes).map_or("bin", |(ext, _)| ext).to_string(),
    };
    let mut record = child_record(
        format!("{}.{ext}", hash::digest(&bytes)),
        AssetType::from_extension(&ext),
    );
    if !declared.is_empty() {
        record = record.with_mime(declared);
    }
    Ok(Asset::new(record, BundledSource::bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetData, test_context};

    fn sheet(css: &str) -> AssetRecord {
        let mut record = AssetRecord::new("sheet.css", AssetType::Style, InlinePolicy::AutoHead, Mutability::Dynamic);
        record.target = Location::new("lib/styles/sheet.css");
        record.data = AssetData::from(css);
        record
    }

    #[test]
    fn test_token_forms() {
        let Some(token) = URL_TOKEN.as_ref() else {
            panic!("url pattern must compile");
        };
        let css = r#"a{b:url("x.png")} c{d:url( 'y.png' )} e{f:url(z.png)}"#;
        let urls: Vec<_> = token
            .captures_iter(css)
            .map(|caps| (token_url(&caps).to_string(), token_quote(&caps)))
            .collect();
        assert_eq!(
            urls,
            [
                ("x.png".to_string(), "\""),
                ("y.png".to_string(), "'"),
                ("z.png".to_string(), ""),
            ]
        );
    }

    #[tokio::test]
    async fn test_externalized_data_uri_shared_by_all_sites() {
        let (_dir, ctx) = test_context(|c| c.export.externalize_data_uris = true);
        let uri = "data:image/png;base64,AAAA";
        let mut parent = sheet(&format!(
            "a{{b:url(\"{uri}\")}} c{{d:url(\"{uri}\")}} e{{f:url('{uri}')}}"
        ));

        let css = rewrite_children(&mut parent, &ctx).await;
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.child_report.succeeded, 1);

        let expected = format!("../media/{}.png", hash::digest(&[0u8, 0, 0]));
        assert_eq!(css.matches(&expected).count(), 3);
        assert!(!css.contains("data:"));
        assert!(css.contains(&format!("url('{expected}')")));
    }

    #[tokio::test]
    async fn test_data_uri_kept_by_default() {
        let (_dir, ctx) = test_context(|_| {});
        let css = "a{b:url(\"data:image/png;base64,AAAA\")}";
        let mut parent = sheet(css);
        assert_eq!(rewrite_children(&mut parent, &ctx).await, css);
        assert_eq!(parent.child_report.skipped[0].1, SkipReason::InlineData);
    }

    #[tokio::test]
    async fn test_missing_child_left_untouched() {
        let (_dir, ctx) = test_context(|_| {});
        let css = "@font-face{src:url(\"fonts/missing.woff\")} a{b:url(#grad)} c{d:url()}";
        let mut parent = sheet(css);
        assert_eq!(rewrite_children(&mut parent, &ctx).await, css);
        assert!(parent.children.is_empty());

        let reasons: Vec<_> = parent.child_report.skipped.iter().map(|(_, r)| r.clone()).collect();
        assert!(matches!(reasons[0], SkipReason::Fragment));
        assert!(matches!(reasons[1], SkipReason::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_local_child_written_or_inlined() {
        let (dir, ctx) = test_context(|_| {});
        std::fs::create_dir_all(dir.path().join("fonts")).unwrap();
        std::fs::write(dir.path().join("fonts/Inter.woff2"), b"wOF2data").unwrap();

        let css = "@font-face{src:url(app://obsidian.md/fonts/Inter.woff2?v=2)}";
        let mut parent = sheet(css);
        let out = rewrite_children(&mut parent, &ctx).await;
        assert_eq!(out, "@font-face{src:url(../fonts/inter.woff2)}");
        assert_eq!(parent.children[0].record.target.path(), "lib/fonts/inter.woff2");

        let (dir, ctx) = test_context(|c| c.export.inline_fonts = true);
        std::fs::create_dir_all(dir.path().join("fonts")).unwrap();
        std::fs::write(dir.path().join("fonts/Inter.woff2"), b"wOF2data").unwrap();
        let mut parent = sheet(css);
        let out = rewrite_children(&mut parent, &ctx).await;
        assert_eq!(out, "@font-face{src:url(data:font/woff2;base64,d09GMmRhdGE=)}");
    }

    #[tokio::test]
    async fn test_root_relative_reference_uses_resources() {
        let (dir, ctx) = test_context(|c| c.vault.resources = "res".into());
        std::fs::create_dir_all(dir.path().join("res/fonts")).unwrap();
        std::fs::write(dir.path().join("res/fonts/r.woff2"), b"wOF2data").unwrap();
        std::fs::create_dir_all(dir.path().join("themes/T/fonts")).unwrap();
        std::fs::write(dir.path().join("themes/T/fonts/r.woff2"), b"other").unwrap();

        let mut parent = sheet("@font-face{src:url('/fonts/r.woff2')}");
        parent.source = Some(Location::new(
            &dir.path().join("themes/T/theme.css").to_string_lossy(),
        ));
        let out = rewrite_children(&mut parent, &ctx).await;

        assert!(parent.child_report.skipped.is_empty(), "{:?}", parent.child_report.skipped);
        assert_eq!(out, "@font-face{src:url('../fonts/r.woff2')}");
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].record.kind, AssetType::Font);
        assert_eq!(parent.children[0].record.data.as_bytes(), b"wOF2data");
    }

    #[tokio::test]
    async fn test_online_reference_skipped_when_not_offline() {
        let (_dir, ctx) = test_context(|c| c.export.offline_resources = false);
        let css = "a{b:url(https://cdn.example.com/x.png)} c{d:url(//cdn.example.com/y.png)}";
        let mut parent = sheet(css);
        assert_eq!(rewrite_children(&mut parent, &ctx).await, css);
        assert!(
            parent
                .child_report
                .skipped
                .iter()
                .all(|(_, reason)| *reason == SkipReason::Online)
        );
    }
}
