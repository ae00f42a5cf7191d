//! Asset minification for scripts and stylesheets.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::AssetType;

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    // Bundled scripts are classic scripts, not modules.
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

/// Minify text content of the given asset type.
///
/// Types without a minifier are returned unchanged. When the minifier
/// rejects the input, line breaks are dropped instead so the output is
/// still compacted.
pub fn minify(kind: AssetType, content: &str) -> String {
    let minified = match kind {
        AssetType::Style => minify_css(content),
        AssetType::Script => minify_js(content),
        _ => return content.to_string(),
    };
    minified.unwrap_or_else(|| strip_newlines(content))
}

fn strip_newlines(content: &str) -> String {
    content.lines().map(str::trim_end).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let out = minify(AssetType::Style, "body {\n  color: red;\n}\n");
        assert!(!out.contains('\n'));
        assert!(out.contains("body"));
        assert!(out.contains("red"));
    }

    #[test]
    fn test_minify_js_invalid_falls_back() {
        let out = minify(AssetType::Script, "let = = 1;\nlet y = 2;\n");
        assert_eq!(out, "let = = 1; let y = 2;");
    }

    #[test]
    fn test_minify_passthrough() {
        let html = "<p>\n  hi\n</p>";
        assert_eq!(minify(AssetType::Html, html), html);
    }
}
