//! Exported pages: output paths and head injection.

use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;

use crate::config::ExportOptions;
use crate::core::Location;
use crate::embed::page::{PAGE_HTML, PageVars};

/// One rendered document handed over by the markdown renderer.
#[derive(Debug, Clone)]
pub struct ExportFile {
    /// Path relative to the exported folder.
    pub source: Location,
    pub html: String,
    pub modified: SystemTime,
}

impl ExportFile {
    /// Output-relative path of the page.
    pub fn output_path(&self, options: &ExportOptions) -> Location {
        let mut path = self.source.with_extension("html");
        if options.flatten_paths {
            path = Location::new(path.file_name());
        }
        if options.slugify_paths {
            path.slugify();
        }
        path
    }
}

/// `href` of the `<base>` element for a page at `output`.
pub fn base_href(output: &Location) -> String {
    match output.depth() {
        0 => "./".to_string(),
        depth => "../".repeat(depth),
    }
}

static HEAD_OPEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").ok());
static BODY_OPEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<body(?:\s[^>]*)?>").ok());

fn open_tag_end(pattern: &LazyLock<Option<Regex>>, html: &str) -> Option<usize> {
    pattern.as_ref()?.find(html).map(|m| m.end())
}

/// Splice `head` after the opening `<head>` tag and `body` after the
/// opening `<body>` tag. Fragments without a head are wrapped in a
/// minimal document titled `title`.
pub fn assemble(html: &str, title: &str, head: &str, body: &str) -> String {
    let Some(head_at) = open_tag_end(&HEAD_OPEN, html) else {
        let content = if body.is_empty() {
            html.to_string()
        } else {
            format!("{body}\n{html}")
        };
        return PAGE_HTML.render(&PageVars {
            title,
            head,
            body: &content,
        });
    };

    let mut out = String::with_capacity(html.len() + head.len() + body.len() + 2);
    out.push_str(&html[..head_at]);
    out.push('\n');
    out.push_str(head);

    let rest = &html[head_at..];
    match open_tag_end(&BODY_OPEN, rest) {
        Some(body_at) if !body.is_empty() => {
            out.push_str(&rest[..body_at]);
            out.push('\n');
            out.push_str(body);
            out.push_str(&rest[body_at..]);
        }
        _ => out.push_str(rest),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(source: &str) -> ExportFile {
        ExportFile {
            source: Location::new(source),
            html: String::new(),
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_output_path() {
        let mut options = ExportOptions::default();
        let note = file("Daily Notes/My Note.md");
        assert_eq!(note.output_path(&options).path(), "daily-notes/my-note.html");

        options.flatten_paths = true;
        assert_eq!(note.output_path(&options).path(), "my-note.html");

        options.flatten_paths = false;
        options.slugify_paths = false;
        assert_eq!(note.output_path(&options).path(), "Daily Notes/My Note.html");
    }

    #[test]
    fn test_base_href() {
        assert_eq!(base_href(&Location::new("index.html")), "./");
        assert_eq!(base_href(&Location::new("a/b/page.html")), "../../");
    }

    #[test]
    fn test_assemble_document() {
        let html = "<html><HEAD lang=\"en\"><title>x</title></HEAD><body class=\"a\"><p>hi</p></body></html>";
        let out = assemble(html, "x", "<link rel=\"icon\">", "<script>t()</script>");
        assert_eq!(
            out,
            "<html><HEAD lang=\"en\">\n<link rel=\"icon\"><title>x</title></HEAD>\
             <body class=\"a\">\n<script>t()</script><p>hi</p></body></html>"
        );
    }

    #[test]
    fn test_assemble_fragment() {
        let out = assemble("<header>top</header><p>hi</p>", "Note", "<base href=\"./\">", "");
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<title>Note</title>"));
        assert!(out.contains("<base href=\"./\">"));
        assert!(out.contains("<header>top</header><p>hi</p>"));
    }
}
