//! Stylesheets of the rendering host, behind [`StyleSource`].
//!
//! A live host exports its active stylesheets as a JSON snapshot
//! ([`SnapshotStyleSource`]); a folder of plain `.css` files stands in for
//! one in tests and headless exports ([`FileStyleSource`]).

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::AssetError;
use crate::utils::hash;

/// One stylesheet as the host sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    /// Url the sheet was loaded from, if any.
    pub href: Option<String>,
    /// Id of the element owning the sheet.
    pub owner_id: Option<String>,
    /// Serialized top-level rules.
    pub rules: Vec<String>,
    /// Changes whenever the sheet's content does.
    pub change_marker: Option<String>,
}

impl StyleSheet {
    pub fn text(&self) -> String {
        self.rules.iter().map(|rule| format!("{rule}\n")).collect()
    }

    pub fn owned_by(&self, id: &str) -> bool {
        self.owner_id.as_deref() == Some(id)
    }
}

/// Provider of the host's active stylesheets.
#[async_trait]
pub trait StyleSource: Send + Sync {
    async fn sheets(&self) -> Result<Vec<StyleSheet>, AssetError>;
}

/// No host attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStyleSource;

#[async_trait]
impl StyleSource for EmptyStyleSource {
    async fn sheets(&self) -> Result<Vec<StyleSheet>, AssetError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    sheets: Vec<StyleSheet>,
}

/// JSON snapshot of a live host: `{ "sheets": [StyleSheet, ...] }`.
#[derive(Debug, Clone)]
pub struct SnapshotStyleSource {
    path: PathBuf,
}

impl SnapshotStyleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StyleSource for SnapshotStyleSource {
    async fn sheets(&self) -> Result<Vec<StyleSheet>, AssetError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| AssetError::io(&self.path, err))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|err| AssetError::Decode(format!("{}: {err}", self.path.display())))?;
        Ok(snapshot.sheets)
    }
}

/// Every `.css` file of a folder, in name order. The file stem is the
/// owner id and the file name the href.
#[derive(Debug, Clone)]
pub struct FileStyleSource {
    dir: PathBuf,
}

impl FileStyleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl StyleSource for FileStyleSource {
    async fn sheets(&self) -> Result<Vec<StyleSheet>, AssetError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|err| AssetError::io(&self.dir, err))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| AssetError::io(&self.dir, err))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "css") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sheets = Vec::with_capacity(paths.len());
        for path in paths {
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| AssetError::io(&path, err))?;
            let name = |p: Option<&std::ffi::OsStr>| p.map(|s| s.to_string_lossy().into_owned());
            sheets.push(StyleSheet {
                href: name(path.file_name()),
                owner_id: name(path.file_stem()),
                change_marker: Some(hash::fingerprint(&text)),
                rules: split_rules(&text),
            });
        }
        Ok(sheets)
    }
}

// ============================================================================
// rules
// ============================================================================

/// Split CSS text into top-level rules.
///
/// Nested blocks (`@media { ... }`) stay inside their rule; statements
/// such as `@import ...;` are rules of their own. Comments are dropped,
/// braces inside strings are ignored.
pub fn split_rules(css: &str) -> Vec<String> {
    fn flush(current: &mut String, rules: &mut Vec<String>) {
        let rule = current.trim();
        if !rule.is_empty() {
            rules.push(rule.to_string());
        }
        current.clear();
    }

    let mut rules = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = css.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(open) = quote {
            current.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                current.push(c);
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    flush(&mut current, &mut rules);
                }
            }
            ';' if depth == 0 => {
                current.push(c);
                flush(&mut current, &mut rules);
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut rules);
    rules
}

/// Selector-substring filter over rules.
///
/// A rule survives when at least one of its selectors avoids
/// `always_discard` and either matches `keep` or avoids `discard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleFilter {
    pub always_discard: &'static [&'static str],
    pub discard: &'static [&'static str],
    pub keep: &'static [&'static str],
}

impl RuleFilter {
    pub fn keeps(&self, rule: &str) -> bool {
        let selectors = rule.split('{').next().unwrap_or_default();
        selectors.split(',').map(str::trim).any(|selector| {
            let hit = |list: &[&str]| list.iter().any(|needle| selector.contains(needle));
            !hit(self.always_discard) && (hit(self.keep) || !hit(self.discard))
        })
    }

    /// Surviving rules, one per line.
    pub fn apply<'a>(&self, rules: impl IntoIterator<Item = &'a String>) -> String {
        rules
            .into_iter()
            .filter(|rule| self.keeps(rule))
            .map(|rule| format!("{rule}\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_rules() {
        let css = r#"
            @import url("a.css");
            /* header { } */
            .a { content: "}"; }
            @media print { .b { color: red; } }
            .c{}"#;
        assert_eq!(
            split_rules(css),
            [
                r#"@import url("a.css");"#,
                r#".a { content: "}"; }"#,
                "@media print { .b { color: red; } }",
                ".c{}",
            ]
        );
    }

    #[test]
    fn test_rule_filter() {
        let filter = RuleFilter {
            always_discard: &["cm-"],
            discard: &["pdf", "menu"],
            keep: &["table"],
        };
        assert!(filter.keeps(".markdown-rendered p { }"));
        assert!(!filter.keeps(".pdf-viewer { }"));
        assert!(filter.keeps(".menu table { }"));
        assert!(!filter.keeps(".cm-line table { }"));
        assert!(filter.keeps(".cm-line, .callout { }"));
        assert_eq!(
            filter.apply(&[".pdf{}".to_string(), ".a{}".to_string()]),
            ".a{}\n"
        );
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.css"), ".b{}").unwrap();
        std::fs::write(dir.path().join("app.css"), ".a{} .c{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let sheets = FileStyleSource::new(dir.path()).sheets().await.unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].href.as_deref(), Some("app.css"));
        assert!(sheets[1].owned_by("b"));
        assert_eq!(sheets[0].rules, [".a{}", ".c{}"]);
    }

    #[tokio::test]
    async fn test_snapshot_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("styles.json");
        std::fs::write(
            &path,
            r#"{"sheets":[{"owner_id":"MJX-CHTML-styles","rules":["mjx-c{}"],"change_marker":"3"}]}"#,
        )
        .unwrap();

        let sheets = SnapshotStyleSource::new(&path).sheets().await.unwrap();
        assert!(sheets[0].owned_by("MJX-CHTML-styles"));
        assert_eq!(sheets[0].text(), "mjx-c{}\n");
        assert_eq!(sheets[0].href, None);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SnapshotStyleSource::new(&path).sheets().await,
            Err(AssetError::Decode(_))
        ));
    }
}
