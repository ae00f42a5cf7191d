//! Path model shared by every export component.
//!
//! A [`Location`] is a parsed, purely in-memory path: no method here touches
//! the filesystem. Separators are always `/`, whatever the input used.
//!
//! Mutating methods (`absolute`, `slugify`, ...) change the value in place
//! and return `&mut Self` for chaining. Each has exactly one copying twin
//! (`absoluted`, `slugified`, ...) that clones first and then calls the
//! mutator, so the two forms can never drift apart.
//!
//! ```ignore
//! let mut page = Location::new_in("Notes/My Page.html", "/out");
//! page.slugify().absolute();
//! assert_eq!(page.path(), "/out/notes/my-page.html");
//!
//! let img = Location::new("/out/lib/media/a.png");
//! assert_eq!(Location::relative(&page, &img).path(), "../lib/media/a.png");
//! ```

use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Prefixes that make a path absolute on their own.
const SCHEMES: [&str; 3] = ["http://", "https://", "file://"];

/// Parsed path with an optional working directory for relative inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// `""`, `"/"`, `"C:/"`, or a scheme such as `"https://"`.
    root: String,
    segments: Vec<String>,
    hash: String,
    query: String,
    trailing_separator: bool,
    working_directory: String,
}

/// Generates the copying twin of each mutator.
macro_rules! copying {
    ($($(#[$meta:meta])* $copy:ident => $mutator:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $copy(&self, $($arg: $ty),*) -> Self {
                let mut copy = self.clone();
                copy.$mutator($($arg),*);
                copy
            }
        )*
    };
}

impl Location {
    /// Parse a path with no working directory.
    pub fn new(path: &str) -> Self {
        Self::parse(path, "")
    }

    /// Parse a path; relative inputs remember `working_directory` for
    /// [`absolute`](Self::absolute).
    pub fn new_in(path: &str, working_directory: &str) -> Self {
        Self::parse(path, working_directory)
    }

    /// The empty sentinel.
    pub fn empty() -> Self {
        Self::default()
    }

    fn parse(raw: &str, working_directory: &str) -> Self {
        let working_directory = working_directory.trim().replace('\\', "/");
        let normalized = raw.trim().replace('\\', "/");
        if normalized.is_empty() {
            return Self {
                working_directory,
                ..Self::default()
            };
        }

        let (path, query, mut hash) = match normalized.split_once('?') {
            Some((path, rest)) => match rest.split_once('#') {
                Some((query, hash)) => (path, query.to_string(), hash.to_string()),
                None => (path, rest.to_string(), String::new()),
            },
            None => (normalized.as_str(), String::new(), String::new()),
        };
        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map_or_else(|_| path.to_string(), |s| s.into_owned());

        let (root, rest) = split_root(&decoded);
        let trailing_separator = rest.ends_with('/') && !rest.trim_matches('/').is_empty();
        let mut segments: Vec<String> = rest
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if hash.is_empty()
            && let Some(last) = segments.last_mut()
            && let Some((name, fragment)) = last.split_once('#')
        {
            hash = fragment.to_string();
            *last = name.to_string();
            if last.is_empty() {
                segments.pop();
            }
        }

        let working_directory = if root.is_empty() {
            working_directory
        } else {
            String::new()
        };

        Self {
            root,
            segments,
            hash,
            query,
            trailing_separator,
            working_directory,
        }
    }

    // ========================================================================
    // queries
    // ========================================================================

    /// Canonical joined string (query and hash included).
    pub fn path(&self) -> String {
        let mut out = self.pathname();
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query);
        }
        if !self.hash.is_empty() {
            out.push('#');
            out.push_str(&self.hash);
        }
        out
    }

    /// Joined string without hash or query.
    pub fn pathname(&self) -> String {
        format!("{}{}", self.root, self.segments.join("/"))
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// Final segment, extension included.
    pub fn file_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Extension without the dot, empty for directories.
    pub fn extension(&self) -> &str {
        if self.trailing_separator {
            return "";
        }
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => "",
            Some(i) => {
                let ext = &name[i + 1..];
                if ext.is_empty() || ext.contains(' ') || name.ends_with(' ') {
                    ""
                } else {
                    ext
                }
            }
        }
    }

    /// Final segment without its extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        let ext = self.extension();
        if ext.is_empty() {
            name
        } else {
            &name[..name.len() - ext.len() - 1]
        }
    }

    pub fn is_directory(&self) -> bool {
        self.trailing_separator || self.extension().is_empty()
    }

    pub fn is_absolute(&self) -> bool {
        !self.root.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.segments.is_empty() && self.hash.is_empty()
    }

    /// True for `http://` and `https://` locations.
    pub fn is_remote(&self) -> bool {
        self.root.starts_with("http")
    }

    /// Number of directory segments, used to climb back to the root.
    pub fn depth(&self) -> usize {
        self.directory().segments.len()
    }

    /// The location itself for directories, its parent for files.
    pub fn directory(&self) -> Self {
        if self.is_directory() {
            let mut dir = self.clone();
            dir.hash.clear();
            dir.query.clear();
            dir
        } else {
            self.parent()
        }
    }

    /// Location with the final segment removed.
    pub fn parent(&self) -> Self {
        let mut parent = self.clone();
        parent.segments.pop();
        parent.hash.clear();
        parent.query.clear();
        parent.trailing_separator = false;
        parent
    }

    /// Filesystem path (scheme, hash and query removed).
    pub fn to_std_path(&self) -> PathBuf {
        let root = match self.root.as_str() {
            "file:///" => "/",
            "file://" => "",
            other => other,
        };
        PathBuf::from(format!("{root}{}", self.segments.join("/")))
    }

    /// Minimal relative path from `from` (a file or directory) to `to`.
    ///
    /// Both locations must share a root; otherwise `to` is returned as is.
    pub fn relative(from: &Location, to: &Location) -> Location {
        if from.root != to.root {
            return to.clone();
        }
        let from_dir = from.directory().normalized();
        let to = to.normalized();

        let common = from_dir
            .segments
            .iter()
            .zip(&to.segments)
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments = vec!["..".to_string(); from_dir.segments.len() - common];
        segments.extend(to.segments[common..].iter().cloned());

        Location {
            root: String::new(),
            segments,
            hash: to.hash.clone(),
            query: to.query.clone(),
            trailing_separator: to.trailing_separator,
            working_directory: String::new(),
        }
    }

    /// Slugify a single string: lowercase, whitespace runs to one hyphen,
    /// repeated hyphens collapsed.
    pub fn slugify_str(value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            let c = if c.is_whitespace() { '-' } else { c };
            if c == '-' && out.ends_with('-') {
                continue;
            }
            out.extend(c.to_lowercase());
        }
        out
    }

    // ========================================================================
    // mutators
    // ========================================================================

    /// Join the working directory onto a relative location.
    pub fn absolute(&mut self) -> &mut Self {
        if self.is_absolute() || self.working_directory.is_empty() {
            return self;
        }
        let base = Location::new(&self.working_directory);
        let mut segments = base.segments;
        segments.append(&mut self.segments);
        self.root = base.root;
        self.segments = segments;
        self.working_directory.clear();
        self
    }

    /// Collapse `.` and `..` segments. Leading `..` survive on relative paths.
    pub fn normalize(&mut self) -> &mut Self {
        let mut segments: Vec<String> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            match segment.as_str() {
                "." => {}
                ".." => {
                    if segments.last().is_some_and(|last| last != "..") {
                        segments.pop();
                    } else if self.root.is_empty() {
                        segments.push(segment);
                    }
                }
                _ => segments.push(segment),
            }
        }
        self.segments = segments;
        self
    }

    pub fn slugify(&mut self) -> &mut Self {
        for segment in &mut self.segments {
            *segment = Self::slugify_str(segment);
        }
        self
    }

    /// Replace the extension; an empty `ext` removes it.
    pub fn set_extension(&mut self, ext: &str) -> &mut Self {
        if self.segments.is_empty() {
            return self;
        }
        let ext = ext.trim_start_matches('.');
        let stem = self.stem().to_string();
        let name = if ext.is_empty() {
            stem
        } else {
            format!("{stem}.{ext}")
        };
        if let Some(last) = self.segments.last_mut() {
            *last = name;
        }
        self.trailing_separator = false;
        self
    }

    /// Replace the final segment (or append one to a directory).
    pub fn set_file_name(&mut self, name: &str) -> &mut Self {
        if self.trailing_separator || self.segments.is_empty() {
            self.segments.push(name.to_string());
        } else if let Some(last) = self.segments.last_mut() {
            *last = name.to_string();
        }
        self.trailing_separator = false;
        self
    }

    pub fn set_working_directory(&mut self, dir: &str) -> &mut Self {
        self.working_directory = dir.replace('\\', "/");
        self
    }

    /// Turn `a/b.html` into the directory `a/b/`.
    pub fn folderize(&mut self) -> &mut Self {
        if !self.is_directory() {
            let stem = self.stem().to_string();
            if let Some(last) = self.segments.last_mut() {
                *last = stem;
            }
        }
        self.trailing_separator = true;
        self.hash.clear();
        self.query.clear();
        self
    }

    /// Append a relative path; an absolute `other` replaces `self`.
    pub fn push(&mut self, other: &str) -> &mut Self {
        let other = Location::new(other);
        if other.is_absolute() {
            *self = other;
            return self;
        }
        if other.is_empty() {
            return self;
        }
        self.segments.extend(other.segments);
        self.hash = other.hash;
        self.query = other.query;
        self.trailing_separator = other.trailing_separator;
        self
    }

    copying! {
        absoluted => absolute();
        normalized => normalize();
        slugified => slugify();
        with_extension => set_extension(ext: &str);
        with_file_name => set_file_name(name: &str);
        with_working_directory => set_working_directory(dir: &str);
        folderized => folderize();
        /// Copying form of [`push`](Self::push).
        joined => push(other: &str);
    }
}

fn split_root(path: &str) -> (String, &str) {
    let lower = path.to_ascii_lowercase();
    for scheme in SCHEMES {
        if lower.starts_with(scheme) {
            let rest = &path[scheme.len()..];
            // `file:///abs` keeps its filesystem root.
            return match rest.strip_prefix('/') {
                Some(rest) if scheme == "file://" => ("file:///".to_string(), rest),
                _ => (scheme.to_string(), rest),
            };
        }
    }
    if let Some(rest) = path.strip_prefix('/') {
        return ("/".to_string(), rest);
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'/')
    {
        let drive = format!("{}:/", char::from(bytes[0]).to_ascii_uppercase());
        return (drive, path.get(3..).unwrap_or_default());
    }
    (String::new(), path)
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

// ============================================================================
// validation rules
// ============================================================================

/// Constraints a configured path must satisfy. Checked by
/// [`crate::utils::fs::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRules {
    pub allow_empty: bool,
    pub require_exists: bool,
    pub allow_absolute: bool,
    pub allow_relative: bool,
    pub allow_files: bool,
    pub allow_directories: bool,
    pub require_extensions: &'static [&'static str],
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            allow_empty: false,
            require_exists: true,
            allow_absolute: true,
            allow_relative: true,
            allow_files: true,
            allow_directories: true,
            require_extensions: &[],
        }
    }
}

impl PathRules {
    /// An existing file with one of `extensions` (any extension if empty).
    pub fn existing_file(extensions: &'static [&'static str]) -> Self {
        Self {
            allow_directories: false,
            require_extensions: extensions,
            ..Self::default()
        }
    }
}

/// Why a path failed [`PathRules`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathViolation {
    #[error("path is empty")]
    Empty,
    #[error("path contains `~`, which is not expanded")]
    Tilde,
    #[error("absolute paths are not allowed")]
    Absolute,
    #[error("relative paths are not allowed")]
    Relative,
    #[error("path does not exist")]
    Missing,
    #[error("expected a directory, found a file")]
    File,
    #[error("expected a file, found a directory")]
    Directory,
    #[error("expected one of these extensions: {0}")]
    Extension(String),
}

// ============================================================================
// tests
// ============================================================================
