//! `[export]` section configuration.
//!
//! The inclusion and inlining matrix every asset decision is made against.
//!
//! # Example
//!
//! ```toml
//! [export]
//! include_css = true          # Export stylesheets at all
//! include_js = true           # Export scripts at all
//! inline_css = false          # Embed stylesheets in each page instead of lib/styles
//! inline_js = false           # Embed scripts in each page instead of lib/scripts
//! inline_media = false        # Embed images/audio/video as data URIs
//! inline_fonts = false        # Embed fonts as data URIs
//! inline_html = true          # Embed HTML fragments (custom head) directly
//! inline_other = false
//! combine_as_single_file = false   # Force every inline_* flag on
//! offline_resources = true    # Download remote resources instead of linking them
//! externalize_data_uris = false    # Move base64 payloads out of stylesheets
//! slugify_paths = true        # Lowercase, hyphenated output paths
//! flatten_paths = false       # Write every page at the output root
//! minify = true               # Minify bundled scripts and stylesheets
//! fetch_timeout = 10          # Seconds per remote resource
//! library_dir = "lib"         # Root of lib/styles, lib/scripts, ...
//! site_name = "My Vault"
//! ```

use serde::{Deserialize, Serialize};

use super::{GraphViewOptions, HeadOptions, SearchOptions, SidebarOptions, StyleOptions};
use crate::asset::AssetType;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::Location;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub include_css: bool,
    pub include_js: bool,

    pub inline_css: bool,
    pub inline_js: bool,
    pub inline_media: bool,
    pub inline_fonts: bool,
    pub inline_html: bool,
    pub inline_other: bool,
    pub combine_as_single_file: bool,

    pub offline_resources: bool,
    pub externalize_data_uris: bool,

    pub slugify_paths: bool,
    pub flatten_paths: bool,
    pub minify: bool,

    /// Seconds allowed per remote resource.
    pub fetch_timeout: u64,

    pub library_dir: String,
    pub site_name: String,

    pub graph_view: GraphViewOptions,
    pub sidebar: SidebarOptions,
    pub search: SearchOptions,
    pub style: StyleOptions,
    pub head: HeadOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_css: true,
            include_js: true,
            inline_css: false,
            inline_js: false,
            inline_media: false,
            inline_fonts: false,
            inline_html: true,
            inline_other: false,
            combine_as_single_file: false,
            offline_resources: true,
            externalize_data_uris: false,
            slugify_paths: true,
            flatten_paths: false,
            minify: true,
            fetch_timeout: 10,
            library_dir: "lib".into(),
            site_name: String::new(),
            graph_view: GraphViewOptions::default(),
            sidebar: SidebarOptions::default(),
            search: SearchOptions::default(),
            style: StyleOptions::default(),
            head: HeadOptions::default(),
        }
    }
}

impl ExportOptions {
    /// Whether assets of `kind` are embedded rather than written as files.
    pub fn inlines(&self, kind: AssetType) -> bool {
        match kind {
            AssetType::Style => self.inline_css,
            AssetType::Script => self.inline_js,
            AssetType::Media => self.inline_media,
            AssetType::Font => self.inline_fonts,
            AssetType::Html => self.inline_html,
            AssetType::Other => self.inline_other,
        }
    }

    /// Graph view needs the sidebar it is drawn in.
    pub fn graph_view_enabled(&self) -> bool {
        self.graph_view.enable && self.sidebar.enable
    }

    /// Search needs the sidebar it is drawn in.
    pub fn search_enabled(&self) -> bool {
        self.search.enable && self.sidebar.enable
    }

    /// Apply implied settings. Called once after parsing and CLI overrides.
    pub fn finalize(&mut self) {
        if self.combine_as_single_file {
            self.inline_css = true;
            self.inline_js = true;
            self.inline_media = true;
            self.inline_fonts = true;
            self.inline_html = true;
            self.inline_other = true;
        }
        self.library_dir = self.library_dir.trim().trim_matches('/').to_string();
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.fetch_timeout == 0 {
            diag.error_with_hint(
                FieldPath::new("export.fetch_timeout"),
                "must be at least 1 second",
                "remote resources that never answer would stall the export",
            );
        }
        if self.library_dir.trim().is_empty() {
            diag.error_with_hint(
                FieldPath::new("export.library_dir"),
                "must not be empty",
                "the default is `lib`",
            );
        } else if Location::new(&self.library_dir).is_absolute() {
            diag.error(
                FieldPath::new("export.library_dir"),
                "must be relative to the output directory",
            );
        }
        if self.sidebar.width.trim().is_empty() {
            diag.error(FieldPath::new("export.sidebar.width"), "must not be empty");
        }
        self.style.validate(diag);
        self.head.validate(diag);
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use crate::asset::AssetType;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        let export = &config.export;
        assert!(export.include_css);
        assert!(export.offline_resources);
        assert!(export.slugify_paths);
        assert!(!export.inlines(AssetType::Style));
        assert!(export.inlines(AssetType::Html));
        assert_eq!(export.library_dir, "lib");
        assert_eq!(export.fetch_timeout, 10);
    }

    #[test]
    fn test_sidebar_disables_graph_and_search() {
        let config = test_parse_config("[export.sidebar]\nenable = false\n");
        assert!(config.export.graph_view.enable);
        assert!(!config.export.graph_view_enabled());
        assert!(!config.export.search_enabled());
    }

    #[test]
    fn test_combine_forces_inlining() {
        let mut config = test_parse_config("[export]\ncombine_as_single_file = true\n");
        config.export.finalize();
        for kind in [
            AssetType::Style,
            AssetType::Script,
            AssetType::Media,
            AssetType::Font,
            AssetType::Html,
            AssetType::Other,
        ] {
            assert!(config.export.inlines(kind), "{kind:?} should inline");
        }
    }

    #[test]
    fn test_validate_reports_every_error() {
        let config = test_parse_config(
            "[export]\nfetch_timeout = 0\nlibrary_dir = \"/abs\"\n\
             [export.style]\naccent_color = \"blue\"\n\
             [export.head]\nfavicon = \"/etc/icon.png\"\n",
        );
        let mut diag = crate::config::ConfigDiagnostics::new();
        config.export.validate(&mut diag);
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "export.fetch_timeout",
                "export.library_dir",
                "export.style.accent_color",
                "export.head.favicon"
            ]
        );
    }
}
