//! `[export.style]` and `[export.head]` configuration.
//!
//! ```toml
//! [export.style]
//! theme = "Minimal"                 # Omit to use the vault's active theme
//! plugin_css = ["obsidian-banners"] # Plugins whose styles.css is exported
//! svelte_css = false                # Include svelte-generated plugin sheets
//! snippets = ["wide-tables"]        # Omit to use the vault's enabled snippets
//! document_width = "40em"
//! accent_color = "#7f6df2"
//!
//! [export.head]
//! favicon = "assets/icon.png"       # Relative to the vault root
//! custom_head = "export/head.html"  # Relative to the vault root
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::Location;
use crate::utils::color::parse_hex_color;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub theme: Option<String>,
    pub plugin_css: Vec<String>,
    pub svelte_css: bool,
    pub snippets: Option<Vec<String>>,
    pub document_width: String,
    pub accent_color: Option<String>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            theme: None,
            plugin_css: Vec::new(),
            svelte_css: false,
            snippets: None,
            document_width: "40em".into(),
            accent_color: None,
        }
    }
}

impl StyleOptions {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.document_width.trim().is_empty() {
            diag.error(
                FieldPath::new("export.style.document_width"),
                "must not be empty",
            );
        }
        if let Some(color) = &self.accent_color
            && parse_hex_color(color).is_none()
        {
            diag.error_with_hint(
                FieldPath::new("export.style.accent_color"),
                format!("`{color}` is not a hex color"),
                "use `#rrggbb` or `#rgb`",
            );
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadOptions {
    /// Favicon file; empty uses the bundled icon.
    pub favicon: String,
    /// HTML file spliced into every page head; empty disables it.
    pub custom_head: String,
}

impl HeadOptions {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let fields = [
            (FieldPath::new("export.head.favicon"), &self.favicon),
            (FieldPath::new("export.head.custom_head"), &self.custom_head),
        ];
        for (field, value) in fields {
            if Location::new(value).is_absolute() {
                diag.error_with_hint(
                    field,
                    format!("`{value}` is absolute"),
                    "paths are relative to the vault root",
                );
            }
        }
    }
}
