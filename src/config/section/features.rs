//! Per-feature option sub-objects of `[export]`.
//!
//! ```toml
//! [export.graph_view]
//! enable = true
//!
//! [export.sidebar]
//! enable = true
//! width = "20em"
//!
//! [export.search]
//! enable = true
//! ```
//!
//! The graph view and search both live in the sidebars, so disabling the
//! sidebar disables them too.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphViewOptions {
    pub enable: bool,
}

impl Default for GraphViewOptions {
    fn default() -> Self {
        Self { enable: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarOptions {
    pub enable: bool,
    /// CSS length for `--sidebar-width`; bare numbers are treated as px.
    pub width: String,
}

impl Default for SidebarOptions {
    fn default() -> Self {
        Self {
            enable: true,
            width: "20em".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub enable: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { enable: true }
    }
}
