//! Resources compiled into the binary.
//!
//! # Module Structure
//!
//! - `css` - Page layout, deferred rules and application overrides
//! - `js` - Page scripts and the graph view
//! - `page` - Document shell for fragments that lack one
//!
//! # Usage
//!
//! ```ignore
//! use embed::page::{PAGE_HTML, PageVars};
//!
//! let html = PAGE_HTML.render(&PageVars { title: "Home", head: "", body: "<p>hi</p>" });
//! ```

mod template;

pub use template::{Template, TemplateVars};

/// Icon used when no favicon is configured or the configured one is missing.
pub const DEFAULT_ICON: &[u8] = include_bytes!("icon.png");

pub mod css {
    pub const MAIN_STYLES: &str = include_str!("css/main-styles.css");
    pub const DEFERRED: &str = include_str!("css/deferred.css");

    /// Appended to the filtered application stylesheet.
    pub const APP_OVERRIDES: &str = include_str!("css/app-overrides.css");
}

pub mod js {
    pub const WEBPAGE: &str = include_str!("js/webpage.js");
    pub const DEFERRED: &str = include_str!("js/deferred.js");
    pub const THEME_LOAD: &str = include_str!("js/theme-load.js");
    pub const GRAPH_VIEW: &str = include_str!("js/graph-view.js");
    pub const GRAPH_RENDER_WORKER: &str = include_str!("js/graph-render-worker.js");
}

pub mod page {
    use super::{Template, TemplateVars};

    /// Variables for page.html template.
    pub struct PageVars<'a> {
        pub title: &'a str,
        pub head: &'a str,
        pub body: &'a str,
    }

    impl TemplateVars for PageVars<'_> {
        const PLACEHOLDERS: &'static [&'static str] = &["__TITLE__", "__HEAD__", "__BODY__"];

        fn values(&self) -> Vec<&str> {
            vec![self.title, self.head, self.body]
        }
    }

    /// Minimal document wrapped around fragment pages.
    pub const PAGE_HTML: Template<PageVars<'static>> =
        Template::new(include_str!("page/page.html"));
}
