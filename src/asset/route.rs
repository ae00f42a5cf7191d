//! Output library layout: which folder each asset type lands in.

use crate::core::Location;

use super::AssetType;

/// Canonical `lib/` layout, computed once per registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    root: Location,
    slugify: bool,
}

impl LibraryLayout {
    pub fn new(library_dir: &str, slugify: bool) -> Self {
        let mut root = Location::new(library_dir);
        root.normalize();
        if slugify {
            root.slugify();
        }
        Self { root, slugify }
    }

    /// Library root (e.g. `lib`).
    pub fn root(&self) -> &Location {
        &self.root
    }

    /// Folder of an asset type (e.g. `lib/styles`).
    pub fn dir_for(&self, kind: AssetType) -> Location {
        let sub = match kind {
            AssetType::Style => "styles",
            AssetType::Script => "scripts",
            AssetType::Media => "media",
            AssetType::Html => "html",
            AssetType::Font => "fonts",
            AssetType::Other => return self.root.clone(),
        };
        self.root.joined(sub)
    }

    /// Output-relative target of a file of the given type.
    pub fn target_for(&self, kind: AssetType, file_name: &str) -> Location {
        let mut target = self.dir_for(kind).joined(file_name);
        if self.slugify {
            target.slugify();
        }
        target
    }
}
