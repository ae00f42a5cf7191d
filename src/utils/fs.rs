//! Filesystem helpers for vault and output paths.
//!
//! The path model itself is pure; everything that needs to look at the
//! disk goes through here.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::core::{Location, PathRules, PathViolation};

/// Check `location` against `rules`.
///
/// Relative locations are resolved against their working directory before
/// touching the filesystem.
pub async fn validate(location: &Location, rules: &PathRules) -> Result<(), PathViolation> {
    if location.is_empty() {
        return if rules.allow_empty {
            Ok(())
        } else {
            Err(PathViolation::Empty)
        };
    }
    if location.path().contains('~') {
        return Err(PathViolation::Tilde);
    }
    if location.is_absolute() && !rules.allow_absolute {
        return Err(PathViolation::Absolute);
    }
    if !location.is_absolute() && !rules.allow_relative {
        return Err(PathViolation::Relative);
    }

    let resolved = location.absoluted().to_std_path();
    let metadata = tokio::fs::metadata(&resolved).await.ok();
    if rules.require_exists && metadata.is_none() {
        return Err(PathViolation::Missing);
    }

    let is_dir = metadata.map_or_else(|| location.is_directory(), |m| m.is_dir());
    if is_dir && !rules.allow_directories {
        return Err(PathViolation::Directory);
    }
    if !is_dir && !rules.allow_files {
        return Err(PathViolation::File);
    }

    if !is_dir && !rules.require_extensions.is_empty() {
        let ext = location.extension().to_ascii_lowercase();
        if !rules.require_extensions.contains(&ext.as_str()) {
            return Err(PathViolation::Extension(rules.require_extensions.join(", ")));
        }
    }
    Ok(())
}

/// Modification time of a file, `None` when it cannot be read.
pub async fn modified(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

/// Whether `target` exists and was modified at or after `source_time`.
pub async fn is_up_to_date(target: &Path, source_time: SystemTime) -> bool {
    modified(target).await.is_some_and(|t| t >= source_time)
}

/// Write `contents`, creating parent directories first.
pub async fn write_creating(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await
}
