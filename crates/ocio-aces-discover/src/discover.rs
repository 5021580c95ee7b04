//! Transform file discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::DiscoverResult;
use crate::format::TransformFormat;

/// Transform files grouped by containing directory.
pub type Discovered = BTreeMap<PathBuf, Vec<PathBuf>>;

/// Recursively collects the transform files of a format under `root`.
///
/// Extensions are matched case-insensitively. Directories without matching
/// files are omitted; files are sorted within each directory.
///
/// # Errors
///
/// Returns [`crate::DiscoverError::Walk`] if a directory cannot be read.
pub fn discover(root: &Path, format: TransformFormat) -> DiscoverResult<Discovered> {
    let mut discovered = Discovered::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), format.extension()) {
            continue;
        }

        let path = entry.into_path();
        debug!(
            path = %path.strip_prefix(root).unwrap_or(path.as_path()).display(),
            "{format} transform was found"
        );

        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        discovered.entry(directory).or_default().push(path);
    }

    Ok(discovered)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn groups_by_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("utility/sub")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("utility/b.clf"), "").unwrap();
        fs::write(root.join("utility/a.CLF"), "").unwrap();
        fs::write(root.join("utility/readme.md"), "").unwrap();
        fs::write(root.join("utility/sub/c.clf"), "").unwrap();

        let discovered = discover(root, TransformFormat::Clf).unwrap();

        assert_eq!(discovered.len(), 2);
        assert_eq!(
            discovered[&root.join("utility")],
            vec![root.join("utility/a.CLF"), root.join("utility/b.clf")]
        );
        assert_eq!(discovered[&root.join("utility/sub")], vec![root.join("utility/sub/c.clf")]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(discover(&dir.path().join("missing"), TransformFormat::Ctl).is_err());
    }
}
