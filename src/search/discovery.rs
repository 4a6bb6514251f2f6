//! Candidate discovery.
//!
//! Walks a directory tree and yields the ragfile paths under it in a
//! deterministic order, ready to feed [`match_files`](crate::search::scan::match_files).

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::FILE_EXTENSION;

/// True when `path` carries the ragfile extension.
#[must_use]
pub fn is_ragfile(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(FILE_EXTENSION))
}

/// Collects every ragfile under `root`, sorted by file name per directory.
///
/// Unreadable subtrees are silently skipped; a missing `root` yields an
/// empty list.
#[must_use]
pub fn find_ragfiles(root: impl AsRef<Path>) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_ragfile(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    use tempfile::TempDir;

    #[test]
    fn test_is_ragfile() {
        assert!(is_ragfile(Path::new("chunk.rag")));
        assert!(is_ragfile(Path::new("dir/nested.rag")));
        assert!(!is_ragfile(Path::new("chunk.txt")));
        assert!(!is_ragfile(Path::new("rag")));
    }

    #[test]
    fn test_find_ragfiles_recurses_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("b.rag")).unwrap();
        File::create(dir.path().join("a.rag")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        File::create(dir.path().join("sub/c.rag")).unwrap();

        let found = find_ragfiles(dir.path());
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.rag", "b.rag", "sub/c.rag"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");
        assert!(find_ragfiles(missing).is_empty());
    }
}
