//! Folder enumeration: the files directly inside a folder.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::FolderAccessError;

/// Information about a discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Just the filename portion
    pub file_name: String,
    /// File size in bytes
    pub size: u64,
}

/// List the files directly inside `folder`, sorted by name.
///
/// Subdirectories and their contents are skipped. A missing or unreadable
/// folder is an error for the caller to report; unreadable entries inside
/// a readable folder are logged and skipped.
pub fn list_files_in_folder(folder: &Path) -> Result<Vec<DiscoveredFile>, FolderAccessError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(FolderAccessError {
                    path: folder.to_path_buf(),
                    reason: e
                        .io_error()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| e.to_string()),
                });
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {folder:?}: {e}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => files.push(DiscoveredFile {
                path: entry.path().to_path_buf(),
                file_name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
            }),
            Err(e) => tracing::warn!("Skipping {:?}: {e}", entry.path()),
        }
    }

    Ok(files)
}

/// Keep only files whose extension is in `formats` (case-insensitive).
pub fn filter_by_extension(files: Vec<DiscoveredFile>, formats: &[String]) -> Vec<DiscoveredFile> {
    files
        .into_iter()
        .filter(|file| {
            file.path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| formats.iter().any(|fmt| fmt.eq_ignore_ascii_case(ext)))
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_files_sorted_and_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"bb").unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.jpg"), b"c").unwrap();

        let files = list_files_in_folder(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
        assert_eq!(files[1].size, 2);
    }

    #[test]
    fn test_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files_in_folder(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_folder_is_error() {
        let err = list_files_in_folder(Path::new("/definitely/not/a/folder")).unwrap_err();
        assert_eq!(err.path, PathBuf::from("/definitely/not/a/folder"));
        assert!(!err.reason.is_empty());
    }

    #[test]
    fn test_filter_by_extension() {
        let file = |name: &str| DiscoveredFile {
            path: PathBuf::from(name),
            file_name: name.to_string(),
            size: 0,
        };
        let formats = vec!["jpg".to_string(), "png".to_string()];
        let kept = filter_by_extension(
            vec![file("a.JPG"), file("b.txt"), file("c.png"), file("noext")],
            &formats,
        );
        let names: Vec<_> = kept.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.JPG", "c.png"]);
    }
}
