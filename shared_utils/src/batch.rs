//! Batch Collection Module
//!
//! Provides utilities for collecting image files for batch processing.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Input extensions accepted for conversion.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "bmp", "tiff", "tif", "gif", "ico",
];

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn collect_files(dir: &Path, extensions: &[&str], recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir).follow_links(true)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_has_extension_case_insensitive() {
        assert!(has_extension(Path::new("photo.png"), IMAGE_EXTENSIONS));
        assert!(has_extension(Path::new("photo.PNG"), IMAGE_EXTENSIONS));
        assert!(has_extension(Path::new("photo.Jpeg"), IMAGE_EXTENSIONS));
        assert!(!has_extension(Path::new("notes.txt"), IMAGE_EXTENSIONS));
        assert!(!has_extension(Path::new("noext"), IMAGE_EXTENSIONS));
    }

    #[test]
    fn test_collect_files_flat() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("c.txt"), b"x").unwrap();

        let files = collect_files(dir.path(), IMAGE_EXTENSIONS, false);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_files_recursive() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        fs::write(dir.path().join("sub").join("b.gif"), b"x").unwrap();

        let flat = collect_files(dir.path(), IMAGE_EXTENSIONS, false);
        assert_eq!(flat.len(), 1);

        let deep = collect_files(dir.path(), IMAGE_EXTENSIONS, true);
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_files_empty_dir() {
        let dir = TempDir::new().expect("temp dir");
        let files = collect_files(dir.path(), IMAGE_EXTENSIONS, true);
        assert!(files.is_empty());
    }
}
