//! Bulk project import.
//!
//! Turns a folder picked by the user into a `(files, main_path)` pair for
//! [`Vfs::replace_all`](super::Vfs::replace_all). Paths arrive prefixed with
//! the picked folder's own name ("proj/main.typ"); that top segment is
//! stripped so store paths are project-relative.
//!
//! Main-file detection, in order: a path literally ending in the configured
//! main-file name, else the first path with the recognized source extension,
//! else the import is rejected.

use rustc_hash::FxHashMap;

use crate::config::PreviewConfig;
use crate::error::ImportError;

use super::FileContent;

/// One file as delivered by the folder picker.
#[derive(Debug, Clone)]
pub struct ImportEntry {
    /// Path including the picked folder's top-level segment.
    pub path: String,
    pub data: Vec<u8>,
}

impl ImportEntry {
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}

/// A validated import, ready to swap into the store.
#[derive(Debug)]
pub struct ImportedProject {
    pub files: FxHashMap<String, FileContent>,
    pub main_path: String,
}

/// Build a project from raw picker entries.
pub fn import_entries(
    entries: Vec<ImportEntry>,
    config: &PreviewConfig,
) -> Result<ImportedProject, ImportError> {
    if entries.is_empty() {
        return Err(ImportError::Empty);
    }

    let mut files = FxHashMap::default();
    let mut detected_main: Option<String> = None;
    let mut first_source: Option<String> = None;

    for entry in entries {
        let Some(path) = strip_root_segment(&entry.path) else {
            continue;
        };

        if detected_main.is_none() && path.ends_with(&config.main_file) {
            detected_main = Some(path.clone());
        }
        if first_source.is_none() && has_extension(&path, &config.source_extension) {
            first_source = Some(path.clone());
        }

        files.insert(path, classify_content(&entry.path, entry.data, config));
    }

    let main_path = detected_main
        .or(first_source)
        .ok_or_else(|| ImportError::NoMainFile(config.main_file.clone()))?;

    Ok(ImportedProject { files, main_path })
}

/// Drop the picked folder's own name: "proj/main.typ" -> "main.typ".
fn strip_root_segment(path: &str) -> Option<String> {
    let relative = match path.split_once('/') {
        Some((_, rest)) => rest,
        None => path,
    };
    if relative.is_empty() {
        return None;
    }
    Some(relative.to_string())
}

fn has_extension(path: &str, extension: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Source and plain-text files become text, everything else stays binary.
fn classify_content(path: &str, data: Vec<u8>, config: &PreviewConfig) -> FileContent {
    let textual = has_extension(path, &config.source_extension) || has_extension(path, "txt");
    if textual {
        match String::from_utf8(data) {
            Ok(text) => FileContent::Text(text),
            Err(err) => FileContent::Bytes(err.into_bytes()),
        }
    } else {
        FileContent::Bytes(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PreviewConfig {
        PreviewConfig::default()
    }

    #[test]
    fn test_main_file_detection() {
        let entries = vec![
            ImportEntry::new("proj/lib.typ", b"#let x = 1".to_vec()),
            ImportEntry::new("proj/main.typ", b"= Title".to_vec()),
        ];
        let project = import_entries(entries, &config()).unwrap();

        assert_eq!(project.main_path, "main.typ");
        assert_eq!(project.files.len(), 2);
        assert_eq!(
            project.files["main.typ"],
            FileContent::Text("= Title".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_first_source_file() {
        let entries = vec![
            ImportEntry::new("proj/notes.md", b"# notes".to_vec()),
            ImportEntry::new("proj/chapter.typ", b"= Chapter".to_vec()),
        ];
        let project = import_entries(entries, &config()).unwrap();
        assert_eq!(project.main_path, "chapter.typ");
    }

    #[test]
    fn test_no_main_file_is_rejected() {
        let entries = vec![ImportEntry::new("proj/figure.png", vec![0x89, 0x50])];
        let err = import_entries(entries, &config()).unwrap_err();
        assert!(matches!(err, ImportError::NoMainFile(_)));
    }

    #[test]
    fn test_empty_import_is_rejected() {
        assert!(matches!(
            import_entries(vec![], &config()),
            Err(ImportError::Empty)
        ));
    }

    #[test]
    fn test_nested_paths_keep_subdirectories() {
        let entries = vec![
            ImportEntry::new("proj/main.typ", b"x".to_vec()),
            ImportEntry::new("proj/chapters/intro.typ", b"y".to_vec()),
        ];
        let project = import_entries(entries, &config()).unwrap();
        assert!(project.files.contains_key("chapters/intro.typ"));
    }

    #[test]
    fn test_binary_files_stay_binary() {
        let entries = vec![
            ImportEntry::new("proj/main.typ", b"x".to_vec()),
            ImportEntry::new("proj/logo.png", vec![0x89, 0x50, 0x4e, 0x47]),
        ];
        let project = import_entries(entries, &config()).unwrap();
        assert_eq!(
            project.files["logo.png"],
            FileContent::Bytes(vec![0x89, 0x50, 0x4e, 0x47])
        );
    }
}
