//! Document Store - the authoritative path → content mapping.
//!
//! The [`Vfs`] owns every document exclusively; user edits and bulk imports
//! mutate it, and each mutation produces a fresh immutable [`Snapshot`] that
//! is handed to the compile side by value. Mutating the store after a
//! snapshot was built never affects that snapshot.

// Bulk import (folder -> vfs mapping + main-file detection).
pub mod import;

use rustc_hash::FxHashMap;

/// A single document's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FileContent {
    /// Content as bytes, regardless of variant.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(text) => text.as_bytes(),
            FileContent::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<&str> for FileContent {
    fn from(text: &str) -> Self {
        FileContent::Text(text.to_string())
    }
}

impl From<String> for FileContent {
    fn from(text: String) -> Self {
        FileContent::Text(text)
    }
}

/// Immutable, fully-materialized copy of the store.
///
/// Ownership transfers to the compile coordinator on send; the store keeps
/// its own data and the two never alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub files: FxHashMap<String, FileContent>,
    pub main_path: String,
}

impl Snapshot {
    /// Whether the main pointer names a file present in the mapping.
    pub fn has_main(&self) -> bool {
        self.files.contains_key(&self.main_path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The document store.
#[derive(Debug, Default)]
pub struct Vfs {
    files: FxHashMap<String, FileContent>,
    main_path: String,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding a single document which is also the main file.
    pub fn single(main_path: impl Into<String>, content: impl Into<FileContent>) -> Self {
        let main_path = main_path.into();
        let mut files = FxHashMap::default();
        files.insert(main_path.clone(), content.into());
        Self { files, main_path }
    }

    pub fn main_path(&self) -> &str {
        &self.main_path
    }

    pub fn file(&self, path: &str) -> Option<&FileContent> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Replace one entry and build the snapshot to dispatch.
    pub fn update(&mut self, path: impl Into<String>, content: impl Into<FileContent>) -> Snapshot {
        self.files.insert(path.into(), content.into());
        self.snapshot()
    }

    /// Atomically swap the entire mapping and main pointer (bulk import).
    pub fn replace_all(
        &mut self,
        files: FxHashMap<String, FileContent>,
        main_path: impl Into<String>,
    ) -> Snapshot {
        self.files = files;
        self.main_path = main_path.into();
        self.snapshot()
    }

    /// Fully-materialized copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            files: self.files.clone(),
            main_path: self.main_path.clone(),
        }
    }
}

/// Normalize a store path to the absolute form the compiler engine expects.
pub fn normalize_abs(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
