//! transfer/store.rs
//! Completed-file store.
//!
//! Files land here once per successful generation and stay retrievable after
//! the session that produced them is reset, superseded or evicted. A later
//! successful generation for the same file id replaces the earlier file.

use std::collections::HashMap;

use crate::transfer::types::AssembledFile;

pub trait CompletedFileStore: Send {
    /// Insert or replace the file stored under `file.file_id`.
    fn put(&mut self, file: AssembledFile);
    fn get(&self, file_id: &str) -> Option<&AssembledFile>;
    fn remove(&mut self, file_id: &str) -> Option<AssembledFile>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store keyed by file id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: HashMap<String, AssembledFile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_ids(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl CompletedFileStore for MemoryStore {
    fn put(&mut self, file: AssembledFile) {
        self.files.insert(file.file_id.clone(), file);
    }

    fn get(&self, file_id: &str) -> Option<&AssembledFile> {
        self.files.get(file_id)
    }

    fn remove(&mut self, file_id: &str) -> Option<AssembledFile> {
        self.files.remove(file_id)
    }

    fn len(&self) -> usize {
        self.files.len()
    }
}
