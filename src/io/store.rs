use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, atomic_write, log_recovery};
use crate::model::document::{Document, Row};
use crate::model::item::{Item, ItemId};
use crate::ops::clean;
use crate::ops::item_ops::{self, ItemError};
use crate::parse::{parse_document, serialize_document};

/// Appended to the task file path to name its single backup slot
pub const BACKUP_SUFFIX: &str = ".backup";

/// Error type for task file operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error("no backup found")]
    NoBackup(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// `taf.md` → `taf.md.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Copy the task file into its backup slot, replacing any older backup.
/// Returns false if there was no task file to copy.
pub fn backup(path: &Path) -> Result<bool, StoreError> {
    if !path.exists() {
        return Ok(false);
    }
    let dest = backup_path(path);
    fs::copy(path, &dest).map_err(|source| StoreError::WriteError { path: dest, source })?;
    tracing::debug!(path = %path.display(), "backup written");
    Ok(true)
}

/// Put the backup back in place of the task file and delete the backup.
/// Fails without touching anything if there is no backup.
pub fn restore(path: &Path) -> Result<(), StoreError> {
    let src = backup_path(path);
    if !src.exists() {
        return Err(StoreError::NoBackup(src));
    }
    fs::copy(&src, path).map_err(|source| StoreError::WriteError {
        path: path.to_path_buf(),
        source,
    })?;
    fs::remove_file(&src)?;
    tracing::debug!(path = %path.display(), "backup restored");
    Ok(())
}

/// A task file loaded into memory.
///
/// Every mutating method writes the file before returning. The signatures
/// they return are meant to be matched against a fresh [`TaskTree::load`] of
/// the same file, not against this instance.
#[derive(Debug)]
pub struct TaskTree {
    path: PathBuf,
    doc: Document,
    /// Lines the parser dropped; they are gone from the file after the next save
    dropped: Vec<String>,
}

impl TaskTree {
    /// Load the task file. A missing file is an empty tree.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(StoreError::ReadError { path, source }),
        };

        let (doc, dropped) = parse_document(&source);
        if !dropped.is_empty() {
            tracing::warn!(
                path = %path.display(),
                count = dropped.len(),
                "lines that are not tasks will be dropped on the next change"
            );
        }
        tracing::debug!(path = %path.display(), items = doc.len(), "loaded");

        Ok(TaskTree { path, doc, dropped })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn item(&self, id: ItemId) -> &Item {
        self.doc.item(id)
    }

    /// Read-only export for display
    pub fn rows(&self) -> Vec<Row> {
        self.doc.rows()
    }

    pub fn find_by_id(&self, ordinal: usize) -> Option<ItemId> {
        self.doc.find_by_ordinal(ordinal)
    }

    pub fn signature(&self, id: ItemId) -> String {
        self.doc.signature(id)
    }

    /// Add a todo item and save. Returns signatures of the new item and of
    /// every ancestor it reopened.
    pub fn add_todo(
        &mut self,
        text: &str,
        tag: Option<&str>,
        parent_id: Option<usize>,
    ) -> Result<Vec<String>, StoreError> {
        let changed = item_ops::add_todo(&mut self.doc, text, tag, parent_id)?;
        self.commit(&changed)
    }

    /// Toggle an item and save. Returns signatures of the item and of every
    /// item the cascade changed.
    pub fn toggle_status(&mut self, id: ItemId) -> Result<Vec<String>, StoreError> {
        let affected = item_ops::toggle_status(&mut self.doc, id);
        self.commit(&affected)
    }

    /// Delete an item with its subtree and save.
    pub fn delete(&mut self, id: ItemId) -> Result<(), StoreError> {
        if !item_ops::delete_item(&mut self.doc, id) {
            tracing::debug!(?id, "delete: item not in its parent list");
            return Ok(());
        }
        self.commit(&[]).map(|_| ())
    }

    /// Sort todo before done everywhere and save. Returns how many lists moved.
    pub fn cleanup(&mut self) -> Result<usize, StoreError> {
        let reordered = clean::cleanup(&mut self.doc);
        self.commit(&[])?;
        Ok(reordered)
    }

    /// Remove all done items and save. Returns how many items were removed.
    pub fn purge(&mut self) -> Result<usize, StoreError> {
        let removed = clean::purge(&mut self.doc);
        self.commit(&[])?;
        Ok(removed)
    }

    /// Renumber, collect signatures, then save.
    fn commit(&mut self, changed: &[ItemId]) -> Result<Vec<String>, StoreError> {
        self.doc.renumber();
        let signatures = changed.iter().map(|&id| self.doc.signature(id)).collect();
        self.save()?;
        Ok(signatures)
    }

    /// Prune empty tags, back up the current file, then write the whole
    /// serialized document.
    fn save(&mut self) -> Result<(), StoreError> {
        self.doc.prune_empty_tags();
        self.doc.renumber();
        let content = serialize_document(&self.doc);

        backup(&self.path)?;

        if let Err(source) = atomic_write(&self.path, content.as_bytes()) {
            tracing::warn!(path = %self.path.display(), error = %source, "write failed");
            log_recovery(
                &self.path,
                RecoveryEntry::new(RecoveryCategory::Write, "task file write failed")
                    .field("Target", self.path.display().to_string())
                    .field("Error", source.to_string())
                    .body(content),
            );
            return Err(StoreError::WriteError {
                path: self.path.clone(),
                source,
            });
        }

        if !self.dropped.is_empty() {
            log_recovery(
                &self.path,
                RecoveryEntry::new(RecoveryCategory::Parser, "dropped lines")
                    .field("Source", self.path.display().to_string())
                    .body(self.dropped.join("\n")),
            );
            self.dropped.clear();
        }

        tracing::debug!(path = %self.path.display(), items = self.doc.len(), "saved");
        Ok(())
    }
}
