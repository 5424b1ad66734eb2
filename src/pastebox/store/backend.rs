use crate::error::Result;
use crate::model::{AliasPointer, PasteMeta};
use std::path::PathBuf;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (directories on disk vs memory),
/// while PasteStore handles the "what" (identity, aliases, file mutation, doctor).
///
/// Every identifier owns one slot. A slot holding metadata is a record, a slot
/// holding only a parent pointer is an alias, anything else is ignored.
pub trait StorageBackend {
    // --- Slot Operations ---

    /// True if a slot directory exists under this identifier, whatever it holds.
    fn slot_exists(&self, id: &str) -> Result<bool>;

    /// List every slot name in the store (records, aliases and invalid entries).
    fn list_slots(&self) -> Result<Vec<String>>;

    /// Create an empty slot with its attachment area.
    fn create_slot(&self, id: &str) -> Result<()>;

    /// Remove a slot and everything in it. Missing slots are not an error.
    fn remove_slot(&self, id: &str) -> Result<()>;

    /// Move a whole slot to a new identifier. Fails if the target exists.
    fn rename_slot(&self, from: &str, to: &str) -> Result<()>;

    // --- Metadata Operations ---

    /// Returns Ok(None) when the slot carries no metadata document.
    fn read_meta(&self, id: &str) -> Result<Option<PasteMeta>>;

    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_meta(&self, id: &str, meta: &PasteMeta) -> Result<()>;

    /// Returns Ok(None) when the slot carries no alias pointer.
    fn read_alias(&self, id: &str) -> Result<Option<AliasPointer>>;

    fn write_alias(&self, id: &str, pointer: &AliasPointer) -> Result<()>;

    // --- Attachment Operations ---

    /// Raw attachment bytes, or Ok(None) if the file does not exist.
    fn read_file(&self, id: &str, name: &str) -> Result<Option<Vec<u8>>>;

    fn write_file(&self, id: &str, name: &str, bytes: &[u8]) -> Result<()>;

    /// Rename an attachment, replacing any file already at the target name.
    /// A missing source is not an error.
    fn rename_file(&self, id: &str, from: &str, to: &str) -> Result<()>;

    /// Delete an attachment. A missing file is not an error.
    fn delete_file(&self, id: &str, name: &str) -> Result<()>;

    /// Names of every attachment physically present in the slot.
    fn list_files(&self, id: &str) -> Result<Vec<String>>;

    // --- Rendered Output ---

    fn read_output(&self, id: &str, name: &str) -> Result<Option<String>>;

    /// Overwrites any previous cache. MUST be atomic.
    fn write_output(&self, id: &str, name: &str, html: &str) -> Result<()>;

    /// Names of the cached documents (`*.html`) in the slot.
    fn list_outputs(&self, id: &str) -> Result<Vec<String>>;

    /// Delete a cached document. A missing file is not an error.
    fn delete_output(&self, id: &str, name: &str) -> Result<()>;

    // --- Paths ---

    /// Location of an attachment. For FsBackend the real path, for MemBackend a virtual one.
    fn file_path(&self, id: &str, name: &str) -> PathBuf;

    fn output_path(&self, id: &str, name: &str) -> PathBuf;
}
