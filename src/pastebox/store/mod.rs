//! # Storage Layer
//!
//! Every identifier owns one directory ("slot") under the notes root. A slot is
//! exactly one of:
//!
//! 1. **Record**: carries `_meta.json`, attachments under `files/` and a cached
//!    `<slug>.html`.
//! 2. **Alias**: carries only `_alias.json` with a `parent` pointer to a record.
//! 3. **Invalid**: anything else, ignored by listing and resolution.
//!
//! Identifiers are unique across records and aliases combined. Aliases are never
//! chained: a pointer always names a full record.
//!
//! ## Alias Bookkeeping
//!
//! A record lists its aliases in metadata and every listed alias slot points back
//! at it. Every mutation keeps both sides in step; [`paste_store::PasteStore::doctor`]
//! repairs them after an interrupted multi-step operation.
//!
//! ## Concurrency
//!
//! No locking. Single file writes go through a tmp file and rename so they are
//! never torn, but two writers on the same record race and the last metadata
//! write wins. Multi-step protocols (staged renames, promotion) are not atomic as
//! a whole.
//!
//! TODO: a per-identifier lock file around mutations for concurrent editors.
//!
//! ## Storage Layout
//!
//! ```text
//! notes/
//! ├── config.json
//! ├── <id>/
//! │   ├── _meta.json
//! │   ├── <slug>.html
//! │   └── files/<filename>
//! └── <alias>/
//!     └── _alias.json
//! ```

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod paste_store;

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub recreated_aliases: usize,
    pub repointed_aliases: usize,
    pub dropped_aliases: usize,
    pub removed_orphan_aliases: usize,
    pub missing_attachments: usize,
    pub unlisted_files: usize,
    pub unreadable_slots: usize,
}

impl DoctorReport {
    pub fn repairs(&self) -> usize {
        self.recreated_aliases
            + self.repointed_aliases
            + self.dropped_aliases
            + self.removed_orphan_aliases
    }

    pub fn warnings(&self) -> usize {
        self.missing_attachments + self.unlisted_files + self.unreadable_slots
    }

    pub fn is_clean(&self) -> bool {
        self.repairs() == 0 && self.warnings() == 0
    }
}
