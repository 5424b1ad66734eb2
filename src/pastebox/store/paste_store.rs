use super::backend::StorageBackend;
use super::DoctorReport;
use crate::error::{PasteError, Result};
use crate::ident;
use crate::model::{AliasPointer, FileEntry, MetaPatch, Paste, PasteMeta, PasteSummary, RenderMode};
use crate::render;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use uuid::Uuid;

pub struct PasteStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

/// Attachment names live directly under `files/`, so no separators or dot entries.
pub fn validate_filename(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        Err(PasteError::InvalidFilename(name.to_string()))
    } else {
        Ok(())
    }
}

// Fixed length, so staging never pushes a long name past the filesystem limit.
fn staging_name() -> String {
    format!("__temp_{}", Uuid::new_v4().simple())
}

fn sort_key(summary: &PasteSummary) -> DateTime<Utc> {
    if summary.updated_at == DateTime::<Utc>::UNIX_EPOCH {
        summary.created_at
    } else {
        summary.updated_at
    }
}

impl<B: StorageBackend> PasteStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- Identity ---

    /// A full record lives under this identifier.
    pub fn exists(&self, id: &str) -> Result<bool> {
        if !ident::is_valid_identifier(id) {
            return Ok(false);
        }
        Ok(self.backend.read_meta(id)?.is_some())
    }

    pub fn is_alias(&self, id: &str) -> Result<bool> {
        if !ident::is_valid_identifier(id) {
            return Ok(false);
        }
        Ok(self.backend.read_alias(id)?.is_some())
    }

    /// True for records, aliases and any other occupied slot.
    pub fn identifier_in_use(&self, id: &str) -> Result<bool> {
        if !ident::is_valid_identifier(id) {
            return Ok(false);
        }
        self.backend.slot_exists(id)
    }

    /// Follows at most one alias hop. Non-alias identifiers come back unchanged.
    pub fn resolve(&self, id: &str) -> Result<String> {
        if !ident::is_valid_identifier(id) {
            return Ok(id.to_string());
        }
        match self.backend.read_alias(id)? {
            Some(pointer) => Ok(pointer.parent),
            None => Ok(id.to_string()),
        }
    }

    /// A fresh identifier that is not allocated yet.
    pub fn generate_identifier(&self) -> Result<String> {
        ident::generate_identifier(|candidate| self.backend.slot_exists(candidate))
    }

    /// Format and global uniqueness check without allocating anything.
    pub fn check_available(&self, id: &str) -> Result<()> {
        ident::validate_identifier(id)?;
        if self.backend.slot_exists(id)? {
            return Err(PasteError::IdentifierConflict(id.to_string()));
        }
        Ok(())
    }

    // --- Records ---

    pub fn create(&self, patch: &MetaPatch, custom_id: Option<&str>) -> Result<Paste> {
        let id = match custom_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                self.check_available(id)?;
                id.to_string()
            }
            None => self.generate_identifier()?,
        };

        let mut meta = PasteMeta::new(Utc::now());
        meta.apply(patch);

        self.backend.create_slot(&id)?;
        if let Err(e) = self.backend.write_meta(&id, &meta) {
            let _ = self.backend.remove_slot(&id);
            return Err(e);
        }
        tracing::info!(id = %id, "created paste");
        Ok(Paste { id, meta })
    }

    pub fn load(&self, id: &str) -> Result<Paste> {
        if !ident::is_valid_identifier(id) {
            return Err(PasteError::NotFound(id.to_string()));
        }
        let meta = self
            .backend
            .read_meta(id)?
            .ok_or_else(|| PasteError::NotFound(id.to_string()))?;
        Ok(Paste {
            id: id.to_string(),
            meta,
        })
    }

    /// Resolve an alias (if any) and load the canonical record.
    pub fn load_resolved(&self, id: &str) -> Result<Paste> {
        let real_id = self.resolve(id)?;
        self.load(&real_id)
    }

    /// Every full record, newest first. Unreadable slots are skipped with a warning.
    pub fn list(&self, public_only: bool) -> Result<Vec<PasteSummary>> {
        let mut summaries = Vec::new();
        for id in self.backend.list_slots()? {
            if !ident::is_valid_identifier(&id) {
                continue;
            }
            match self.backend.read_meta(&id) {
                Ok(Some(meta)) => {
                    let paste = Paste { id, meta };
                    if public_only && !paste.is_public() {
                        continue;
                    }
                    summaries.push(paste.summary());
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(id = %id, error = %e, "skipping unreadable paste"),
            }
        }
        summaries.sort_by_key(|s| std::cmp::Reverse(sort_key(s)));
        Ok(summaries)
    }

    /// Stamp `updatedAt` and persist metadata.
    pub fn save(&self, paste: &mut Paste) -> Result<()> {
        paste.meta.updated_at = Utc::now();
        self.backend.write_meta(&paste.id, &paste.meta)
    }

    pub fn update(&self, paste: &mut Paste, patch: &MetaPatch) -> Result<()> {
        paste.meta.apply(patch);
        self.save(paste)
    }

    /// Removes every alias slot listed by the record, then the record itself.
    pub fn delete(&self, paste: Paste) -> Result<()> {
        for alias in &paste.meta.aliases {
            if !ident::is_valid_identifier(alias) {
                continue;
            }
            if self.backend.read_meta(alias)?.is_some() {
                tracing::warn!(alias = %alias, "listed alias is a full paste, leaving it");
                continue;
            }
            self.backend.remove_slot(alias)?;
        }
        self.backend.remove_slot(&paste.id)?;
        tracing::info!(id = %paste.id, "deleted paste");
        Ok(())
    }

    // --- Attachments ---

    pub fn add_file(
        &self,
        paste: &mut Paste,
        name: &str,
        content: &[u8],
        entry: FileEntry,
    ) -> Result<()> {
        validate_filename(name)?;
        self.backend.write_file(&paste.id, name, content)?;
        paste.meta.files.insert(name.to_string(), entry);
        self.save(paste)
    }

    /// `None` content keeps the stored bytes and only replaces the entry.
    pub fn update_file(
        &self,
        paste: &mut Paste,
        name: &str,
        content: Option<&[u8]>,
        entry: FileEntry,
    ) -> Result<()> {
        validate_filename(name)?;
        if let Some(bytes) = content {
            self.backend.write_file(&paste.id, name, bytes)?;
        }
        paste.meta.files.insert(name.to_string(), entry);
        self.save(paste)
    }

    pub fn remove_file(&self, paste: &mut Paste, name: &str) -> Result<()> {
        validate_filename(name)?;
        self.backend.delete_file(&paste.id, name)?;
        paste.meta.files.shift_remove(name);
        self.save(paste)
    }

    /// Single rename. Bytes already stored under `new` are replaced.
    pub fn rename_file(&self, paste: &mut Paste, old: &str, new: &str) -> Result<()> {
        self.move_files(paste, &[(old.to_string(), new.to_string())])
    }

    /// Applies a set of renames without intermediate collisions: every source is
    /// first staged under a fresh unique name, then each staged name moves to its
    /// final target. Swaps and rotations are therefore safe. Entries keep their
    /// position in the file order.
    pub fn move_files(&self, paste: &mut Paste, moves: &[(String, String)]) -> Result<()> {
        let moves: Vec<&(String, String)> = moves.iter().filter(|(f, t)| f != t).collect();
        if moves.is_empty() {
            return Ok(());
        }

        let mut targets = HashSet::new();
        for (from, to) in &moves {
            if !paste.meta.files.contains_key(from) {
                return Err(PasteError::FileNotFound(from.clone()));
            }
            validate_filename(to)?;
            if !targets.insert(to.as_str()) {
                return Err(PasteError::InvalidFilename(to.clone()));
            }
        }

        let mut staged: Vec<(String, &str, &str)> = Vec::with_capacity(moves.len());
        for (from, to) in &moves {
            let temp = staging_name();
            tracing::debug!(from = %from, temp = %temp, "staging file rename");
            if let Err(e) = self.backend.rename_file(&paste.id, from, &temp) {
                self.unstage(&paste.id, &staged);
                return Err(e);
            }
            staged.push((temp, from.as_str(), to.as_str()));
        }
        for (temp, from, to) in &staged {
            if let Err(e) = self.backend.rename_file(&paste.id, temp, to) {
                tracing::error!(id = %paste.id, from = %from, temp = %temp, error = %e, "file left under staging name");
                return Err(e);
            }
        }

        let renamed: HashMap<&str, &str> = moves
            .iter()
            .map(|(f, t)| (f.as_str(), t.as_str()))
            .collect();
        let mut files = IndexMap::with_capacity(paste.meta.files.len());
        for (name, entry) in paste.meta.files.drain(..) {
            if let Some(target) = renamed.get(name.as_str()) {
                files.insert(target.to_string(), entry);
            } else if !targets.contains(name.as_str()) {
                files.insert(name, entry);
            }
        }
        paste.meta.files = files;
        self.save(paste)
    }

    // Puts staged sources back under their original names, newest first.
    fn unstage(&self, id: &str, staged: &[(String, &str, &str)]) {
        for (temp, from, _) in staged.iter().rev() {
            if let Err(e) = self.backend.rename_file(id, temp, from) {
                tracing::error!(id = %id, from = %from, temp = %temp, error = %e, "could not restore staged file");
            }
        }
    }

    /// Names come first in the given order; unknown names are ignored and any
    /// unlisted entries follow in their previous order.
    pub fn reorder_files(&self, paste: &mut Paste, order: &[String]) -> Result<()> {
        let mut files = IndexMap::with_capacity(paste.meta.files.len());
        for name in order {
            if let Some(entry) = paste.meta.files.shift_remove(name) {
                files.insert(name.clone(), entry);
            }
        }
        files.extend(paste.meta.files.drain(..));
        paste.meta.files = files;
        self.save(paste)
    }

    pub fn read_file(&self, paste: &Paste, name: &str) -> Result<Option<Vec<u8>>> {
        validate_filename(name)?;
        self.backend.read_file(&paste.id, name)
    }

    /// Text content as shown inline. `None` means the bytes are missing.
    /// Image attachments never load, binary `file`/`file-link` attachments
    /// come back empty.
    pub fn get_file(&self, paste: &Paste, name: &str) -> Result<Option<String>> {
        let Some(bytes) = self.read_file(paste, name)? else {
            return Ok(None);
        };
        let render = paste
            .meta
            .files
            .get(name)
            .map(|e| e.render.clone())
            .unwrap_or_default();
        let text = match render {
            RenderMode::Image => String::new(),
            RenderMode::File | RenderMode::FileLink if render::is_binary(&bytes) => String::new(),
            _ => String::from_utf8_lossy(&bytes).into_owned(),
        };
        Ok(Some(text))
    }

    pub fn is_file_binary(&self, paste: &Paste, name: &str) -> Result<bool> {
        let Some(bytes) = self.read_file(paste, name)? else {
            return Ok(false);
        };
        let render = paste.meta.files.get(name).map(|e| &e.render);
        Ok(match render {
            Some(RenderMode::Image) => true,
            Some(RenderMode::File) | Some(RenderMode::FileLink) => render::is_binary(&bytes),
            _ => false,
        })
    }

    /// Location of stored bytes, `None` if nothing is stored under that name.
    pub fn file_path(&self, paste: &Paste, name: &str) -> Result<Option<PathBuf>> {
        validate_filename(name)?;
        if self.backend.list_files(&paste.id)?.iter().any(|f| f == name) {
            Ok(Some(self.backend.file_path(&paste.id, name)))
        } else {
            Ok(None)
        }
    }

    // --- Aliases ---

    /// Creates an alias slot pointing at the record. A generated identifier is
    /// used when none is given.
    pub fn add_alias(&self, paste: &mut Paste, alias: Option<&str>) -> Result<String> {
        let alias = match alias.filter(|a| !a.is_empty()) {
            Some(alias) => {
                self.check_available(alias)?;
                alias.to_string()
            }
            None => self.generate_identifier()?,
        };

        self.backend.create_slot(&alias)?;
        let pointer = AliasPointer {
            parent: paste.id.clone(),
        };
        if let Err(e) = self.backend.write_alias(&alias, &pointer) {
            let _ = self.backend.remove_slot(&alias);
            return Err(e);
        }

        paste.meta.aliases.push(alias.clone());
        self.save(paste)?;
        tracing::info!(id = %paste.id, alias = %alias, "added alias");
        Ok(alias)
    }

    pub fn remove_alias(&self, paste: &mut Paste, alias: &str) -> Result<()> {
        if !paste.meta.aliases.iter().any(|a| a == alias) {
            return Err(PasteError::NotAssociated {
                alias: alias.to_string(),
                paste: paste.id.clone(),
            });
        }

        if ident::is_valid_identifier(alias) && self.backend.read_alias(alias)?.is_some() {
            self.backend.remove_slot(alias)?;
        }

        paste.meta.aliases.retain(|a| a != alias);
        self.save(paste)?;
        tracing::info!(id = %paste.id, alias = %alias, "removed alias");
        Ok(())
    }

    /// Promotes an alias to canonical identifier. The record slot is renamed, the
    /// old identifier becomes an alias, and remaining alias pointers are rewritten.
    ///
    /// The slot rename is the one non-atomic step: an interruption right after the
    /// promoted alias slot is removed leaves the record under its old identifier
    /// still listing that alias, which `doctor` restores.
    pub fn make_primary(&self, paste: &mut Paste, alias: &str) -> Result<()> {
        if !paste.meta.aliases.iter().any(|a| a == alias) {
            return Err(PasteError::NotAssociated {
                alias: alias.to_string(),
                paste: paste.id.clone(),
            });
        }
        ident::validate_identifier(alias)?;
        if self.backend.read_meta(alias)?.is_some() {
            return Err(PasteError::IdentifierConflict(alias.to_string()));
        }

        let old_id = paste.id.clone();
        let new_id = alias.to_string();
        let others: Vec<String> = paste
            .meta
            .aliases
            .iter()
            .filter(|a| *a != alias)
            .cloned()
            .collect();

        tracing::debug!(alias = %new_id, "removing promoted alias slot");
        self.backend.remove_slot(&new_id)?;

        tracing::debug!(from = %old_id, to = %new_id, "renaming paste slot");
        self.backend.rename_slot(&old_id, &new_id)?;

        paste.id = new_id.clone();
        let mut aliases = Vec::with_capacity(others.len() + 1);
        aliases.push(old_id.clone());
        aliases.extend(others.iter().cloned());
        paste.meta.aliases = aliases;
        self.save(paste)?;

        self.backend.create_slot(&old_id)?;
        let pointer = AliasPointer {
            parent: new_id.clone(),
        };
        if let Err(e) = self.backend.write_alias(&old_id, &pointer) {
            let _ = self.backend.remove_slot(&old_id);
            return Err(e);
        }

        for other in &others {
            if !ident::is_valid_identifier(other) {
                continue;
            }
            match self.backend.read_alias(other) {
                Ok(Some(_)) => {
                    if let Err(e) = self.backend.write_alias(other, &pointer) {
                        tracing::warn!(alias = %other, error = %e, "failed to repoint alias");
                    }
                }
                Ok(None) => tracing::warn!(alias = %other, "listed alias has no pointer"),
                Err(e) => tracing::warn!(alias = %other, error = %e, "failed to read alias"),
            }
        }

        tracing::info!(from = %old_id, to = %new_id, "promoted alias to primary");
        Ok(())
    }

    // --- Reconciliation ---

    /// Restores the two-way alias invariant and reports attachment drift.
    ///
    /// Listed aliases with no slot are recreated (this also rolls back a
    /// promotion interrupted before the rename). Listed aliases that point at a
    /// missing parent are repointed; ones owned by another record that lists
    /// them, or that are full records, are dropped from the listing. Alias
    /// slots no record claims are removed.
    pub fn doctor(&self) -> Result<DoctorReport> {
        let mut report = DoctorReport::default();
        let mut records: BTreeMap<String, PasteMeta> = BTreeMap::new();
        let mut pointers: BTreeMap<String, AliasPointer> = BTreeMap::new();

        for id in self.backend.list_slots()? {
            if !ident::is_valid_identifier(&id) {
                continue;
            }
            match self.backend.read_meta(&id) {
                Ok(Some(meta)) => {
                    records.insert(id, meta);
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "unreadable metadata");
                    report.unreadable_slots += 1;
                    continue;
                }
            }
            match self.backend.read_alias(&id) {
                Ok(Some(pointer)) => {
                    pointers.insert(id, pointer);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "unreadable alias pointer");
                    report.unreadable_slots += 1;
                }
            }
        }

        let record_ids: Vec<String> = records.keys().cloned().collect();
        for id in &record_ids {
            let listed = records[id].aliases.clone();
            let mut kept: Vec<String> = Vec::with_capacity(listed.len());

            for alias in listed {
                if alias == *id || kept.contains(&alias) || !ident::is_valid_identifier(&alias) {
                    tracing::warn!(id = %id, alias = %alias, "dropping invalid alias listing");
                    report.dropped_aliases += 1;
                    continue;
                }
                if records.contains_key(&alias) {
                    tracing::warn!(id = %id, alias = %alias, "listed alias is a full paste");
                    report.dropped_aliases += 1;
                    continue;
                }

                let parent = pointers.get(&alias).map(|p| p.parent.clone());
                match parent {
                    Some(parent) if parent == *id => kept.push(alias),
                    Some(parent)
                        if records
                            .get(&parent)
                            .is_some_and(|m| m.aliases.contains(&alias)) =>
                    {
                        tracing::warn!(id = %id, alias = %alias, owner = %parent, "alias owned elsewhere");
                        report.dropped_aliases += 1;
                    }
                    Some(_) => {
                        let pointer = AliasPointer { parent: id.clone() };
                        self.backend.write_alias(&alias, &pointer)?;
                        tracing::warn!(id = %id, alias = %alias, "repointed stray alias");
                        pointers.insert(alias.clone(), pointer);
                        report.repointed_aliases += 1;
                        kept.push(alias);
                    }
                    None => {
                        if !self.backend.slot_exists(&alias)? {
                            self.backend.create_slot(&alias)?;
                        }
                        let pointer = AliasPointer { parent: id.clone() };
                        self.backend.write_alias(&alias, &pointer)?;
                        tracing::warn!(id = %id, alias = %alias, "recreated missing alias");
                        pointers.insert(alias.clone(), pointer);
                        report.recreated_aliases += 1;
                        kept.push(alias);
                    }
                }
            }

            if let Some(meta) = records.get_mut(id) {
                if meta.aliases != kept {
                    meta.aliases = kept;
                    self.backend.write_meta(id, meta)?;
                }
            }
        }

        for (alias, pointer) in &pointers {
            let claimed = records
                .get(&pointer.parent)
                .is_some_and(|m| m.aliases.contains(alias));
            if !claimed {
                tracing::warn!(alias = %alias, parent = %pointer.parent, "removing orphan alias");
                self.backend.remove_slot(alias)?;
                report.removed_orphan_aliases += 1;
            }
        }

        for (id, meta) in &records {
            let on_disk: HashSet<String> = self.backend.list_files(id)?.into_iter().collect();
            for name in meta.files.keys() {
                if !on_disk.contains(name) {
                    tracing::warn!(id = %id, file = %name, "attachment missing on disk");
                    report.missing_attachments += 1;
                }
            }
            for name in &on_disk {
                if !meta.files.contains_key(name) {
                    tracing::warn!(id = %id, file = %name, "unlisted file on disk");
                    report.unlisted_files += 1;
                }
            }
        }

        Ok(report)
    }
}
