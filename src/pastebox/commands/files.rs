use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PasteError, Result};
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;
use crate::submission::ProcessedFile;

use super::helpers::{finish, load_paste};

/// Attaches one processed file, replacing any file of the same name.
pub fn add<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    file: ProcessedFile,
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    let replaced = paste.meta.files.contains_key(&file.filename);
    let content = file.content.unwrap_or_default();
    store.add_file(&mut paste, &file.filename, &content, file.entry)?;

    let mut result = CmdResult::default();
    let verb = if replaced { "replaced" } else { "added" };
    result.add_message(CmdMessage::success(format!(
        "File {} ({}): {}",
        verb, paste.id, file.filename
    )));
    finish(store, base_path, paste, result)
}

pub fn remove<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    name: &str,
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    if !paste.meta.files.contains_key(name) {
        return Err(PasteError::FileNotFound(name.to_string()));
    }
    store.remove_file(&mut paste, name)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "File removed ({}): {}",
        paste.id, name
    )));
    finish(store, base_path, paste, result)
}

pub fn rename<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    old: &str,
    new: &str,
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    store.rename_file(&mut paste, old, new)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "File renamed ({}): {} -> {}",
        paste.id, old, new
    )));
    finish(store, base_path, paste, result)
}

pub fn reorder<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    order: &[String],
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    let mut result = CmdResult::default();
    for name in order.iter().filter(|n| !paste.meta.files.contains_key(*n)) {
        result.add_message(CmdMessage::warning(format!("Unknown file ignored: {}", name)));
    }
    store.reorder_files(&mut paste, order)?;

    let listing: Vec<&str> = paste.meta.files.keys().map(String::as_str).collect();
    result.add_message(CmdMessage::success(format!(
        "Files reordered ({}): {}",
        paste.id,
        listing.join(", ")
    )));
    finish(store, base_path, paste, result)
}
