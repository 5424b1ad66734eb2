use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;

use super::helpers::{finish, load_paste};

/// Adds an alias, generating one when `alias` is `None`.
pub fn add<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    alias: Option<&str>,
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    let alias = store.add_alias(&mut paste, alias)?;

    let mut result = CmdResult::default().with_identifier(alias.clone());
    result.add_message(CmdMessage::success(format!(
        "Alias added ({}): {}",
        paste.id, alias
    )));
    finish(store, base_path, paste, result)
}

pub fn remove<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    alias: &str,
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    store.remove_alias(&mut paste, alias)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Alias removed ({}): {}",
        paste.id, alias
    )));
    finish(store, base_path, paste, result)
}

/// Makes `alias` the canonical identifier. The public path changes, so the
/// paste is re-rendered under its new slot.
pub fn promote<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    alias: &str,
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    let old_id = paste.id.clone();
    store.make_primary(&mut paste, alias)?;

    let mut result = CmdResult::default().with_identifier(paste.id.clone());
    result.add_message(CmdMessage::success(format!(
        "{} is now the primary identifier ({} kept as alias)",
        paste.id, old_id
    )));
    finish(store, base_path, paste, result)
}

/// Proposes a fresh identifier without allocating it.
pub fn generate<B: StorageBackend>(store: &PasteStore<B>, id: &str) -> Result<CmdResult> {
    load_paste(store, id)?;
    let alias = store.generate_identifier()?;
    let mut result = CmdResult::default().with_identifier(alias.clone());
    result.add_message(CmdMessage::info(alias));
    Ok(result)
}

/// Checks format and availability of a proposed alias without allocating it.
/// Problems are reported as error messages, not raised.
pub fn check<B: StorageBackend>(store: &PasteStore<B>, id: &str, alias: &str) -> Result<CmdResult> {
    load_paste(store, id)?;
    let mut result = CmdResult::default();
    match store.check_available(alias) {
        Ok(()) => {
            result.identifier = Some(alias.to_string());
            result.add_message(CmdMessage::success(format!("{} is available", alias)));
        }
        Err(e) => result.add_message(CmdMessage::error(e.to_string())),
    }
    Ok(result)
}

/// Canonical identifier for any identifier, one alias hop.
pub fn resolve<B: StorageBackend>(store: &PasteStore<B>, id: &str) -> Result<CmdResult> {
    let paste = load_paste(store, id)?;
    let mut result = CmdResult::default().with_identifier(paste.id.clone());
    if paste.id != id {
        result.add_message(CmdMessage::info(format!("{} is an alias of {}", id, paste.id)));
    }
    result.affected_pastes.push(paste);
    Ok(result)
}
