use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Paste;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;
use crate::submission::{self, PasteForm, Upload};
use std::collections::HashMap;

use super::helpers::{finish, load_paste};

/// Applies a full edit submission: metadata, the file set, an optional
/// promotion and the alias set, then re-renders.
///
/// Promotion and per-alias failures are logged and reported as warnings; the
/// rest of the edit still goes through.
pub fn run<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    form: PasteForm,
    uploads: &HashMap<usize, Upload>,
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    let mut result = CmdResult::default();

    store.update(&mut paste, &form.meta)?;

    let existing: Vec<String> = paste.meta.files.keys().cloned().collect();
    let plan = submission::plan(&existing, submission::process_all(&form.files, uploads));
    submission::apply(store, &mut paste, plan)?;

    let mut promoted: Option<(String, String)> = None;
    if let Some(target) = form.make_primary.filter(|t| !t.is_empty()) {
        let old_id = paste.id.clone();
        match store.make_primary(&mut paste, &target) {
            Ok(()) => {
                result.add_message(CmdMessage::success(format!(
                    "{} is now the primary identifier ({} kept as alias)",
                    target, old_id
                )));
                promoted = Some((old_id, target));
            }
            Err(e) => {
                tracing::warn!(id = %old_id, alias = %target, error = %e, "promotion failed");
                result.add_message(CmdMessage::warning(format!(
                    "Could not make {} primary: {}",
                    target, e
                )));
            }
        }
    }

    if let Some(submitted) = form.aliases {
        let mut submitted: Vec<String> = submitted.into_iter().filter(|a| !a.is_empty()).collect();
        if let Some((old_id, new_id)) = &promoted {
            submitted = after_promotion(submitted, old_id, new_id);
        }
        sync_aliases(store, &mut paste, &submitted, &mut result);
    }

    result.add_message(CmdMessage::success(format!(
        "Paste updated ({}): {}",
        paste.id, paste.meta.title
    )));
    finish(store, base_path, paste, result)
}

/// Maps an alias set written against the pre-promotion identity onto the new
/// one. The promoted identifier becomes the old one, which is always kept.
fn after_promotion(submitted: Vec<String>, old_id: &str, new_id: &str) -> Vec<String> {
    let mut mapped: Vec<String> = Vec::with_capacity(submitted.len() + 1);
    for alias in submitted {
        let alias = if alias == new_id {
            old_id.to_string()
        } else {
            alias
        };
        if !mapped.contains(&alias) {
            mapped.push(alias);
        }
    }
    if !mapped.iter().any(|a| a == old_id) {
        mapped.insert(0, old_id.to_string());
    }
    mapped
}

/// Removes aliases missing from `submitted` and adds the new ones, one at a time.
pub fn sync_aliases<B: StorageBackend>(
    store: &PasteStore<B>,
    paste: &mut Paste,
    submitted: &[String],
    result: &mut CmdResult,
) {
    let existing = paste.meta.aliases.clone();

    for alias in existing.iter().filter(|a| !submitted.contains(a)) {
        match store.remove_alias(paste, alias) {
            Ok(()) => result.add_message(CmdMessage::info(format!("Alias removed: {}", alias))),
            Err(e) => {
                tracing::warn!(alias = %alias, error = %e, "failed to remove alias");
                result.add_message(CmdMessage::warning(format!(
                    "Could not remove alias {}: {}",
                    alias, e
                )));
            }
        }
    }

    for alias in submitted.iter().filter(|a| !existing.contains(a)) {
        match store.add_alias(paste, Some(alias.as_str())) {
            Ok(_) => result.add_message(CmdMessage::info(format!("Alias added: {}", alias))),
            Err(e) => {
                tracing::warn!(alias = %alias, error = %e, "failed to add alias");
                result.add_message(CmdMessage::warning(format!(
                    "Could not add alias {}: {}",
                    alias, e
                )));
            }
        }
    }
}
