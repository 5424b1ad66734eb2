use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;

use super::helpers::load_paste;

/// Deletes a paste and every alias it lists. An alias id deletes its parent.
pub fn run<B: StorageBackend>(store: &PasteStore<B>, id: &str) -> Result<CmdResult> {
    let paste = load_paste(store, id)?;
    let message = format!("Paste deleted ({}): {}", paste.id, paste.meta.title);
    let deleted_id = paste.id.clone();
    store.delete(paste)?;

    let mut result = CmdResult::default().with_identifier(deleted_id);
    result.add_message(CmdMessage::success(message));
    Ok(result)
}
