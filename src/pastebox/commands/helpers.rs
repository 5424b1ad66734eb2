use crate::compiler::PasteCompiler;
use crate::error::Result;
use crate::model::Paste;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;

use super::CmdResult;

/// Loads the record behind an identifier, following one alias hop.
pub fn load_paste<B: StorageBackend>(store: &PasteStore<B>, id: &str) -> Result<Paste> {
    store.load_resolved(id)
}

/// Re-renders after a mutation and records the paste and its URL on the result.
pub fn finish<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    paste: Paste,
    mut result: CmdResult,
) -> Result<CmdResult> {
    PasteCompiler::new(store, base_path).render(&paste)?;
    result.url = Some(paste.html_url(base_path));
    result.affected_pastes.push(paste);
    Ok(result)
}
