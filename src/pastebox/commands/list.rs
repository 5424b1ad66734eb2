use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;

pub fn run<B: StorageBackend>(store: &PasteStore<B>, public_only: bool) -> Result<CmdResult> {
    let listed = store.list(public_only)?;
    Ok(CmdResult::default().with_listed_pastes(listed))
}
