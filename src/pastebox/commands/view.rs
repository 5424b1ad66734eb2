use crate::commands::{CmdMessage, CmdResult};
use crate::compiler::PasteCompiler;
use crate::error::Result;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;

use super::helpers::load_paste;

/// Read path: cached document for any identifier, rebuilt only when missing.
/// When `id` is an alias the canonical URL is reported.
pub fn run<B: StorageBackend>(store: &PasteStore<B>, base_path: &str, id: &str) -> Result<CmdResult> {
    let paste = load_paste(store, id)?;
    let html = PasteCompiler::new(store, base_path).ensure_rendered(&paste)?;
    let url = paste.html_url(base_path);

    let mut result = CmdResult::default()
        .with_html(html)
        .with_url(url.clone())
        .with_identifier(paste.id.clone());
    if paste.id != id {
        result.add_message(CmdMessage::info(format!("Canonical URL: {}", url)));
    }
    result.affected_pastes.push(paste);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetaPatch;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn view_builds_missing_cache() {
        let store = PasteStore::with_backend(MemBackend::new());
        store.create(&MetaPatch::default(), Some("p")).unwrap();
        let result = run(&store, "", "p").unwrap();
        assert!(result.html.is_some());
        assert!(result.messages.is_empty());
        assert!(store
            .backend()
            .read_output("p", "untitled.html")
            .unwrap()
            .is_some());
    }

    #[test]
    fn view_by_alias_reports_canonical_url() {
        let store = PasteStore::with_backend(MemBackend::new());
        let mut paste = store.create(&MetaPatch::default(), Some("p")).unwrap();
        store.add_alias(&mut paste, Some("al")).unwrap();

        let result = run(&store, "/b", "al").unwrap();
        assert_eq!(result.url.as_deref(), Some("/b/notes/p/untitled.html"));
        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].content.contains("/b/notes/p/untitled.html"));
    }
}
