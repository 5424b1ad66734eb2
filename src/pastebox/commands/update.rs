use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::MetaPatch;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;

use super::helpers::{finish, load_paste};

/// Paste-level metadata edit; absent fields keep their stored value.
pub fn run<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    id: &str,
    patch: &MetaPatch,
) -> Result<CmdResult> {
    let mut paste = load_paste(store, id)?;
    store.update(&mut paste, patch)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Paste updated ({}): {}",
        paste.id, paste.meta.title
    )));
    finish(store, base_path, paste, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn patch_keeps_unset_fields() {
        let store = PasteStore::with_backend(MemBackend::new());
        let initial = MetaPatch {
            title: Some("Before".into()),
            author: Some("Kim".into()),
            ..MetaPatch::default()
        };
        store.create(&initial, Some("p")).unwrap();

        let patch = MetaPatch {
            title: Some("After".into()),
            ..MetaPatch::default()
        };
        run(&store, "", "p", &patch).unwrap();

        let paste = store.load("p").unwrap();
        assert_eq!(paste.meta.title, "After");
        assert_eq!(paste.meta.author, "Kim");
        assert!(store
            .backend()
            .read_output("p", "after.html")
            .unwrap()
            .is_some());
    }

    #[test]
    fn update_through_alias_targets_record() {
        let store = PasteStore::with_backend(MemBackend::new());
        let mut paste = store.create(&MetaPatch::default(), Some("p")).unwrap();
        store.add_alias(&mut paste, Some("al")).unwrap();

        let patch = MetaPatch {
            public: Some(true),
            ..MetaPatch::default()
        };
        let result = run(&store, "", "al", &patch).unwrap();
        assert_eq!(result.affected_pastes[0].id, "p");
        assert!(store.load("p").unwrap().meta.public);
    }
}
