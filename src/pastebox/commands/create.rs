use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::MetaPatch;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;
use crate::submission::{self, ProcessedFile};

use super::helpers::finish;

/// Creates a paste, attaches the submitted files in order and renders it.
/// Repeated filenames get the `file{index}_` prefix.
pub fn run<B: StorageBackend>(
    store: &PasteStore<B>,
    base_path: &str,
    patch: &MetaPatch,
    custom_id: Option<&str>,
    files: Vec<ProcessedFile>,
) -> Result<CmdResult> {
    let mut paste = store.create(patch, custom_id)?;
    let plan = submission::plan(&[], files);
    for (name, content, entry) in plan.additions {
        store.add_file(&mut paste, &name, &content, entry)?;
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Paste created ({}): {}",
        paste.id, paste.meta.title
    )));
    result.identifier = Some(paste.id.clone());
    finish(store, base_path, paste, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use crate::submission::{process, FileSubmission};

    fn file(name: &str, content: &str) -> ProcessedFile {
        process(
            &FileSubmission {
                filename: name.into(),
                content: Some(content.into()),
                ..FileSubmission::default()
            },
            None,
        )
    }

    #[test]
    fn creates_paste_with_files_and_cache() {
        let store = PasteStore::with_backend(MemBackend::new());
        let patch = MetaPatch {
            title: Some("Hello".into()),
            ..MetaPatch::default()
        };
        let result = run(
            &store,
            "",
            &patch,
            Some("hello"),
            vec![file("a.txt", "one"), file("a.txt", "two")],
        )
        .unwrap();

        assert_eq!(result.url.as_deref(), Some("/notes/hello/hello.html"));
        let paste = store.load("hello").unwrap();
        let names: Vec<_> = paste.meta.files.keys().cloned().collect();
        assert_eq!(names, vec!["a.txt", "file1_a.txt"]);
        assert!(store
            .backend()
            .read_output("hello", "hello.html")
            .unwrap()
            .is_some());
    }

    #[test]
    fn conflicting_id_creates_nothing() {
        let store = PasteStore::with_backend(MemBackend::new());
        run(&store, "", &MetaPatch::default(), Some("x"), vec![]).unwrap();
        assert!(run(&store, "", &MetaPatch::default(), Some("x"), vec![]).is_err());
        assert_eq!(store.list(false).unwrap().len(), 1);
    }
}
