use crate::commands::{CmdMessage, CmdResult};
use crate::compiler::PasteCompiler;
use crate::error::Result;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;

use super::helpers::load_paste;

/// Rebuilds one paste's cached document.
pub fn run<B: StorageBackend>(store: &PasteStore<B>, base_path: &str, id: &str) -> Result<CmdResult> {
    let paste = load_paste(store, id)?;
    let html = PasteCompiler::new(store, base_path).render(&paste)?;

    let mut result = CmdResult::default()
        .with_html(html)
        .with_url(paste.html_url(base_path));
    result.add_message(CmdMessage::success(format!("Rendered {}", paste.id)));
    result.affected_pastes.push(paste);
    Ok(result)
}

/// Rebuilds every cached document. Individual failures are reported as
/// messages and do not stop the pass.
pub fn run_all<B: StorageBackend>(store: &PasteStore<B>, base_path: &str) -> Result<CmdResult> {
    let outcomes = PasteCompiler::new(store, base_path).rerender_all()?;

    let mut result = CmdResult::default();
    let failed = outcomes.iter().filter(|o| !o.success).count();
    for outcome in outcomes.iter().filter(|o| !o.success) {
        result.add_message(CmdMessage::error(format!(
            "{}: {}",
            outcome.id,
            outcome.error.as_deref().unwrap_or("unknown error")
        )));
    }
    let rendered = outcomes.len() - failed;
    if failed == 0 {
        result.add_message(CmdMessage::success(format!("Rendered {} paste(s)", rendered)));
    } else {
        result.add_message(CmdMessage::warning(format!(
            "Rendered {} paste(s), {} failed",
            rendered, failed
        )));
    }
    result.render_outcomes = outcomes;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetaPatch;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn render_one_via_alias() {
        let store = PasteStore::with_backend(MemBackend::new());
        let mut paste = store.create(&MetaPatch::default(), Some("p")).unwrap();
        store.add_alias(&mut paste, Some("al")).unwrap();

        let result = run(&store, "/x", "al").unwrap();
        assert_eq!(result.url.as_deref(), Some("/x/notes/p/untitled.html"));
        assert!(result.html.unwrap().contains("<title>Untitled</title>"));
    }

    #[test]
    fn run_all_collects_outcomes() {
        let store = PasteStore::with_backend(MemBackend::new());
        store.create(&MetaPatch::default(), Some("a")).unwrap();
        store.create(&MetaPatch::default(), Some("b")).unwrap();

        let result = run_all(&store, "").unwrap();
        assert_eq!(result.render_outcomes.len(), 2);
        assert!(!result.has_errors());

        store.backend().set_simulate_write_error(true);
        let failed = run_all(&store, "").unwrap();
        assert!(failed.has_errors());
        assert!(failed.render_outcomes.iter().all(|o| !o.success));
    }
}
