//! Paste compiler: materializes a record as a cached HTML document.
//!
//! The document is rebuilt from metadata and attachment bytes on every call and
//! written over the previous cache, so repeated renders of unchanged input give
//! identical output.

use crate::error::Result;
use crate::model::Paste;
use crate::render;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;
use minijinja::{context, Environment, Value};
use serde::Serialize;

const TEMPLATE_NAME: &str = "paste.html";
const PASTE_TEMPLATE: &str = include_str!("templates/paste.html");

#[derive(Debug, Clone, Serialize)]
pub struct RenderedFile {
    pub name: String,
    pub label: String,
    pub description: String,
    pub unwrapped: bool,
    pub collapsed: bool,
    pub collapsed_description: String,
    pub html: String,
}

/// Per-record result of a bulk re-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutcome {
    pub id: String,
    pub title: String,
    pub success: bool,
    pub error: Option<String>,
}

fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, PASTE_TEMPLATE)?;
    Ok(env)
}

/// Files shown for the record's display mode, in stored order.
///
/// `single-*` modes show only the selected file when it exists; otherwise every
/// non-hidden file is shown.
pub fn visible_files(paste: &Paste) -> Vec<&str> {
    let selected = paste.meta.selected_file.as_str();
    if paste.meta.display_mode.is_single()
        && !selected.is_empty()
        && paste.meta.files.contains_key(selected)
    {
        return vec![selected];
    }
    paste
        .meta
        .files
        .iter()
        .filter(|(_, entry)| !entry.hidden)
        .map(|(name, _)| name.as_str())
        .collect()
}

pub struct PasteCompiler<'a, B: StorageBackend> {
    store: &'a PasteStore<B>,
    base_path: &'a str,
}

impl<'a, B: StorageBackend> PasteCompiler<'a, B> {
    pub fn new(store: &'a PasteStore<B>, base_path: &'a str) -> Self {
        Self { store, base_path }
    }

    /// Builds the document without touching the cache.
    pub fn build(&self, paste: &Paste) -> Result<String> {
        let mut files = Vec::new();
        for name in visible_files(paste) {
            let Some(entry) = paste.meta.files.get(name) else {
                continue;
            };
            let content = self.store.get_file(paste, name)?;
            let label = if entry.display_name.is_empty() {
                name.to_string()
            } else {
                entry.display_name.clone()
            };
            files.push(RenderedFile {
                name: name.to_string(),
                label,
                description: entry.description.clone(),
                unwrapped: entry.unwrapped,
                collapsed: entry.collapsed,
                collapsed_description: entry.collapsed_description.clone(),
                html: render::render_file(name, content.as_deref(), entry),
            });
        }

        let env = environment()?;
        let template = env.get_template(TEMPLATE_NAME)?;
        let html = template.render(context! {
            title => paste.meta.title,
            description => paste.meta.description,
            summary => paste.meta.summary,
            author => paste.meta.author,
            display_mode => paste.meta.display_mode.as_str(),
            updated_at => paste.meta.updated_at.to_rfc3339(),
            updated_label => paste.meta.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            url => Value::from_safe_string(render::escape_html(&paste.html_url(self.base_path))),
            base_path => Value::from_safe_string(render::escape_html(
                self.base_path.trim_end_matches('/'),
            )),
            files => files,
        })?;
        Ok(html)
    }

    /// Builds the document and overwrites the cached copy. Documents cached
    /// under an earlier title are removed.
    pub fn render(&self, paste: &Paste) -> Result<String> {
        let html = self.build(paste)?;
        let backend = self.store.backend();
        let current = paste.html_file_name();
        backend.write_output(&paste.id, &current, &html)?;
        for stale in backend.list_outputs(&paste.id)? {
            if stale != current {
                tracing::debug!(id = %paste.id, file = %stale, "removing stale cache");
                backend.delete_output(&paste.id, &stale)?;
            }
        }
        tracing::debug!(id = %paste.id, "rendered paste");
        Ok(html)
    }

    /// Cached document, rebuilt only when missing.
    pub fn ensure_rendered(&self, paste: &Paste) -> Result<String> {
        match self
            .store
            .backend()
            .read_output(&paste.id, &paste.html_file_name())?
        {
            Some(html) => Ok(html),
            None => {
                tracing::info!(id = %paste.id, "cache missing, rebuilding");
                self.render(paste)
            }
        }
    }

    /// Re-renders every record, collecting one outcome per record.
    pub fn rerender_all(&self) -> Result<Vec<RenderOutcome>> {
        let mut outcomes = Vec::new();
        for summary in self.store.list(false)? {
            let result = self
                .store
                .load(&summary.id)
                .and_then(|paste| self.render(&paste));
            let outcome = match result {
                Ok(_) => RenderOutcome {
                    id: summary.id,
                    title: summary.title,
                    success: true,
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(id = %summary.id, error = %e, "re-render failed");
                    RenderOutcome {
                        id: summary.id,
                        title: summary.title,
                        success: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DisplayMode, FileEntry, MetaPatch, RenderMode};
    use crate::store::mem_backend::MemBackend;

    fn setup() -> (PasteStore<MemBackend>, Paste) {
        let store = PasteStore::with_backend(MemBackend::new());
        let patch = MetaPatch {
            title: Some("Demo <Notes>".into()),
            ..MetaPatch::default()
        };
        let mut paste = store.create(&patch, Some("demo")).unwrap();
        store
            .add_file(
                &mut paste,
                "readme.md",
                b"# Hello",
                FileEntry::new(RenderMode::Rendered, "markdown"),
            )
            .unwrap();
        store
            .add_file(
                &mut paste,
                "secret.txt",
                b"hidden text",
                FileEntry {
                    hidden: true,
                    ..FileEntry::default()
                },
            )
            .unwrap();
        store
            .add_file(
                &mut paste,
                "main.rs",
                b"fn main() {}",
                FileEntry::new(RenderMode::Highlighted, "rust"),
            )
            .unwrap();
        (store, paste)
    }

    #[test]
    fn multi_mode_skips_hidden_files() {
        let (store, paste) = setup();
        assert_eq!(visible_files(&paste), vec!["readme.md", "main.rs"]);

        let html = PasteCompiler::new(&store, "").build(&paste).unwrap();
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("language-rust"));
        assert!(!html.contains("hidden text"));
        assert!(html.contains("<title>Demo &lt;Notes&gt;</title>"));
    }

    #[test]
    fn single_mode_shows_selected_file_only() {
        let (store, mut paste) = setup();
        paste.meta.display_mode = DisplayMode::new("single-normal");
        paste.meta.selected_file = "secret.txt".into();
        assert_eq!(visible_files(&paste), vec!["secret.txt"]);

        let html = PasteCompiler::new(&store, "").build(&paste).unwrap();
        assert!(html.contains("hidden text"));
        assert!(!html.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn single_mode_without_valid_selection_falls_back() {
        let (_store, mut paste) = setup();
        paste.meta.display_mode = DisplayMode::new("single-normal");
        paste.meta.selected_file = "gone.txt".into();
        assert_eq!(visible_files(&paste), vec!["readme.md", "main.rs"]);
    }

    #[test]
    fn render_writes_cache_and_is_idempotent() {
        let (store, paste) = setup();
        let compiler = PasteCompiler::new(&store, "/base");
        let first = compiler.render(&paste).unwrap();
        let second = compiler.render(&paste).unwrap();
        assert_eq!(first, second);
        assert!(first.contains(r#"href="/base/notes/demo/demo__notes_.html""#));

        let cached = store
            .backend()
            .read_output("demo", &paste.html_file_name())
            .unwrap();
        assert_eq!(cached.as_deref(), Some(first.as_str()));
    }

    #[test]
    fn retitled_render_drops_old_cache() {
        let (store, mut paste) = setup();
        let compiler = PasteCompiler::new(&store, "");
        compiler.render(&paste).unwrap();
        assert_eq!(
            store.backend().list_outputs("demo").unwrap(),
            vec!["demo__notes_.html"]
        );

        let patch = MetaPatch {
            title: Some("Renamed".into()),
            ..MetaPatch::default()
        };
        store.update(&mut paste, &patch).unwrap();
        compiler.render(&paste).unwrap();
        assert_eq!(
            store.backend().list_outputs("demo").unwrap(),
            vec!["renamed.html"]
        );
    }

    #[test]
    fn ensure_rendered_rebuilds_missing_cache() {
        let (store, paste) = setup();
        let compiler = PasteCompiler::new(&store, "");
        assert!(store
            .backend()
            .read_output("demo", &paste.html_file_name())
            .unwrap()
            .is_none());
        let html = compiler.ensure_rendered(&paste).unwrap();
        assert!(html.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn missing_bytes_render_error_fragment() {
        let (store, paste) = setup();
        store.backend().delete_file("demo", "main.rs").unwrap();
        let html = PasteCompiler::new(&store, "").build(&paste).unwrap();
        assert!(html.contains(render::MISSING_FRAGMENT));
    }

    #[test]
    fn rerender_all_reports_each_record() {
        let (store, _paste) = setup();
        store.create(&MetaPatch::default(), Some("other")).unwrap();
        let outcomes = PasteCompiler::new(&store, "").rerender_all().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.success && o.error.is_none()));
    }

    #[test]
    fn rerender_all_continues_past_failures() {
        let (store, _paste) = setup();
        store.create(&MetaPatch::default(), Some("other")).unwrap();
        store.backend().set_simulate_write_error(true);
        let outcomes = PasteCompiler::new(&store, "").rerender_all().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| !o.success && o.error.is_some()));
    }
}
