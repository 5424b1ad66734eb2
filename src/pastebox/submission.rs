//! Form submissions: the desired final file set of a paste, as the edit form (or
//! any other front end) describes it.
//!
//! Entries arrive in submission order. Each may name the `originalFilename` it was
//! loaded from; entries without one are new files and existing files nobody
//! claims are deleted. [`plan`] turns that into explicit store operations and
//! [`apply`] runs them in order: staged renames, updates, additions, deletions,
//! then the final ordering.

use crate::error::Result;
use crate::model::{FileEntry, MetaPatch, Paste, RenderMode};
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_FILENAME: &str = "untitled.txt";

/// One file as submitted by the form layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileSubmission {
    pub filename: String,
    /// Inline text. Empty text counts as absent.
    pub content: Option<String>,
    pub render: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub description: String,
    pub display_name: String,
    pub hidden: bool,
    pub unwrapped: bool,
    pub collapsed: bool,
    pub collapsed_description: String,
    pub original_filename: Option<String>,
}

/// Uploaded bytes for one submission index, with the MIME type the upload layer
/// determined for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// A full edit submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasteForm {
    #[serde(flatten)]
    pub meta: MetaPatch,
    pub files: Vec<FileSubmission>,
    /// Desired alias set. `None` leaves aliases untouched.
    pub aliases: Option<Vec<String>>,
    pub make_primary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub filename: String,
    /// `None` means no new bytes were supplied.
    pub content: Option<Vec<u8>>,
    pub entry: FileEntry,
    pub original_filename: Option<String>,
}

/// Keeps only the basename and replaces anything outside `[a-zA-Z0-9._-]`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned
    }
}

fn is_textual_mime(mime: &str) -> bool {
    mime.starts_with("text/")
        || matches!(
            mime,
            "application/json" | "application/xml" | "application/javascript"
        )
}

/// Applies the upload rules: bytes precedence, MIME-driven render mode and the
/// type implied by the final render mode.
pub fn process(submission: &FileSubmission, upload: Option<&Upload>) -> ProcessedFile {
    let filename = if submission.filename.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitize_filename(&submission.filename)
    };
    let mut render = submission
        .render
        .as_deref()
        .map(RenderMode::from)
        .unwrap_or_default();
    let mut file_type = submission
        .file_type
        .clone()
        .unwrap_or_else(|| crate::model::DEFAULT_FILE_TYPE.to_string());

    let content = match upload {
        Some(upload) => {
            if !render.is_attachment() {
                if upload.mime.starts_with("image/") {
                    render = RenderMode::Image;
                    file_type = "image".to_string();
                } else if !is_textual_mime(&upload.mime) {
                    render = RenderMode::File;
                    file_type = "file".to_string();
                }
            }
            Some(upload.bytes.clone())
        }
        None => submission
            .content
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(|c| c.clone().into_bytes()),
    };

    let mut entry = FileEntry {
        display_name: submission.display_name.clone(),
        description: submission.description.clone(),
        file_type,
        render,
        hidden: submission.hidden,
        unwrapped: submission.unwrapped,
        collapsed: submission.collapsed,
        collapsed_description: submission.collapsed_description.clone(),
    };
    entry.normalize_type();

    ProcessedFile {
        filename,
        content,
        entry,
        original_filename: submission.original_filename.clone(),
    }
}

/// Processes a whole submission. Uploads are keyed by submission index.
pub fn process_all(
    submissions: &[FileSubmission],
    uploads: &HashMap<usize, Upload>,
) -> Vec<ProcessedFile> {
    submissions
        .iter()
        .enumerate()
        .map(|(index, submission)| process(submission, uploads.get(&index)))
        .collect()
}

/// Store operations derived from a submission, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePlan {
    pub renames: Vec<(String, String)>,
    pub updates: Vec<(String, Option<Vec<u8>>, FileEntry)>,
    pub additions: Vec<(String, Vec<u8>, FileEntry)>,
    pub removals: Vec<String>,
    pub order: Vec<String>,
}

/// Classifies every entry as rename, update or addition against the existing
/// names, and collects implicit deletions.
///
/// A repeated target name is prefixed with its submission index
/// (`file{index}_{name}`), with a counter added if that is taken too. An existing file is claimed by the first entry that
/// names it as original. Unclaimed files are deleted unless an entry takes over
/// their name, in which case the new bytes replace them.
pub fn plan(existing: &[String], files: Vec<ProcessedFile>) -> FilePlan {
    let existing_set: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut plan = FilePlan::default();
    let mut used: HashSet<String> = HashSet::new();
    let mut claimed: HashSet<String> = HashSet::new();

    for (index, file) in files.into_iter().enumerate() {
        let mut name = file.filename;
        if used.contains(&name) {
            name = disambiguate(&name, index, &used);
        }
        used.insert(name.clone());

        let original = file
            .original_filename
            .filter(|o| existing_set.contains(o.as_str()) && !claimed.contains(o));

        match original {
            Some(original) => {
                if original != name {
                    plan.renames.push((original.clone(), name.clone()));
                }
                claimed.insert(original);
                plan.updates.push((name.clone(), file.content, file.entry));
            }
            None => {
                plan.additions
                    .push((name.clone(), file.content.unwrap_or_default(), file.entry));
            }
        }
        plan.order.push(name);
    }

    plan.removals = existing
        .iter()
        .filter(|name| !claimed.contains(*name) && !used.contains(*name))
        .cloned()
        .collect();
    plan
}

// `file{index}_{name}`, or `file{index}_{n}_{name}` with the lowest n >= 2
// when an earlier entry already took that.
fn disambiguate(name: &str, index: usize, used: &HashSet<String>) -> String {
    let mut candidate = format!("file{}_{}", index, name);
    let mut n = 1;
    while used.contains(&candidate) {
        n += 1;
        candidate = format!("file{}_{}_{}", index, n, name);
    }
    candidate
}

/// Runs a plan against a loaded record. Renames go through
/// [`PasteStore::move_files`] so swaps never collide.
pub fn apply<B: StorageBackend>(
    store: &PasteStore<B>,
    paste: &mut Paste,
    plan: FilePlan,
) -> Result<()> {
    store.move_files(paste, &plan.renames)?;
    for (name, content, entry) in plan.updates {
        store.update_file(paste, &name, content.as_deref(), entry)?;
    }
    for (name, content, entry) in plan.additions {
        store.add_file(paste, &name, &content, entry)?;
    }
    for name in plan.removals {
        store.remove_file(paste, &name)?;
    }
    store.reorder_files(paste, &plan.order)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn sub(filename: &str, original: Option<&str>, content: Option<&str>) -> FileSubmission {
        FileSubmission {
            filename: filename.to_string(),
            original_filename: original.map(str::to_string),
            content: content.map(str::to_string),
            ..FileSubmission::default()
        }
    }

    fn processed(subs: &[FileSubmission]) -> Vec<ProcessedFile> {
        process_all(subs, &HashMap::new())
    }

    #[test]
    fn sanitize_rules() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\my file.txt"), "my_file.txt");
        assert_eq!(sanitize_filename("héllo.md"), "h_llo.md");
        assert_eq!(sanitize_filename(""), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename("dir/"), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename(".."), DEFAULT_FILENAME);
    }

    #[test]
    fn upload_mime_drives_render_mode() {
        let s = FileSubmission {
            filename: "pic.png".into(),
            render: Some("plain".into()),
            ..FileSubmission::default()
        };
        let image = Upload {
            bytes: vec![1, 2, 3],
            mime: "image/png".into(),
        };
        let p = process(&s, Some(&image));
        assert_eq!(p.entry.render, RenderMode::Image);
        assert_eq!(p.entry.file_type, "image");
        assert_eq!(p.content, Some(vec![1, 2, 3]));

        let zip = Upload {
            bytes: vec![0],
            mime: "application/zip".into(),
        };
        let p = process(&s, Some(&zip));
        assert_eq!(p.entry.render, RenderMode::File);

        let json = Upload {
            bytes: b"{}".to_vec(),
            mime: "application/json".into(),
        };
        let p = process(&s, Some(&json));
        assert_eq!(p.entry.render, RenderMode::Plain);
    }

    #[test]
    fn explicit_attachment_mode_is_kept() {
        let s = FileSubmission {
            filename: "doc.pdf".into(),
            render: Some("file-link".into()),
            ..FileSubmission::default()
        };
        let upload = Upload {
            bytes: vec![9],
            mime: "image/png".into(),
        };
        let p = process(&s, Some(&upload));
        assert_eq!(p.entry.render, RenderMode::FileLink);
        assert_eq!(p.entry.file_type, "file-link");
    }

    #[test]
    fn upload_beats_inline_content_and_empty_means_absent() {
        let s = sub("a.txt", None, Some("inline"));
        let upload = Upload {
            bytes: b"uploaded".to_vec(),
            mime: "text/plain".into(),
        };
        assert_eq!(process(&s, Some(&upload)).content, Some(b"uploaded".to_vec()));
        assert_eq!(process(&s, None).content, Some(b"inline".to_vec()));
        assert_eq!(process(&sub("a.txt", None, Some("")), None).content, None);
    }

    #[test]
    fn rendered_forces_markdown_type() {
        let s = FileSubmission {
            filename: "a.md".into(),
            render: Some("rendered".into()),
            file_type: Some("text".into()),
            ..FileSubmission::default()
        };
        assert_eq!(process(&s, None).entry.file_type, "markdown");
    }

    #[test]
    fn plan_classifies_entries() {
        let existing = vec!["keep".to_string(), "old".to_string(), "drop".to_string()];
        let plan = plan(
            &existing,
            processed(&[
                sub("keep", Some("keep"), None),
                sub("new-name", Some("old"), None),
                sub("fresh", None, Some("x")),
            ]),
        );
        assert_eq!(plan.renames, vec![("old".to_string(), "new-name".to_string())]);
        assert_eq!(plan.updates.len(), 2);
        assert_eq!(plan.additions.len(), 1);
        assert_eq!(plan.removals, vec!["drop"]);
        assert_eq!(plan.order, vec!["keep", "new-name", "fresh"]);
    }

    #[test]
    fn duplicate_names_get_index_prefix() {
        let plan = plan(
            &[],
            processed(&[sub("a.txt", None, None), sub("a.txt", None, None)]),
        );
        assert_eq!(plan.order, vec!["a.txt", "file1_a.txt"]);
    }

    #[test]
    fn prefixed_name_never_collides_with_a_submitted_one() {
        let plan = plan(
            &[],
            processed(&[
                sub("a.txt", None, Some("ONE")),
                sub("file2_a.txt", None, Some("TWO")),
                sub("a.txt", None, Some("THREE")),
            ]),
        );
        assert_eq!(plan.order, vec!["a.txt", "file2_a.txt", "file2_2_a.txt"]);
        let contents: Vec<_> = plan
            .additions
            .iter()
            .map(|(name, bytes, _)| (name.as_str(), bytes.as_slice()))
            .collect();
        assert_eq!(
            contents,
            vec![
                ("a.txt", b"ONE".as_slice()),
                ("file2_a.txt", b"TWO".as_slice()),
                ("file2_2_a.txt", b"THREE".as_slice()),
            ]
        );
    }

    #[test]
    fn colliding_submission_keeps_every_file() {
        let store = PasteStore::with_backend(MemBackend::new());
        let mut paste = store.create(&MetaPatch::default(), Some("p")).unwrap();
        let plan = plan(
            &[],
            processed(&[
                sub("a.txt", None, Some("ONE")),
                sub("file2_a.txt", None, Some("TWO")),
                sub("a.txt", None, Some("THREE")),
            ]),
        );
        apply(&store, &mut paste, plan).unwrap();

        let loaded = store.load("p").unwrap();
        assert_eq!(loaded.meta.files.len(), 3);
        assert_eq!(store.get_file(&loaded, "file2_a.txt").unwrap().as_deref(), Some("TWO"));
        assert_eq!(store.get_file(&loaded, "file2_2_a.txt").unwrap().as_deref(), Some("THREE"));
    }

    #[test]
    fn swap_through_form_keeps_content() {
        let store = PasteStore::with_backend(MemBackend::new());
        let mut paste = store.create(&MetaPatch::default(), Some("p")).unwrap();
        store
            .add_file(&mut paste, "a", b"AAA", FileEntry::default())
            .unwrap();
        store
            .add_file(&mut paste, "b", b"BBB", FileEntry::default())
            .unwrap();

        let existing: Vec<String> = paste.meta.files.keys().cloned().collect();
        let plan = plan(
            &existing,
            processed(&[sub("b", Some("a"), None), sub("a", Some("b"), None)]),
        );
        apply(&store, &mut paste, plan).unwrap();

        let loaded = store.load("p").unwrap();
        assert_eq!(store.get_file(&loaded, "b").unwrap().as_deref(), Some("AAA"));
        assert_eq!(store.get_file(&loaded, "a").unwrap().as_deref(), Some("BBB"));
        let order: Vec<_> = loaded.meta.files.keys().cloned().collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn rename_onto_unclaimed_name_survives_cleanup() {
        let store = PasteStore::with_backend(MemBackend::new());
        let mut paste = store.create(&MetaPatch::default(), Some("p")).unwrap();
        store
            .add_file(&mut paste, "a", b"AAA", FileEntry::default())
            .unwrap();
        store
            .add_file(&mut paste, "b", b"BBB", FileEntry::default())
            .unwrap();

        let existing: Vec<String> = paste.meta.files.keys().cloned().collect();
        let plan = plan(&existing, processed(&[sub("b", Some("a"), None)]));
        assert!(plan.removals.is_empty());
        apply(&store, &mut paste, plan).unwrap();

        let loaded = store.load("p").unwrap();
        assert_eq!(loaded.meta.files.len(), 1);
        assert_eq!(store.get_file(&loaded, "b").unwrap().as_deref(), Some("AAA"));
        assert_eq!(store.backend().list_files("p").unwrap(), vec!["b"]);
    }
}
