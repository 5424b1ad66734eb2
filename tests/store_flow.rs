use pastebox::api::{PasteApi, Session};
use pastebox::config::PasteboxConfig;
use pastebox::model::{AliasPointer, MetaPatch};
use pastebox::store::backend::StorageBackend;
use pastebox::store::fs_backend::FsBackend;
use pastebox::store::paste_store::PasteStore;
use pastebox::submission::{FileSubmission, PasteForm};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn api(temp: &TempDir) -> PasteApi<FsBackend> {
    let root = temp.path().to_path_buf();
    PasteApi::new(
        PasteStore::with_backend(FsBackend::new(root.clone())),
        root,
        PasteboxConfig::default(),
        Session::user("robin"),
    )
}

fn text(name: &str, content: &str, original: Option<&str>) -> FileSubmission {
    FileSubmission {
        filename: name.into(),
        content: Some(content.into()),
        original_filename: original.map(String::from),
        ..FileSubmission::default()
    }
}

#[test]
fn edit_swaps_files_and_syncs_aliases_on_disk() {
    let temp = TempDir::new().unwrap();
    let api = api(&temp);
    let form = PasteForm {
        files: vec![text("a.txt", "alpha", None), text("b.txt", "beta", None)],
        aliases: Some(vec!["first".into(), "second".into()]),
        ..PasteForm::default()
    };
    api.create_paste(MetaPatch::default(), Some("rec"), vec![])
        .unwrap();
    api.edit_paste("rec", form, &HashMap::new()).unwrap();

    // Swap the two names; contents travel with their entries.
    let swap = PasteForm {
        files: vec![
            FileSubmission {
                content: None,
                ..text("b.txt", "", Some("a.txt"))
            },
            FileSubmission {
                content: None,
                ..text("a.txt", "", Some("b.txt"))
            },
        ],
        aliases: Some(vec!["second".into()]),
        ..PasteForm::default()
    };
    let result = api.edit_paste("first", swap, &HashMap::new()).unwrap();
    assert!(!result.has_errors());

    let files = temp.path().join("rec").join("files");
    assert_eq!(fs::read_to_string(files.join("b.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(files.join("a.txt")).unwrap(), "beta");
    let leftovers: Vec<_> = fs::read_dir(&files)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("__temp_"))
        .collect();
    assert!(leftovers.is_empty());

    assert!(!temp.path().join("first").exists());
    assert_eq!(api.store().resolve("second").unwrap(), "rec");
}

#[test]
fn promotion_keeps_every_identifier_resolving() {
    let temp = TempDir::new().unwrap();
    let api = api(&temp);
    api.create_paste(MetaPatch::default(), Some("orig"), vec![])
        .unwrap();
    api.add_alias("orig", Some("one")).unwrap();
    api.add_alias("orig", Some("two")).unwrap();

    api.make_primary("two", "one").unwrap();

    let store = api.store();
    for id in ["orig", "one", "two"] {
        assert_eq!(store.resolve(id).unwrap(), "one", "{id} should resolve");
    }
    let paste = store.load("one").unwrap();
    assert_eq!(paste.meta.aliases, vec!["orig", "two"]);
    assert!(temp.path().join("one").join("untitled.html").exists());
}

#[test]
fn doctor_restores_interrupted_promotion() {
    let temp = TempDir::new().unwrap();
    let api = api(&temp);
    api.create_paste(MetaPatch::default(), Some("rec"), vec![])
        .unwrap();
    api.add_alias("rec", Some("al")).unwrap();

    // Interrupted after the alias slot was removed but before the rename.
    fs::remove_dir_all(temp.path().join("al")).unwrap();
    // A stray alias slot whose parent never listed it.
    let backend = api.store().backend();
    backend.create_slot("stray").unwrap();
    backend
        .write_alias(
            "stray",
            &AliasPointer {
                parent: "rec".into(),
            },
        )
        .unwrap();

    let result = api.doctor().unwrap();
    let report = result.doctor_report.unwrap();
    assert_eq!(report.recreated_aliases, 1);
    assert_eq!(report.removed_orphan_aliases, 1);
    assert_eq!(api.store().resolve("al").unwrap(), "rec");
    assert!(!temp.path().join("stray").exists());

    assert!(api.doctor().unwrap().doctor_report.unwrap().is_clean());
}

#[test]
fn view_rebuilds_deleted_cache() {
    let temp = TempDir::new().unwrap();
    let api = api(&temp);
    let patch = MetaPatch {
        title: Some("Cache Me".into()),
        ..MetaPatch::default()
    };
    api.create_paste(patch, Some("c"), vec![]).unwrap();
    let cache = temp.path().join("c").join("cache_me.html");
    fs::remove_file(&cache).unwrap();

    let result = api.view_paste("c").unwrap();
    assert!(result.html.unwrap().contains("Cache Me"));
    assert!(cache.exists());
}

#[test]
fn long_attachment_names_survive_add_and_rename() {
    let temp = TempDir::new().unwrap();
    let api = api(&temp);
    let long = "n".repeat(230);
    let form = PasteForm {
        files: vec![text(&long, "payload", None)],
        ..PasteForm::default()
    };
    api.create_paste(MetaPatch::default(), Some("rec"), vec![])
        .unwrap();
    api.edit_paste("rec", form, &HashMap::new()).unwrap();
    let files = temp.path().join("rec").join("files");
    assert_eq!(fs::read_to_string(files.join(&long)).unwrap(), "payload");

    api.rename_file("rec", &long, "short").unwrap();
    assert_eq!(fs::read_to_string(files.join("short")).unwrap(), "payload");
    assert!(!files.join(&long).exists());
}

#[test]
fn edit_promotion_with_current_alias_list_on_disk() {
    let temp = TempDir::new().unwrap();
    let api = api(&temp);
    api.create_paste(MetaPatch::default(), Some("p"), vec![])
        .unwrap();
    api.add_alias("p", Some("keep")).unwrap();
    api.add_alias("p", Some("drop")).unwrap();

    let form = PasteForm {
        aliases: Some(vec!["keep".into(), "drop".into()]),
        make_primary: Some("keep".into()),
        ..PasteForm::default()
    };
    api.edit_paste("p", form, &HashMap::new()).unwrap();

    let store = api.store();
    assert_eq!(store.resolve("p").unwrap(), "keep");
    assert!(store.identifier_in_use("p").unwrap());
    assert_eq!(store.load("keep").unwrap().meta.aliases, vec!["p", "drop"]);
    let raw = fs::read_to_string(temp.path().join("p").join("_alias.json")).unwrap();
    let pointer: AliasPointer = serde_json::from_str(&raw).unwrap();
    assert_eq!(pointer.parent, "keep");
}

#[test]
fn retitling_leaves_a_single_cached_document() {
    let temp = TempDir::new().unwrap();
    let api = api(&temp);
    let first = MetaPatch {
        title: Some("First Title".into()),
        ..MetaPatch::default()
    };
    api.create_paste(first, Some("rec"), vec![]).unwrap();
    assert!(temp.path().join("rec").join("first_title.html").exists());

    let second = MetaPatch {
        title: Some("Second".into()),
        ..MetaPatch::default()
    };
    api.update_paste("rec", &second).unwrap();
    assert!(!temp.path().join("rec").join("first_title.html").exists());
    assert!(temp.path().join("rec").join("second.html").exists());
}
