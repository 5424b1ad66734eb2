use super::backend::StorageBackend;
use crate::error::{PasteError, Result};
use crate::model::{AliasPointer, PasteMeta};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const META_FILE: &str = "_meta.json";
pub const ALIAS_FILE: &str = "_alias.json";
pub const FILES_DIR: &str = "files";

/// Directory-per-paste storage rooted at a single notes directory.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    fn files_path(&self, id: &str) -> PathBuf {
        self.slot_path(id).join(FILES_DIR)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(PasteError::Io)?;
        }
        Ok(())
    }

    // Write to a sibling tmp file then rename over the target. The tmp name is
    // fixed length so any name the filesystem accepts can be written.
    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let dir = target
            .parent()
            .ok_or_else(|| PasteError::Api(format!("No parent for {}", target.display())))?;
        self.ensure_dir(dir)?;
        let tmp_path = dir.join(format!(".{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp_path, bytes).map_err(PasteError::Io)?;
        if let Err(e) = fs::rename(&tmp_path, target) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PasteError::Io(e));
        }
        Ok(())
    }

    fn read_optional(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PasteError::Io(e)),
        }
    }

    fn remove_optional(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PasteError::Io(e)),
        }
    }
}

impl StorageBackend for FsBackend {
    fn slot_exists(&self, id: &str) -> Result<bool> {
        Ok(self.slot_path(id).is_dir())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(PasteError::Io)?;
        for entry in entries {
            let entry = entry.map_err(PasteError::Io)?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn create_slot(&self, id: &str) -> Result<()> {
        let path = self.slot_path(id);
        if path.exists() {
            return Err(PasteError::IdentifierConflict(id.to_string()));
        }
        fs::create_dir_all(path.join(FILES_DIR)).map_err(PasteError::Io)?;
        Ok(())
    }

    fn remove_slot(&self, id: &str) -> Result<()> {
        let path = self.slot_path(id);
        if path.is_dir() {
            fs::remove_dir_all(path).map_err(PasteError::Io)?;
        }
        Ok(())
    }

    fn rename_slot(&self, from: &str, to: &str) -> Result<()> {
        let target = self.slot_path(to);
        if target.exists() {
            return Err(PasteError::IdentifierConflict(to.to_string()));
        }
        fs::rename(self.slot_path(from), target).map_err(PasteError::Io)?;
        Ok(())
    }

    fn read_meta(&self, id: &str) -> Result<Option<PasteMeta>> {
        match self.read_optional(&self.slot_path(id).join(META_FILE))? {
            Some(bytes) => Ok(Some(
                serde_json::from_slice(&bytes).map_err(PasteError::Serialization)?,
            )),
            None => Ok(None),
        }
    }

    fn write_meta(&self, id: &str, meta: &PasteMeta) -> Result<()> {
        let content = serde_json::to_string_pretty(meta).map_err(PasteError::Serialization)?;
        self.write_atomic(&self.slot_path(id).join(META_FILE), content.as_bytes())
    }

    fn read_alias(&self, id: &str) -> Result<Option<AliasPointer>> {
        match self.read_optional(&self.slot_path(id).join(ALIAS_FILE))? {
            Some(bytes) => Ok(Some(
                serde_json::from_slice(&bytes).map_err(PasteError::Serialization)?,
            )),
            None => Ok(None),
        }
    }

    fn write_alias(&self, id: &str, pointer: &AliasPointer) -> Result<()> {
        let content =
            serde_json::to_string_pretty(pointer).map_err(PasteError::Serialization)?;
        self.write_atomic(&self.slot_path(id).join(ALIAS_FILE), content.as_bytes())
    }

    fn read_file(&self, id: &str, name: &str) -> Result<Option<Vec<u8>>> {
        self.read_optional(&self.file_path(id, name))
    }

    fn write_file(&self, id: &str, name: &str, bytes: &[u8]) -> Result<()> {
        self.write_atomic(&self.file_path(id, name), bytes)
    }

    fn rename_file(&self, id: &str, from: &str, to: &str) -> Result<()> {
        let source = self.file_path(id, from);
        if !source.exists() {
            return Ok(());
        }
        fs::rename(source, self.file_path(id, to)).map_err(PasteError::Io)?;
        Ok(())
    }

    fn delete_file(&self, id: &str, name: &str) -> Result<()> {
        self.remove_optional(&self.file_path(id, name))
    }

    fn list_files(&self, id: &str) -> Result<Vec<String>> {
        let dir = self.files_path(id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(PasteError::Io)? {
            let entry = entry.map_err(PasteError::Io)?;
            if entry.path().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_output(&self, id: &str, name: &str) -> Result<Option<String>> {
        match self.read_optional(&self.output_path(id, name))? {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }

    fn write_output(&self, id: &str, name: &str, html: &str) -> Result<()> {
        self.write_atomic(&self.output_path(id, name), html.as_bytes())
    }

    fn list_outputs(&self, id: &str) -> Result<Vec<String>> {
        let dir = self.slot_path(id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(PasteError::Io)? {
            let entry = entry.map_err(PasteError::Io)?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".html") && !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_output(&self, id: &str, name: &str) -> Result<()> {
        self.remove_optional(&self.output_path(id, name))
    }

    fn file_path(&self, id: &str, name: &str) -> PathBuf {
        self.files_path(id).join(name)
    }

    fn output_path(&self, id: &str, name: &str) -> PathBuf {
        self.slot_path(id).join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsBackend) {
        let dir = TempDir::new().unwrap();
        let backend = FsBackend::new(dir.path());
        (dir, backend)
    }

    #[test]
    fn slot_layout_on_disk() {
        let (dir, backend) = setup();
        backend.create_slot("abc").unwrap();
        backend
            .write_meta("abc", &PasteMeta::new(Utc::now()))
            .unwrap();
        backend.write_file("abc", "a.txt", b"hello").unwrap();

        assert!(dir.path().join("abc").join(META_FILE).is_file());
        assert!(dir.path().join("abc/files/a.txt").is_file());
        assert_eq!(backend.list_files("abc").unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn create_slot_refuses_existing() {
        let (_dir, backend) = setup();
        backend.create_slot("abc").unwrap();
        assert!(matches!(
            backend.create_slot("abc"),
            Err(PasteError::IdentifierConflict(_))
        ));
    }

    #[test]
    fn atomic_writes_leave_no_tmp_files() {
        let (dir, backend) = setup();
        backend.create_slot("abc").unwrap();
        backend
            .write_meta("abc", &PasteMeta::new(Utc::now()))
            .unwrap();
        backend.write_output("abc", "untitled.html", "<p>x</p>").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("abc"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn missing_documents_read_as_none() {
        let (_dir, backend) = setup();
        backend.create_slot("abc").unwrap();
        assert!(backend.read_meta("abc").unwrap().is_none());
        assert!(backend.read_alias("abc").unwrap().is_none());
        assert!(backend.read_file("abc", "nope").unwrap().is_none());
        assert!(backend.read_meta("missing").unwrap().is_none());
    }

    #[test]
    fn rename_slot_moves_contents() {
        let (dir, backend) = setup();
        backend.create_slot("old").unwrap();
        backend.write_file("old", "a.txt", b"x").unwrap();
        backend.rename_slot("old", "new").unwrap();

        assert!(!dir.path().join("old").exists());
        assert_eq!(
            backend.read_file("new", "a.txt").unwrap(),
            Some(b"x".to_vec())
        );
    }

    #[test]
    fn long_file_names_can_be_written_and_renamed() {
        let (dir, backend) = setup();
        backend.create_slot("abc").unwrap();
        let long = "a".repeat(230);

        backend.write_file("abc", &long, b"payload").unwrap();
        assert_eq!(backend.list_files("abc").unwrap(), vec![long.clone()]);

        backend.rename_file("abc", &long, "short").unwrap();
        assert_eq!(
            backend.read_file("abc", "short").unwrap(),
            Some(b"payload".to_vec())
        );
        assert!(!dir.path().join("abc/files").join(&long).exists());
    }

    #[test]
    fn outputs_are_listed_and_deleted() {
        let (_dir, backend) = setup();
        backend.create_slot("abc").unwrap();
        backend
            .write_meta("abc", &PasteMeta::new(Utc::now()))
            .unwrap();
        backend.write_output("abc", "old.html", "<p>old</p>").unwrap();
        backend.write_output("abc", "new.html", "<p>new</p>").unwrap();
        assert_eq!(
            backend.list_outputs("abc").unwrap(),
            vec!["new.html", "old.html"]
        );

        backend.delete_output("abc", "old.html").unwrap();
        backend.delete_output("abc", "old.html").unwrap();
        assert_eq!(backend.list_outputs("abc").unwrap(), vec!["new.html"]);
    }

    #[test]
    fn list_slots_skips_plain_files() {
        let (dir, backend) = setup();
        backend.create_slot("one").unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();
        assert_eq!(backend.list_slots().unwrap(), vec!["one"]);
    }
}
