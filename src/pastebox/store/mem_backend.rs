use super::backend::StorageBackend;
use crate::error::{PasteError, Result};
use crate::model::{AliasPointer, PasteMeta};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Clone, Default)]
struct MemSlot {
    meta: Option<PasteMeta>,
    alias: Option<AliasPointer>,
    files: BTreeMap<String, Vec<u8>>,
    outputs: BTreeMap<String, String>,
}

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since pastebox is single-threaded.
/// This keeps `&self` on every `StorageBackend` method, same as the filesystem.
#[derive(Default)]
pub struct MemBackend {
    slots: RefCell<BTreeMap<String, MemSlot>>,
    simulate_write_error: RefCell<bool>,
    rename_failure: RefCell<Option<usize>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make the file rename after `skip` successful ones fail, once.
    pub fn fail_rename_after(&self, skip: usize) {
        *self.rename_failure.borrow_mut() = Some(skip);
    }

    fn check_rename(&self) -> Result<()> {
        let mut countdown = self.rename_failure.borrow_mut();
        match countdown.as_mut() {
            Some(0) => {
                *countdown = None;
                Err(PasteError::Io(std::io::Error::other("Simulated rename error")))
            }
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn check_write(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(PasteError::Io(std::io::Error::other("Simulated write error")));
        }
        Ok(())
    }

    fn with_slot<T>(&self, id: &str, f: impl FnOnce(&mut MemSlot) -> T) -> Result<T> {
        let mut slots = self.slots.borrow_mut();
        let slot = slots.get_mut(id).ok_or_else(|| {
            PasteError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No slot {}", id),
            ))
        })?;
        Ok(f(slot))
    }
}

impl StorageBackend for MemBackend {
    fn slot_exists(&self, id: &str) -> Result<bool> {
        Ok(self.slots.borrow().contains_key(id))
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        Ok(self.slots.borrow().keys().cloned().collect())
    }

    fn create_slot(&self, id: &str) -> Result<()> {
        self.check_write()?;
        let mut slots = self.slots.borrow_mut();
        if slots.contains_key(id) {
            return Err(PasteError::IdentifierConflict(id.to_string()));
        }
        slots.insert(id.to_string(), MemSlot::default());
        Ok(())
    }

    fn remove_slot(&self, id: &str) -> Result<()> {
        self.check_write()?;
        self.slots.borrow_mut().remove(id);
        Ok(())
    }

    fn rename_slot(&self, from: &str, to: &str) -> Result<()> {
        self.check_write()?;
        let mut slots = self.slots.borrow_mut();
        if slots.contains_key(to) {
            return Err(PasteError::IdentifierConflict(to.to_string()));
        }
        let slot = slots.remove(from).ok_or_else(|| {
            PasteError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No slot {}", from),
            ))
        })?;
        slots.insert(to.to_string(), slot);
        Ok(())
    }

    fn read_meta(&self, id: &str) -> Result<Option<PasteMeta>> {
        Ok(self.slots.borrow().get(id).and_then(|s| s.meta.clone()))
    }

    fn write_meta(&self, id: &str, meta: &PasteMeta) -> Result<()> {
        self.check_write()?;
        self.with_slot(id, |slot| slot.meta = Some(meta.clone()))
    }

    fn read_alias(&self, id: &str) -> Result<Option<AliasPointer>> {
        Ok(self.slots.borrow().get(id).and_then(|s| s.alias.clone()))
    }

    fn write_alias(&self, id: &str, pointer: &AliasPointer) -> Result<()> {
        self.check_write()?;
        self.with_slot(id, |slot| slot.alias = Some(pointer.clone()))
    }

    fn read_file(&self, id: &str, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .slots
            .borrow()
            .get(id)
            .and_then(|s| s.files.get(name).cloned()))
    }

    fn write_file(&self, id: &str, name: &str, bytes: &[u8]) -> Result<()> {
        self.check_write()?;
        self.with_slot(id, |slot| {
            slot.files.insert(name.to_string(), bytes.to_vec());
        })
    }

    fn rename_file(&self, id: &str, from: &str, to: &str) -> Result<()> {
        self.check_write()?;
        self.check_rename()?;
        self.with_slot(id, |slot| {
            if let Some(bytes) = slot.files.remove(from) {
                slot.files.insert(to.to_string(), bytes);
            }
        })
    }

    fn delete_file(&self, id: &str, name: &str) -> Result<()> {
        self.check_write()?;
        self.with_slot(id, |slot| {
            slot.files.remove(name);
        })
    }

    fn list_files(&self, id: &str) -> Result<Vec<String>> {
        Ok(self
            .slots
            .borrow()
            .get(id)
            .map(|s| s.files.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn read_output(&self, id: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .slots
            .borrow()
            .get(id)
            .and_then(|s| s.outputs.get(name).cloned()))
    }

    fn write_output(&self, id: &str, name: &str, html: &str) -> Result<()> {
        self.check_write()?;
        self.with_slot(id, |slot| {
            slot.outputs.insert(name.to_string(), html.to_string());
        })
    }

    fn list_outputs(&self, id: &str) -> Result<Vec<String>> {
        Ok(self
            .slots
            .borrow()
            .get(id)
            .map(|s| s.outputs.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn delete_output(&self, id: &str, name: &str) -> Result<()> {
        self.check_write()?;
        self.with_slot(id, |slot| {
            slot.outputs.remove(name);
        })
    }

    fn file_path(&self, id: &str, name: &str) -> PathBuf {
        PathBuf::from(format!("/mem/{}/files/{}", id, name))
    }

    fn output_path(&self, id: &str, name: &str) -> PathBuf {
        PathBuf::from(format!("/mem/{}/{}", id, name))
    }
}
