//! # API Facade
//!
//! The single entry point for pastebox operations, whatever the front end. It
//! dispatches to `commands/*.rs`, applies session and configuration defaults, and
//! returns `Result<CmdResult>`. No business logic and no I/O formatting live here.
//!
//! ## Session gate
//!
//! Reads are open: anonymous sessions may view, resolve, serve files and list
//! public pastes. Every mutation requires a logged-in session and fails with
//! [`PasteError::Unauthorized`] otherwise.
//!
//! ## Generic over the backend
//!
//! `PasteApi<FsBackend>` in production, `PasteApi<MemBackend>` in tests.

use crate::commands::{self, config::ConfigAction, CmdResult};
use crate::config::PasteboxConfig;
use crate::error::{PasteError, Result};
use crate::model::{MetaPatch, DEFAULT_AUTHOR};
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;
use crate::submission::{PasteForm, ProcessedFile, Upload};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Who is acting. `user: None` is an anonymous (logged-out) session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self {
            user: Some(name.into()),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.as_deref().is_some_and(|u| !u.is_empty())
    }
}

pub struct PasteApi<B: StorageBackend> {
    store: PasteStore<B>,
    root: PathBuf,
    config: PasteboxConfig,
    session: Session,
}

impl<B: StorageBackend> PasteApi<B> {
    pub fn new(store: PasteStore<B>, root: PathBuf, config: PasteboxConfig, session: Session) -> Self {
        Self {
            store,
            root,
            config,
            session,
        }
    }

    pub fn store(&self) -> &PasteStore<B> {
        &self.store
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &PasteboxConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    fn base_path(&self) -> &str {
        &self.config.base_path
    }

    fn require_login(&self) -> Result<()> {
        if self.session.is_logged_in() {
            Ok(())
        } else {
            Err(PasteError::Unauthorized)
        }
    }

    /// Author for a new paste: explicit value, then a configured default, then
    /// the session user.
    fn default_author(&self) -> String {
        if self.config.default_author != DEFAULT_AUTHOR {
            return self.config.default_author.clone();
        }
        match self.session.user.as_deref() {
            Some(user) if !user.is_empty() => capitalize(user),
            _ => DEFAULT_AUTHOR.to_string(),
        }
    }

    pub fn init(&self) -> Result<CmdResult> {
        commands::init::run(&self.root)
    }

    pub fn list_pastes(&self) -> Result<CmdResult> {
        commands::list::run(&self.store, !self.session.is_logged_in())
    }

    pub fn create_paste(
        &self,
        patch: MetaPatch,
        custom_id: Option<&str>,
        files: Vec<ProcessedFile>,
    ) -> Result<CmdResult> {
        self.require_login()?;
        let mut patch = patch;
        if patch.author.as_deref().map_or(true, str::is_empty) {
            patch.author = Some(self.default_author());
        }
        if patch.display_mode.is_none() {
            patch.display_mode = Some(self.config.display_mode.clone());
        }
        commands::create::run(&self.store, self.base_path(), &patch, custom_id, files)
    }

    pub fn view_paste(&self, id: &str) -> Result<CmdResult> {
        commands::view::run(&self.store, self.base_path(), id)
    }

    pub fn update_paste(&self, id: &str, patch: &MetaPatch) -> Result<CmdResult> {
        self.require_login()?;
        commands::update::run(&self.store, self.base_path(), id, patch)
    }

    pub fn edit_paste(
        &self,
        id: &str,
        form: PasteForm,
        uploads: &HashMap<usize, Upload>,
    ) -> Result<CmdResult> {
        self.require_login()?;
        commands::edit::run(&self.store, self.base_path(), id, form, uploads)
    }

    pub fn delete_paste(&self, id: &str) -> Result<CmdResult> {
        self.require_login()?;
        commands::delete::run(&self.store, id)
    }

    pub fn add_file(&self, id: &str, file: ProcessedFile) -> Result<CmdResult> {
        self.require_login()?;
        commands::files::add(&self.store, self.base_path(), id, file)
    }

    pub fn remove_file(&self, id: &str, name: &str) -> Result<CmdResult> {
        self.require_login()?;
        commands::files::remove(&self.store, self.base_path(), id, name)
    }

    pub fn rename_file(&self, id: &str, old: &str, new: &str) -> Result<CmdResult> {
        self.require_login()?;
        commands::files::rename(&self.store, self.base_path(), id, old, new)
    }

    pub fn reorder_files(&self, id: &str, order: &[String]) -> Result<CmdResult> {
        self.require_login()?;
        commands::files::reorder(&self.store, self.base_path(), id, order)
    }

    pub fn serve_file(&self, id: &str, filename: &str, mime: &str) -> Result<CmdResult> {
        commands::serve::run(&self.store, id, filename, mime)
    }

    pub fn add_alias(&self, id: &str, alias: Option<&str>) -> Result<CmdResult> {
        self.require_login()?;
        commands::alias::add(&self.store, self.base_path(), id, alias)
    }

    pub fn remove_alias(&self, id: &str, alias: &str) -> Result<CmdResult> {
        self.require_login()?;
        commands::alias::remove(&self.store, self.base_path(), id, alias)
    }

    pub fn make_primary(&self, id: &str, alias: &str) -> Result<CmdResult> {
        self.require_login()?;
        commands::alias::promote(&self.store, self.base_path(), id, alias)
    }

    pub fn generate_alias_id(&self, id: &str) -> Result<CmdResult> {
        self.require_login()?;
        commands::alias::generate(&self.store, id)
    }

    pub fn validate_alias_id(&self, id: &str, alias: &str) -> Result<CmdResult> {
        self.require_login()?;
        commands::alias::check(&self.store, id, alias)
    }

    pub fn resolve(&self, id: &str) -> Result<CmdResult> {
        commands::alias::resolve(&self.store, id)
    }

    pub fn render_paste(&self, id: &str) -> Result<CmdResult> {
        self.require_login()?;
        commands::render::run(&self.store, self.base_path(), id)
    }

    pub fn rerender_all(&self) -> Result<CmdResult> {
        self.require_login()?;
        commands::render::run_all(&self.store, self.base_path())
    }

    pub fn doctor(&self) -> Result<CmdResult> {
        self.require_login()?;
        commands::doctor::run(&self.store)
    }

    /// Shows or changes configuration. A successful `Set` also updates the
    /// configuration this facade uses for later calls.
    pub fn config_action(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let is_set = matches!(action, ConfigAction::Set(..));
        if is_set {
            self.require_login()?;
        }
        let result = commands::config::run(&self.root, action)?;
        if is_set {
            if let Some(config) = &result.config {
                self.config = config.clone();
            }
        }
        Ok(result)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
