//! Context setup for front ends: where the store lives and who is acting.
//!
//! This is the one place that consults the process environment. Everything
//! from [`PasteApi`] inward receives the root and base path as plain values.

use crate::api::{PasteApi, Session};
use crate::config::PasteboxConfig;
use crate::error::{PasteError, Result};
use crate::store::fs_backend::FsBackend;
use crate::store::paste_store::PasteStore;
use directories::ProjectDirs;
use std::path::PathBuf;

pub const ROOT_ENV: &str = "PASTEBOX_ROOT";
pub const USER_ENV: &str = "PASTEBOX_USER";

pub struct PasteboxContext {
    pub api: PasteApi<FsBackend>,
}

/// `--root` flag, then `$PASTEBOX_ROOT`, then the platform data directory.
pub fn resolve_root(flag: Option<PathBuf>, env: Option<String>) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root);
    }
    if let Some(root) = env.filter(|r| !r.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    let dirs = ProjectDirs::from("com", "pastebox", "pastebox")
        .ok_or_else(|| PasteError::Api("Could not determine data directory".into()))?;
    Ok(dirs.data_dir().join("notes"))
}

/// First non-empty of `--user`, `$PASTEBOX_USER`, `$USER`. `None` is anonymous.
pub fn resolve_user(
    flag: Option<String>,
    env: Option<String>,
    login: Option<String>,
) -> Option<String> {
    [flag, env, login]
        .into_iter()
        .flatten()
        .find(|u| !u.trim().is_empty())
}

pub fn initialize(root_flag: Option<PathBuf>, user_flag: Option<String>) -> Result<PasteboxContext> {
    let root = resolve_root(root_flag, std::env::var(ROOT_ENV).ok())?;
    let user = resolve_user(
        user_flag,
        std::env::var(USER_ENV).ok(),
        std::env::var("USER").ok(),
    );
    let config = PasteboxConfig::load(&root).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unreadable config, using defaults");
        PasteboxConfig::default()
    });
    tracing::debug!(root = %root.display(), user = ?user, "initialized context");

    let store = PasteStore::with_backend(FsBackend::new(root.clone()));
    let session = Session { user };
    Ok(PasteboxContext {
        api: PasteApi::new(store, root, config, session),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_precedence() {
        let flag = resolve_root(Some(PathBuf::from("/a")), Some("/b".into())).unwrap();
        assert_eq!(flag, PathBuf::from("/a"));
        let env = resolve_root(None, Some("/b".into())).unwrap();
        assert_eq!(env, PathBuf::from("/b"));
    }

    #[test]
    fn user_precedence_skips_blank() {
        assert_eq!(
            resolve_user(Some("".into()), Some("env".into()), Some("login".into())).as_deref(),
            Some("env")
        );
        assert_eq!(
            resolve_user(Some("flag".into()), None, Some("login".into())).as_deref(),
            Some("flag")
        );
        assert_eq!(resolve_user(None, None, None), None);
    }
}
