use crate::commands::CmdResult;
use crate::error::{PasteError, Result};
use crate::model::RenderMode;
use crate::store::backend::StorageBackend;
use crate::store::paste_store::PasteStore;
use std::path::PathBuf;

use super::helpers::load_paste;

/// Where an attachment's bytes live and how they should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedFile {
    pub path: PathBuf,
    pub mime: String,
    /// Deliver as a download rather than inline.
    pub attachment: bool,
}

/// Only `file` attachments of a non-text, non-image type are forced to download.
pub fn is_download(render: &RenderMode, mime: &str) -> bool {
    *render == RenderMode::File && !mime.starts_with("text/") && !mime.starts_with("image/")
}

pub fn run<B: StorageBackend>(
    store: &PasteStore<B>,
    id: &str,
    filename: &str,
    mime: &str,
) -> Result<CmdResult> {
    let paste = load_paste(store, id)?;
    let Some(path) = store.file_path(&paste, filename)? else {
        return Err(PasteError::FileNotFound(filename.to_string()));
    };
    let render = paste
        .meta
        .files
        .get(filename)
        .map(|e| e.render.clone())
        .unwrap_or_default();

    let served = ServedFile {
        path,
        mime: mime.to_string(),
        attachment: is_download(&render, mime),
    };
    let mut result = CmdResult::default().with_identifier(paste.id.clone());
    result.paths.push(served.path.clone());
    result.served_file = Some(served);
    Ok(result)
}
