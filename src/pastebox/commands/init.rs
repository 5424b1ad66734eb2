use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use std::fs;
use std::path::Path;

pub fn run(root: &Path) -> Result<CmdResult> {
    fs::create_dir_all(root)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Initialized pastebox store at {}",
        root.display()
    )));
    result.paths.push(root.to_path_buf());
    Ok(result)
}
