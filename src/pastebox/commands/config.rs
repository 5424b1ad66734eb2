use crate::commands::{CmdMessage, CmdResult};
use crate::config::PasteboxConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(root: &Path, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let config = PasteboxConfig::load(root)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = PasteboxConfig::load(root)?;
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut config = PasteboxConfig::load(root)?;
            if let Err(e) = config.set(&key, &value) {
                let mut res = CmdResult::default();
                res.add_message(CmdMessage::error(e));
                return Ok(res);
            }
            config.save(root)?;
            let display_val = config.get(&key).unwrap_or_else(|| value.clone());
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_then_show_key() {
        let dir = TempDir::new().unwrap();
        run(
            dir.path(),
            ConfigAction::Set("base-path".into(), "/paste".into()),
        )
        .unwrap();
        let result = run(dir.path(), ConfigAction::ShowKey("base-path".into())).unwrap();
        assert_eq!(result.messages[0].content, "/paste");
    }

    #[test]
    fn unknown_key_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let result = run(dir.path(), ConfigAction::Set("colour".into(), "red".into())).unwrap();
        assert!(result.has_errors());
        assert!(!dir.path().join("config.json").exists());
    }
}
