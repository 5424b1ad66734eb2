use crate::compiler::RenderOutcome;
use crate::config::PasteboxConfig;
use crate::model::{Paste, PasteSummary};
use crate::store::DoctorReport;
use std::path::PathBuf;

pub mod alias;
pub mod config;
pub mod create;
pub mod delete;
pub mod doctor;
pub mod edit;
pub mod files;
pub mod helpers;
pub mod init;
pub mod list;
pub mod render;
pub mod serve;
pub mod update;
pub mod view;

pub use serve::ServedFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_pastes: Vec<Paste>,
    pub listed_pastes: Vec<PasteSummary>,
    /// Rendered document for view/render commands.
    pub html: Option<String>,
    /// Public URL of the affected paste.
    pub url: Option<String>,
    /// An identifier produced by the command (new alias, resolved id, ...).
    pub identifier: Option<String>,
    pub served_file: Option<ServedFile>,
    pub render_outcomes: Vec<RenderOutcome>,
    pub doctor_report: Option<DoctorReport>,
    pub config: Option<PasteboxConfig>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_pastes(mut self, pastes: Vec<Paste>) -> Self {
        self.affected_pastes = pastes;
        self
    }

    pub fn with_listed_pastes(mut self, pastes: Vec<PasteSummary>) -> Self {
        self.listed_pastes = pastes;
        self
    }

    pub fn with_html(mut self, html: String) -> Self {
        self.html = Some(html);
        self
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_identifier(mut self, id: String) -> Self {
        self.identifier = Some(id);
        self
    }

    pub fn with_config(mut self, config: PasteboxConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}
