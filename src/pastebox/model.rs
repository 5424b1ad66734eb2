//! Core data types: the paste record, its per-file entries and the alias pointer.
//!
//! Field names on disk follow the `_meta.json` layout (camelCase keys). Every field
//! carries a serde default so partially written or older metadata files still load.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_DISPLAY_MODE: &str = "multi-normal";
pub const DEFAULT_FILE_TYPE: &str = "text";

/// Per-file directive selecting the content transformation.
///
/// Unknown values survive a load/save cycle through [`RenderMode::Other`] and render
/// like [`RenderMode::Plain`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RenderMode {
    #[default]
    Plain,
    Highlighted,
    Image,
    File,
    FileLink,
    Link,
    Rendered,
    Other(String),
}

impl RenderMode {
    pub fn as_str(&self) -> &str {
        match self {
            RenderMode::Plain => "plain",
            RenderMode::Highlighted => "highlighted",
            RenderMode::Image => "image",
            RenderMode::File => "file",
            RenderMode::FileLink => "file-link",
            RenderMode::Link => "link",
            RenderMode::Rendered => "rendered",
            RenderMode::Other(s) => s,
        }
    }

    /// Modes whose bytes are served rather than echoed as text.
    pub fn is_attachment(&self) -> bool {
        matches!(
            self,
            RenderMode::Image | RenderMode::File | RenderMode::FileLink
        )
    }
}

impl From<String> for RenderMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "plain" => RenderMode::Plain,
            "highlighted" => RenderMode::Highlighted,
            "image" => RenderMode::Image,
            "file" => RenderMode::File,
            "file-link" => RenderMode::FileLink,
            "link" => RenderMode::Link,
            "rendered" => RenderMode::Rendered,
            _ => RenderMode::Other(value),
        }
    }
}

impl From<&str> for RenderMode {
    fn from(value: &str) -> Self {
        RenderMode::from(value.to_string())
    }
}

impl From<RenderMode> for String {
    fn from(value: RenderMode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paste-level presentation directive: `single-*` shows the selected file only,
/// anything else shows every non-hidden file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayMode(pub String);

impl DisplayMode {
    pub fn new(mode: impl Into<String>) -> Self {
        Self(mode.into())
    }

    pub fn is_single(&self) -> bool {
        self.0.starts_with("single-")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self(DEFAULT_DISPLAY_MODE.to_string())
    }
}

fn default_file_type() -> String {
    DEFAULT_FILE_TYPE.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Content classification, e.g. a language name for highlighting or `markdown`.
    #[serde(rename = "type", default = "default_file_type")]
    pub file_type: String,
    #[serde(default)]
    pub render: RenderMode,
    /// Hidden from multi-file views.
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub unwrapped: bool,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub collapsed_description: String,
}

impl Default for FileEntry {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            description: String::new(),
            file_type: default_file_type(),
            render: RenderMode::Plain,
            hidden: false,
            unwrapped: false,
            collapsed: false,
            collapsed_description: String::new(),
        }
    }
}

impl FileEntry {
    pub fn new(render: RenderMode, file_type: impl Into<String>) -> Self {
        Self {
            render,
            file_type: file_type.into(),
            ..Self::default()
        }
    }

    /// The classification implied by the render mode. Attachment and link modes carry
    /// their own mode name; `rendered` always means markdown.
    pub fn normalize_type(&mut self) {
        match self.render {
            RenderMode::Image | RenderMode::File | RenderMode::FileLink | RenderMode::Link => {
                self.file_type = self.render.as_str().to_string();
            }
            RenderMode::Rendered => self.file_type = "markdown".to_string(),
            _ => {}
        }
    }
}

/// The `_meta.json` document of a full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteMeta {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub selected_file: String,
    #[serde(default = "epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "epoch")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub files: IndexMap<String, FileEntry>,
}

impl PasteMeta {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            title: default_title(),
            description: String::new(),
            summary: String::new(),
            author: default_author(),
            public: false,
            display_mode: DisplayMode::default(),
            selected_file: String::new(),
            created_at: now,
            updated_at: now,
            aliases: Vec::new(),
            files: IndexMap::new(),
        }
    }

    pub fn apply(&mut self, patch: &MetaPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(summary) = &patch.summary {
            self.summary = summary.clone();
        }
        if let Some(author) = &patch.author {
            self.author = author.clone();
        }
        if let Some(public) = patch.public {
            self.public = public;
        }
        if let Some(mode) = &patch.display_mode {
            self.display_mode = DisplayMode::new(mode.clone());
        }
        if let Some(selected) = &patch.selected_file {
            self.selected_file = selected.clone();
        }
    }
}

/// Editable paste-level fields. `None` keeps the stored (or default) value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub public: Option<bool>,
    pub display_mode: Option<String>,
    pub selected_file: Option<String>,
}

/// The `_alias.json` document: a single pointer at the canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasPointer {
    pub parent: String,
}

/// A full record as held in memory: its canonical identifier plus metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paste {
    pub id: String,
    pub meta: PasteMeta,
}

impl Paste {
    pub fn title(&self) -> &str {
        &self.meta.title
    }

    pub fn is_public(&self) -> bool {
        self.meta.public
    }

    pub fn files(&self) -> &IndexMap<String, FileEntry> {
        &self.meta.files
    }

    pub fn aliases(&self) -> &[String] {
        &self.meta.aliases
    }

    pub fn slug(&self) -> String {
        slugify(&self.meta.title)
    }

    /// Name of the cached HTML document inside the record directory.
    pub fn html_file_name(&self) -> String {
        format!("{}.html", self.slug())
    }

    pub fn html_url(&self, base_path: &str) -> String {
        format!(
            "{}/notes/{}/{}",
            base_path.trim_end_matches('/'),
            self.id,
            self.html_file_name()
        )
    }

    pub fn summary(&self) -> PasteSummary {
        PasteSummary {
            id: self.id.clone(),
            title: self.meta.title.clone(),
            summary: self.meta.summary.clone(),
            author: self.meta.author.clone(),
            public: self.meta.public,
            created_at: self.meta.created_at,
            updated_at: self.meta.updated_at,
            file_count: self.meta.files.len(),
            alias_count: self.meta.aliases.len(),
        }
    }
}

/// Listing row; avoids cloning the file map for overview screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasteSummary {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub author: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub file_count: usize,
    pub alias_count: usize,
}

/// Lower-cases the title and replaces every byte outside `[a-z0-9._-]` with
/// `_`, so a multi-byte character yields one `_` per byte.
pub fn slugify(title: &str) -> String {
    title
        .bytes()
        .map(|b| b.to_ascii_lowercase())
        .map(|b| {
            if b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'.' | b'_' | b'-') {
                char::from(b)
            } else {
                '_'
            }
        })
        .collect()
}
