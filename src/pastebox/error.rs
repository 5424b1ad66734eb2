use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasteError {
    #[error("Paste not found: {0}")]
    NotFound(String),

    #[error("Identifier '{0}' already exists")]
    IdentifierConflict(String),

    #[error("Invalid identifier '{0}': only alphanumeric characters, hyphens and underscores are allowed")]
    InvalidIdentifier(String),

    #[error("Alias '{alias}' is not associated with paste '{paste}'")]
    NotAssociated { alias: String, paste: String },

    #[error("Failed to generate a unique identifier after {0} attempts")]
    IdentifierExhausted(usize),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid filename '{0}'")]
    InvalidFilename(String),

    #[error("Login required")]
    Unauthorized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, PasteError>;
