use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Version string with git hash and commit date for non-release builds.
/// "0.3.2" for releases, "0.3.2@abc1234 2024-01-15" otherwise.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("PASTEBOX_GIT_HASH");
    const COMMIT_DATE: &str = env!("PASTEBOX_COMMIT_DATE");
    const IS_RELEASE: &str = env!("PASTEBOX_IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "pastebox", bin_name = "pastebox", version = get_version())]
#[command(about = "Multi-file pastes published as static HTML", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Store directory (defaults to $PASTEBOX_ROOT, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Act as this user (defaults to $PASTEBOX_USER, then $USER)
    #[arg(long, global = true, value_name = "NAME")]
    pub user: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Core(CoreCommands),

    #[command(flatten)]
    Paste(PasteCommands),

    #[command(flatten)]
    Files(FileCommands),

    /// Manage aliases of a paste
    #[command(subcommand, display_order = 30)]
    Alias(AliasCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum CoreCommands {
    /// Create a paste
    #[command(alias = "n", display_order = 1)]
    Create {
        /// Custom identifier (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Make the paste visible to anonymous visitors
        #[arg(long)]
        public: bool,

        /// Attach a file, optionally with a render mode (e.g. notes.md:rendered)
        #[arg(long = "file", value_name = "PATH[:MODE]")]
        files: Vec<String>,
    },

    /// List pastes, newest first
    #[command(alias = "ls", display_order = 2)]
    List,

    /// Show a paste (rebuilds the page if the cache is missing)
    #[command(alias = "v", display_order = 3)]
    Show {
        id: String,

        /// Print the full HTML document
        #[arg(long)]
        html: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PasteCommands {
    /// Apply a full edit form (JSON) to a paste
    #[command(display_order = 10)]
    Edit {
        id: String,

        /// Form document: metadata, files, aliases, makePrimary
        #[arg(long, value_name = "FORM.json")]
        form: PathBuf,

        /// Bytes for a form entry, by entry index
        #[arg(long = "upload", value_name = "INDEX=PATH")]
        uploads: Vec<String>,
    },

    /// Update paste metadata
    #[command(display_order = 11)]
    Meta {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// true or false
        #[arg(long)]
        public: Option<bool>,

        /// e.g. multi-normal, single-wide
        #[arg(long)]
        display_mode: Option<String>,

        #[arg(long)]
        selected_file: Option<String>,
    },

    /// Delete a paste and its aliases
    #[command(alias = "rm", display_order = 12)]
    Delete { id: String },

    /// Rebuild the page of one paste
    #[command(display_order = 13)]
    Render { id: String },

    /// Print where a file's bytes live and how they are served
    #[command(display_order = 14)]
    File {
        id: String,
        name: String,

        /// MIME type of the file (guessed from the name when omitted)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Print the canonical identifier
    #[command(display_order = 15)]
    Resolve { id: String },
}

#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Add or replace a file
    #[command(name = "add-file", display_order = 20)]
    AddFile {
        id: String,
        path: PathBuf,

        /// Stored name (defaults to the file's name)
        #[arg(long)]
        name: Option<String>,

        /// Render mode: plain, highlighted, rendered, image, file, file-link, link
        #[arg(long)]
        mode: Option<String>,

        /// Content type, e.g. rust or markdown
        #[arg(long = "type")]
        file_type: Option<String>,
    },

    /// Remove a file
    #[command(name = "rm-file", display_order = 21)]
    RmFile { id: String, name: String },

    /// Rename a file (replaces an existing file of that name)
    #[command(name = "mv-file", display_order = 22)]
    MvFile { id: String, old: String, new: String },

    /// Reorder files; names not given keep their relative order at the end
    #[command(display_order = 23)]
    Order {
        id: String,
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Add an alias (generated when omitted)
    Add { id: String, alias: Option<String> },

    /// Remove an alias
    Rm { id: String, alias: String },

    /// Make an alias the primary identifier
    Promote { id: String, alias: String },

    /// Propose an unused identifier
    Gen { id: String },

    /// Check that an alias is well-formed and unused
    Check { id: String, alias: String },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Rebuild every page
    #[command(name = "rerender-all", display_order = 40)]
    RerenderAll,

    /// Check and repair alias bookkeeping
    #[command(display_order = 41)]
    Doctor,

    /// Get or set configuration
    #[command(display_order = 42)]
    Config {
        /// Configuration key (base-path, default-author, display-mode)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Initialize the store
    #[command(display_order = 43)]
    Init,
}
