use super::print::{print_config, print_list, print_messages, print_paste, print_served};
use super::setup::{
    AliasCommands, Cli, Commands, CoreCommands, FileCommands, MiscCommands, PasteCommands,
};
use clap::Parser;
use pastebox::api::PasteApi;
use pastebox::commands::config::ConfigAction;
use pastebox::commands::CmdResult;
use pastebox::error::{PasteError, Result};
use pastebox::init::initialize;
use pastebox::model::{MetaPatch, RenderMode};
use pastebox::render;
use pastebox::store::fs_backend::FsBackend;
use pastebox::submission::{self, FileSubmission, PasteForm, ProcessedFile, Upload};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: PasteApi<FsBackend>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Core(cmd)) => match cmd {
            CoreCommands::Create {
                id,
                title,
                description,
                author,
                public,
                files,
            } => {
                let patch = MetaPatch {
                    title,
                    description,
                    author,
                    public: public.then_some(true),
                    ..MetaPatch::default()
                };
                handle_create(&ctx, patch, id, files)
            }
            CoreCommands::List => handle_list(&ctx),
            CoreCommands::Show { id, html } => handle_show(&ctx, &id, html),
        },
        Some(Commands::Paste(cmd)) => match cmd {
            PasteCommands::Edit { id, form, uploads } => handle_edit(&ctx, &id, &form, &uploads),
            PasteCommands::Meta {
                id,
                title,
                description,
                summary,
                author,
                public,
                display_mode,
                selected_file,
            } => {
                let patch = MetaPatch {
                    title,
                    description,
                    summary,
                    author,
                    public,
                    display_mode,
                    selected_file,
                };
                finish(ctx.api.update_paste(&id, &patch)?)
            }
            PasteCommands::Delete { id } => finish(ctx.api.delete_paste(&id)?),
            PasteCommands::Render { id } => finish(ctx.api.render_paste(&id)?),
            PasteCommands::File { id, name, mime } => handle_file(&ctx, &id, &name, mime),
            PasteCommands::Resolve { id } => handle_resolve(&ctx, &id),
        },
        Some(Commands::Files(cmd)) => match cmd {
            FileCommands::AddFile {
                id,
                path,
                name,
                mode,
                file_type,
            } => {
                let file = load_file(&path, name, mode, file_type)?;
                finish(ctx.api.add_file(&id, file)?)
            }
            FileCommands::RmFile { id, name } => finish(ctx.api.remove_file(&id, &name)?),
            FileCommands::MvFile { id, old, new } => finish(ctx.api.rename_file(&id, &old, &new)?),
            FileCommands::Order { id, names } => finish(ctx.api.reorder_files(&id, &names)?),
        },
        Some(Commands::Alias(cmd)) => match cmd {
            AliasCommands::Add { id, alias } => {
                finish(ctx.api.add_alias(&id, alias.as_deref())?)
            }
            AliasCommands::Rm { id, alias } => finish(ctx.api.remove_alias(&id, &alias)?),
            AliasCommands::Promote { id, alias } => finish(ctx.api.make_primary(&id, &alias)?),
            AliasCommands::Gen { id } => finish(ctx.api.generate_alias_id(&id)?),
            AliasCommands::Check { id, alias } => finish(ctx.api.validate_alias_id(&id, &alias)?),
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::RerenderAll => finish(ctx.api.rerender_all()?),
            MiscCommands::Doctor => finish(ctx.api.doctor()?),
            MiscCommands::Config { key, value } => handle_config(&mut ctx, key, value),
            MiscCommands::Init => finish(ctx.api.init()?),
        },
        None => handle_list(&ctx),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pastebox=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pastebox=warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let ctx = initialize(cli.root.clone(), cli.user.clone())?;
    Ok(AppContext { api: ctx.api })
}

/// Prints messages and turns reported errors into a failing exit.
fn finish(result: CmdResult) -> Result<()> {
    print_messages(&result.messages);
    if let Some(url) = &result.url {
        println!("{}", url);
    }
    if result.has_errors() {
        return Err(PasteError::Api("command reported errors".into()));
    }
    Ok(())
}

fn handle_create(
    ctx: &AppContext,
    patch: MetaPatch,
    id: Option<String>,
    specs: Vec<String>,
) -> Result<()> {
    let mut files = Vec::with_capacity(specs.len());
    for spec in &specs {
        let (path, mode) = split_file_spec(spec);
        files.push(load_file(Path::new(path), None, mode.map(String::from), None)?);
    }
    finish(ctx.api.create_paste(patch, id.as_deref(), files)?)
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_pastes()?;
    print_list(&result.listed_pastes);
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &AppContext, id: &str, html: bool) -> Result<()> {
    let result = ctx.api.view_paste(id)?;
    if html {
        if let Some(doc) = &result.html {
            println!("{}", doc);
        }
        return Ok(());
    }
    if let Some(paste) = result.affected_pastes.first() {
        print_paste(paste, result.url.as_deref());
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(ctx: &AppContext, id: &str, form_path: &Path, upload_specs: &[String]) -> Result<()> {
    let raw = std::fs::read_to_string(form_path)?;
    let form: PasteForm = serde_json::from_str(&raw)?;

    let mut uploads = HashMap::new();
    for spec in upload_specs {
        let (index, path) = spec
            .split_once('=')
            .and_then(|(i, p)| i.parse::<usize>().ok().map(|i| (i, PathBuf::from(p))))
            .ok_or_else(|| PasteError::Api(format!("Invalid upload '{}', expected INDEX=PATH", spec)))?;
        let bytes = std::fs::read(&path)?;
        let mime = guess_mime(&path, &bytes).to_string();
        uploads.insert(index, Upload { bytes, mime });
    }
    finish(ctx.api.edit_paste(id, form, &uploads)?)
}

fn handle_file(ctx: &AppContext, id: &str, name: &str, mime: Option<String>) -> Result<()> {
    let mime = match mime {
        Some(m) => m,
        None => guess_mime(Path::new(name), &[]).to_string(),
    };
    let result = ctx.api.serve_file(id, name, &mime)?;
    if let Some(served) = &result.served_file {
        print_served(served);
    }
    Ok(())
}

fn handle_resolve(ctx: &AppContext, id: &str) -> Result<()> {
    let result = ctx.api.resolve(id)?;
    if let Some(canonical) = &result.identifier {
        println!("{}", canonical);
    }
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);
    let result = ctx.api.config_action(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    if result.has_errors() {
        return Err(PasteError::Api("invalid configuration".into()));
    }
    Ok(())
}

/// `PATH[:MODE]`. The suffix only counts when it names a render mode, so paths
/// containing colons still work.
fn split_file_spec(spec: &str) -> (&str, Option<&str>) {
    if let Some((path, mode)) = spec.rsplit_once(':') {
        if !path.is_empty() && !matches!(RenderMode::from(mode), RenderMode::Other(_)) {
            return (path, Some(mode));
        }
    }
    (spec, None)
}

fn load_file(
    path: &Path,
    name: Option<String>,
    mode: Option<String>,
    file_type: Option<String>,
) -> Result<ProcessedFile> {
    let bytes = std::fs::read(path)?;
    let filename = name.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let file_type = file_type.or_else(|| type_for(path).map(String::from));
    let mime = guess_mime(path, &bytes).to_string();
    let submission = FileSubmission {
        filename,
        render: mode,
        file_type,
        ..FileSubmission::default()
    };
    Ok(submission::process(&submission, Some(&Upload { bytes, mime })))
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Content type label for common source extensions.
fn type_for(path: &Path) -> Option<&'static str> {
    Some(match extension(path).as_str() {
        "md" | "markdown" => "markdown",
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" => "javascript",
        "ts" => "typescript",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "sh" => "bash",
        "html" | "htm" => "html",
        "css" => "css",
        "go" => "go",
        "c" | "h" => "c",
        "sql" => "sql",
        _ => return None,
    })
}

/// Extension table, falling back to the binary heuristic for unknown files.
fn guess_mime(path: &Path, bytes: &[u8]) -> &'static str {
    match extension(path).as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "json" => "application/json",
        "xml" => "application/xml",
        "js" | "mjs" => "application/javascript",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "md" | "markdown" => "text/markdown",
        "txt" | "rs" | "py" | "ts" | "toml" | "yaml" | "yml" | "sh" | "go" | "c" | "h"
        | "sql" => "text/plain",
        _ if render::is_binary(bytes) => "application/octet-stream",
        _ => "text/plain",
    }
}
