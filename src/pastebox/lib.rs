//! # Pastebox Architecture
//!
//! Pastebox publishes multi-file pastes as static HTML documents. It is a library
//! with a CLI client, not a CLI with some library code.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, session gate                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One module per operation, returns CmdResult              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (compiler.rs, render.rs, submission.rs, ident.rs)     │
//! │  Storage (store/): StorageBackend trait, FsBackend,         │
//! │  MemBackend, PasteStore with record and alias semantics     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//!
//! Every paste lives in a slot named by its identifier. A slot is either a full
//! record (`_meta.json` plus `files/`) or an alias (`_alias.json` naming the
//! record). Lookups follow at most one alias hop. The record lists its aliases and
//! each alias points back, and every alias operation keeps both sides in step.
//! See [`store`] for the protocol and [`store::paste_store::PasteStore::doctor`]
//! for recovery.
//!
//! ## No I/O assumptions in core
//!
//! From `api.rs` inward, code never prints, never exits and never reads the
//! environment. The store root and public base path are passed in; [`init`] is
//! where a front end resolves them.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade, entry point for all operations
//! - [`commands`]: logic for each operation
//! - [`store`]: storage abstraction, backends, record store
//! - [`compiler`]: builds and caches the HTML document for a paste
//! - [`render`]: per-file HTML fragments
//! - [`submission`]: turns a form submission into file operations
//! - [`ident`]: identifier validation and generation
//! - [`model`]: `Paste`, `PasteMeta`, `FileEntry`, `RenderMode`
//! - [`config`]: `config.json` handling
//! - [`init`]: root and session resolution
//! - [`error`]: error types
//! - `cli`: argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod compiler;
pub mod config;
pub mod error;
pub mod ident;
pub mod init;
pub mod model;
pub mod render;
pub mod store;
pub mod submission;
