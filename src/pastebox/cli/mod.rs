//! # CLI Layer
//!
//! One client of the pastebox library, not the application itself. This is the
//! only place that knows about stdout, stderr, exit codes and the process
//! environment (through [`pastebox::init`]).
//!
//! - `setup.rs`: clap argument definitions
//! - `commands.rs`: context wiring and one `handle_*` per command
//! - `print.rs`: terminal formatting of `CmdResult` values

mod commands;
mod print;
mod setup;

pub use commands::run;
