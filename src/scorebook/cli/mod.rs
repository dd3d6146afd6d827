//! # CLI Behavior
//!
//! An operator's client for the catalog. It runs against the same data
//! directory as `scorebook serve`, through the same [`scorebook::api::CatalogApi`].
//!
//! ## Identity
//!
//! The CLI acts as the local operator, a superuser who sees every sheet.
//! `--as-user NAME` (optionally with `--groups a,b`) runs a command as a plain
//! member instead, which is handy for checking what members can see.
//!
//! ## Naked Execution
//!
//! Running `scorebook` with no subcommand lists the first page, like
//! `scorebook list`.
//!
//! ## Addressing Sheets
//!
//! `show`, `edit` and `delete` accept either a sheet id or its slug. `show`
//! with an id behaves like the legacy address: a sheet without a slug gets one.
//!
//! ## Editing
//!
//! `edit` starts from the stored record and overwrites only the fields given.
//! `--tags ""` clears all tags; `--public` and `--private` flip visibility.
//!
//! ## Module Structure
//!
//! - `commands`: dispatch and per-command handlers
//! - `render`: output formatting
//! - `setup`: argument parsing via clap
//! - `styles`: the terminal theme
//! - `templates`: output templates

mod commands;
mod render;
pub mod setup;
mod styles;
mod templates;

pub use commands::{report_error, run};
