//! # CLI Layer
//!
//! This module is one client of the catalog, not the catalog itself. It is the
//! only place that:
//! - reads shell arguments and local files
//! - writes to stdout and stderr
//! - decides exit codes
//!
//! ## Structure
//!
//! - `run()`: parses arguments, installs logging, dispatches
//! - `init_context()`: opens the file-backed [`CatalogApi`] from [`CatalogConfig`]
//! - `handle_*()`: one per subcommand, calling the API and printing the result
//!
//! Business rules live in the command layer; handlers only translate arguments
//! into API calls and results into text.

use super::render::{
    print_messages, render_codes, render_page, render_sheet, render_tags, validation_messages,
};
use super::setup::{Cli, Commands, ListArgs, SheetArgs};
use clap::Parser;
use scorebook::access::Caller;
use scorebook::api::CatalogApi;
use scorebook::commands::{Attachments, CmdResult};
use scorebook::config::CatalogConfig;
use scorebook::error::{CatalogError, Result};
use scorebook::form::SheetForm;
use scorebook::query::ListQuery;
use scorebook::store::blob::{FsBlobStore, Upload};
use scorebook::store::fs::FileStore;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_LOG_FILTER: &str = "scorebook=info,tower_http=info";
const VERBOSE_LOG_FILTER: &str = "scorebook=debug,tower_http=debug";

struct AppContext {
    api: CatalogApi<FileStore, FsBlobStore>,
    caller: Caller,
    config: CatalogConfig,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = CatalogConfig::load()?;
    let mut ctx = init_context(&cli, config)?;

    match cli.command {
        Some(Commands::Serve { bind }) => handle_serve(&ctx, bind),
        Some(Commands::List(args)) => handle_list(&ctx, &args),
        Some(Commands::Show { target }) => handle_show(&mut ctx, &target),
        Some(Commands::Add { fields }) => handle_add(&mut ctx, &fields),
        Some(Commands::Edit { id, fields }) => handle_edit(&mut ctx, &id, &fields),
        Some(Commands::Delete { id }) => handle_delete(&mut ctx, &id),
        Some(Commands::Tags) => handle_tags(&ctx),
        Some(Commands::Codes) => handle_codes(&ctx),
        None => handle_list(&ctx, &ListArgs::default()),
    }
}

/// Prints a failed command to stderr. Rejected forms get one line per field.
pub fn report_error(err: &CatalogError) {
    match err {
        CatalogError::Validation(errors) => {
            eprintln!("Error: the sheet was not saved");
            for message in validation_messages(errors) {
                eprintln!("  {}", message.content);
            }
        }
        err => eprintln!("Error: {}", err),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep that one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn init_context(cli: &Cli, config: CatalogConfig) -> Result<AppContext> {
    let data_dir = config.data_dir()?;
    tracing::debug!(data_dir = %data_dir.display(), "opening catalog");

    let api = CatalogApi::new(
        FileStore::new(data_dir),
        FsBlobStore::new(config.blob_dir()?),
        config.editor_group.clone(),
    );

    let caller = match &cli.as_user {
        Some(username) => Caller::member(username.clone()).with_groups(cli.groups.clone()),
        None => Caller::operator(local_username()),
    };

    Ok(AppContext {
        api,
        caller,
        config,
    })
}

fn local_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "operator".to_string())
}

fn handle_serve(ctx: &AppContext, bind: Option<String>) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(bind) = bind {
        config.bind = bind;
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(scorebook::server::serve(&config))
}

fn handle_list(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let query = ListQuery::from_params(args.params())?;
    let result = ctx.api.list_sheets(&ctx.caller, &query)?;
    if let Some(page) = &result.page {
        print!("{}", render_page(page));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &mut AppContext, target: &str) -> Result<()> {
    let result = match Uuid::parse_str(target) {
        Ok(id) => ctx.api.sheet_by_id(&ctx.caller, &id)?,
        Err(_) => ctx.api.sheet_by_slug(&ctx.caller, target)?,
    };
    print_sheet(&result);
    print_messages(&result.messages);
    Ok(())
}

fn handle_add(ctx: &mut AppContext, fields: &SheetArgs) -> Result<()> {
    let mut form = SheetForm::default();
    fill_form(&mut form, fields);
    let uploads = Uploads::read(fields)?;

    let result = ctx
        .api
        .create_sheet(&ctx.caller, &form, uploads.attachments())?;
    print_messages(&result.messages);
    print_sheet(&result);
    Ok(())
}

fn handle_edit(ctx: &mut AppContext, target: &str, fields: &SheetArgs) -> Result<()> {
    let id = resolve_id(ctx, target)?;
    let current = ctx.api.sheet_for_edit(&ctx.caller, &id)?;
    let mut form = current
        .sheet()
        .map(|shown| SheetForm::from_sheet(&shown.sheet, &shown.tag_names))
        .ok_or(CatalogError::SheetNotFound(id))?;
    fill_form(&mut form, fields);
    let uploads = Uploads::read(fields)?;

    let result = ctx
        .api
        .update_sheet(&ctx.caller, &id, &form, uploads.attachments())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, target: &str) -> Result<()> {
    let id = resolve_id(ctx, target)?;
    let result = ctx.api.delete_sheet(&ctx.caller, &id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_tags(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.tags(&ctx.caller)?;
    print!("{}", render_tags(&result.tags));
    Ok(())
}

fn handle_codes(ctx: &AppContext) -> Result<()> {
    if let Some(choices) = &ctx.api.choices().choices {
        print!("{}", render_codes(choices));
    }
    Ok(())
}

fn print_sheet(result: &CmdResult) {
    if let Some(shown) = result.sheet() {
        print!("{}", render_sheet(shown));
    }
}

/// Ids are taken as-is; anything else is looked up as a slug.
fn resolve_id(ctx: &AppContext, target: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(target) {
        return Ok(id);
    }
    ctx.api
        .sheet_by_slug(&ctx.caller, target)?
        .sheet()
        .map(|shown| shown.sheet.id)
        .ok_or_else(|| CatalogError::SlugNotFound(target.to_string()))
}

/// Overwrites the form fields given on the command line, leaving the rest.
fn fill_form(form: &mut SheetForm, fields: &SheetArgs) {
    let text = [
        (&mut form.title, &fields.title),
        (&mut form.composer, &fields.composer),
        (&mut form.arranger, &fields.arranger),
        (&mut form.cast, &fields.cast),
        (&mut form.season, &fields.season),
        (&mut form.liturgical_use, &fields.liturgical_use),
        (&mut form.genre, &fields.genre),
        (&mut form.difficulty, &fields.difficulty),
        (&mut form.publication_year, &fields.year),
        (&mut form.publisher, &fields.publisher),
        (&mut form.isbn, &fields.isbn),
        (&mut form.description, &fields.description),
        (&mut form.tags, &fields.tags),
    ];
    for (slot, value) in text {
        if let Some(value) = value {
            *slot = value.clone();
        }
    }
    if fields.public {
        form.public = true;
    } else if fields.private {
        form.public = false;
    }
}

#[derive(Default)]
struct Uploads {
    sheet_file: Option<Upload>,
    preview_image: Option<Upload>,
}

impl Uploads {
    fn read(fields: &SheetArgs) -> Result<Self> {
        Ok(Self {
            sheet_file: fields.file.as_deref().map(read_upload).transpose()?,
            preview_image: fields.preview.as_deref().map(read_upload).transpose()?,
        })
    }

    fn attachments(&self) -> Attachments<'_> {
        Attachments {
            sheet_file: self.sheet_file.as_ref(),
            preview_image: self.preview_image.as_ref(),
        }
    }
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Upload::new(file_name, bytes))
}
