//! # Command Layer
//!
//! One module per operation. Commands take plain Rust values (a store, a
//! scope, a validated form) and return a [`CmdResult`]; they never touch the
//! network, the terminal, or the process.

use crate::model::Sheet;
use crate::store::blob::Upload;
use serde::Serialize;

pub mod choices;
pub mod create;
pub mod delete;
pub mod detail;
pub mod helpers;
pub mod list;
pub mod tags;
pub mod update;

pub use choices::{Choice, FilterChoices};
pub use list::{SheetPage, PAGE_SIZE};
pub use tags::TagUsage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
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

/// Files submitted together with a sheet form. `None` means no upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Attachments<'a> {
    pub sheet_file: Option<&'a Upload>,
    pub preview_image: Option<&'a Upload>,
}

/// A sheet together with its resolved tag names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySheet {
    #[serde(flatten)]
    pub sheet: Sheet,
    pub tag_names: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_sheets: Vec<DisplaySheet>,
    pub page: Option<SheetPage>,
    pub tags: Vec<TagUsage>,
    pub choices: Option<FilterChoices>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_sheet(mut self, sheet: DisplaySheet) -> Self {
        self.affected_sheets.push(sheet);
        self
    }

    pub fn with_page(mut self, page: SheetPage) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagUsage>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_choices(mut self, choices: FilterChoices) -> Self {
        self.choices = Some(choices);
        self
    }

    /// The first affected sheet, for single-record commands.
    pub fn sheet(&self) -> Option<&DisplaySheet> {
        self.affected_sheets.first()
    }
}
