//! # CLI Templates
//!
//! Terminal output is rendered from minijinja templates kept as standalone files,
//! included here as string constants.
//!
//! Layout math (column widths, truncation, padding) happens in Rust before
//! rendering; templates pick styles through the `style` filter and decide which
//! blocks appear. Line breaks are explicit: block tags trim the newline after
//! them with `-%}`, so each output line is one template line.

pub const LIST_TEMPLATE: &str = include_str!("templates/list.tmp");
pub const SHEET_TEMPLATE: &str = include_str!("templates/sheet.tmp");
pub const TAGS_TEMPLATE: &str = include_str!("templates/tags.tmp");
pub const CODES_TEMPLATE: &str = include_str!("templates/codes.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
