//! # Rendering
//!
//! Styled terminal output for the CLI. Data is shaped here into small view
//! structs, then rendered through the templates in [`super::templates`] with a
//! `style` filter backed by [`SCOREBOOK_THEME`].
//!
//! Column widths, truncation and padding are computed in Rust since they need
//! Unicode-aware measuring. Templates only choose styles and which blocks show.
//!
//! Colors follow `console`'s detection of stdout; piped output is plain. Every
//! `render_*` function has an internal twin taking an explicit color override,
//! which the tests use.

use super::styles::{names, SCOREBOOK_THEME};
use super::templates::{
    CODES_TEMPLATE, LIST_TEMPLATE, MESSAGES_TEMPLATE, SHEET_TEMPLATE, TAGS_TEMPLATE,
};
use chrono::{DateTime, Utc};
use console::Term;
use minijinja::{Environment, Value};
use scorebook::commands::{
    Choice, CmdMessage, DisplaySheet, FilterChoices, MessageLevel, SheetPage, TagUsage,
};
use scorebook::form::ValidationErrors;
use scorebook::model::{Classification, Sheet};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const COMPOSER_WIDTH: usize = 24;
pub const TIME_WIDTH: usize = 14;
const SLUG_MAX_WIDTH: usize = 28;
const LABEL_WIDTH: usize = 16;
const NO_SLUG: &str = "(no slug)";

fn render_template<T: Serialize>(
    template: &str,
    data: &T,
    use_color: Option<bool>,
) -> Result<String, minijinja::Error> {
    let use_color = use_color.unwrap_or_else(|| Term::stdout().features().colors_supported());
    let mut env = Environment::new();
    env.add_filter("style", move |value: Value, name: String| -> String {
        SCOREBOOK_THEME.apply(&name, &value.to_string(), use_color)
    });
    env.add_template("view", template)?;
    env.get_template("view")?.render(data)
}

#[derive(Serialize)]
struct SheetLine {
    title: String,
    slug: String,
    slug_style: &'static str,
    padding: String,
    composer: String,
    composer_padding: String,
    time_ago: String,
}

#[derive(Serialize)]
struct ListData {
    lines: Vec<SheetLine>,
    empty: bool,
    footer: String,
    years: Vec<i32>,
}

/// Renders one listing page: a line per sheet plus the pagination footer.
pub fn render_page(page: &SheetPage) -> String {
    render_page_internal(page, None)
}

fn render_page_internal(page: &SheetPage, use_color: Option<bool>) -> String {
    let fixed = 2 + 2 + 2 + COMPOSER_WIDTH + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed);

    let lines = page
        .sheets
        .iter()
        .map(|shown| {
            let sheet = &shown.sheet;
            let (slug, slug_style) = match sheet.slug.as_deref() {
                Some(slug) => (truncate_to_width(slug, SLUG_MAX_WIDTH), names::SLUG),
                None => (NO_SLUG.to_string(), names::DIM),
            };
            let title = truncate_to_width(&sheet.title, available.saturating_sub(slug.width()));
            let padding = " ".repeat(available.saturating_sub(title.width() + slug.width()));
            let composer = truncate_to_width(&sheet.composer, COMPOSER_WIDTH);
            let composer_padding = " ".repeat(COMPOSER_WIDTH.saturating_sub(composer.width()));
            SheetLine {
                title,
                slug,
                slug_style,
                padding,
                composer,
                composer_padding,
                time_ago: format!(
                    "{:>width$}",
                    time_ago(sheet.date_created),
                    width = TIME_WIDTH
                ),
            }
        })
        .collect::<Vec<_>>();

    let noun = if page.total_count == 1 { "sheet" } else { "sheets" };
    let data = ListData {
        empty: lines.is_empty(),
        lines,
        footer: format!(
            "Page {} of {} ({} {})",
            page.number, page.num_pages, page.total_count, noun
        ),
        years: page.years.clone(),
    };

    render_template(LIST_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

#[derive(Serialize)]
struct Row {
    label: String,
    value: String,
}

#[derive(Serialize)]
struct SheetData<'a> {
    title: &'a str,
    slug: Option<&'a str>,
    public: bool,
    composer: &'a str,
    rows: Vec<Row>,
    description: Option<&'a str>,
}

fn row(label: &str, value: impl Into<String>) -> Row {
    Row {
        label: format!("{:<width$}", format!("{}:", label), width = LABEL_WIDTH),
        value: value.into(),
    }
}

fn classified<C: Classification>(value: Option<C>) -> Option<String> {
    value.map(|c| {
        if c.code() == c.label() {
            c.code().to_string()
        } else {
            format!("{} ({})", c.label(), c.code())
        }
    })
}

fn detail_rows(shown: &DisplaySheet) -> Vec<Row> {
    let sheet: &Sheet = &shown.sheet;
    let optional = [
        ("Arranger", sheet.arranger.clone()),
        ("Cast", classified(sheet.cast)),
        ("Season", classified(sheet.season)),
        ("Liturgical use", classified(sheet.liturgical_use)),
        ("Genre", classified(sheet.genre)),
        ("Difficulty", classified(sheet.difficulty)),
        ("Year", sheet.publication_year.map(|y| y.to_string())),
        ("Publisher", sheet.publisher.clone()),
        ("ISBN", sheet.isbn.clone()),
    ];

    let mut rows = vec![row("Id", sheet.id.to_string())];
    rows.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| value.map(|v| row(label, v))),
    );
    if !shown.tag_names.is_empty() {
        rows.push(row("Tags", shown.tag_names.join(", ")));
    }
    rows.push(row(
        "File",
        format!("{} ({} bytes)", sheet.sheet_file.file_name, sheet.sheet_file.size),
    ));
    if let Some(preview) = &sheet.preview_image {
        rows.push(row("Preview", preview.file_name.clone()));
    }
    rows.push(row(
        "Added",
        format!("{} by {}", time_ago(sheet.date_created), sheet.created_by),
    ));
    if sheet.date_modified != sheet.date_created {
        rows.push(row(
            "Modified",
            format!("{} by {}", time_ago(sheet.date_modified), sheet.modified_by),
        ));
    }
    rows
}

/// Renders the full record of one sheet.
pub fn render_sheet(shown: &DisplaySheet) -> String {
    render_sheet_internal(shown, None)
}

fn render_sheet_internal(shown: &DisplaySheet, use_color: Option<bool>) -> String {
    let sheet = &shown.sheet;
    let data = SheetData {
        title: &sheet.title,
        slug: sheet.slug.as_deref(),
        public: sheet.public,
        composer: &sheet.composer,
        rows: detail_rows(shown),
        description: sheet.description.as_deref(),
    };
    render_template(SHEET_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

#[derive(Serialize)]
struct TagLine<'a> {
    name: &'a str,
    count: String,
}

#[derive(Serialize)]
struct TagsData<'a> {
    tags: Vec<TagLine<'a>>,
    empty: bool,
}

pub fn render_tags(tags: &[TagUsage]) -> String {
    render_tags_internal(tags, None)
}

fn render_tags_internal(tags: &[TagUsage], use_color: Option<bool>) -> String {
    let width = tags
        .iter()
        .map(|t| t.count.to_string().len())
        .max()
        .unwrap_or(1);
    let data = TagsData {
        tags: tags
            .iter()
            .map(|t| TagLine {
                name: &t.name,
                count: format!("{:>width$}", t.count, width = width),
            })
            .collect(),
        empty: tags.is_empty(),
    };
    render_template(TAGS_TEMPLATE, &data, use_color).unwrap_or_else(|_| {
        tags.iter()
            .map(|t| format!("{} {}\n", t.count, t.name))
            .collect()
    })
}

#[derive(Serialize)]
struct ChoiceLine {
    code: &'static str,
    padding: String,
    label: &'static str,
}

#[derive(Serialize)]
struct CodeGroup {
    field: &'static str,
    choices: Vec<ChoiceLine>,
}

#[derive(Serialize)]
struct CodesData {
    groups: Vec<CodeGroup>,
}

/// Renders every classification set with its codes and labels.
pub fn render_codes(choices: &FilterChoices) -> String {
    render_codes_internal(choices, None)
}

fn render_codes_internal(choices: &FilterChoices, use_color: Option<bool>) -> String {
    fn group(field: &'static str, choices: &[Choice]) -> CodeGroup {
        let width = choices.iter().map(|c| c.code.width()).max().unwrap_or(0) + 2;
        CodeGroup {
            field,
            choices: choices
                .iter()
                .map(|c| ChoiceLine {
                    code: c.code,
                    padding: " ".repeat(width.saturating_sub(c.code.width())),
                    label: c.label,
                })
                .collect(),
        }
    }

    let data = CodesData {
        groups: vec![
            group("cast", &choices.cast),
            group("season", &choices.season),
            group("liturgical_use", &choices.liturgical_use),
            group("genre", &choices.genre),
            group("difficulty", &choices.difficulty),
        ],
    };
    render_template(CODES_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: &'static str,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_internal(messages, None)
}

fn render_messages_internal(messages: &[CmdMessage], use_color: Option<bool>) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let data = MessagesData {
        messages: messages
            .iter()
            .map(|msg| MessageData {
                content: msg.content.clone(),
                style: match msg.level {
                    MessageLevel::Success => names::SUCCESS,
                    MessageLevel::Warning => names::WARNING,
                    MessageLevel::Error => names::ERROR,
                },
            })
            .collect(),
    };

    render_template(MESSAGES_TEMPLATE, &data, use_color).unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}

/// One error line per rejected field.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<CmdMessage> {
    errors
        .iter()
        .map(|(field, message)| CmdMessage::error(format!("{}: {}", field, message)))
        .collect()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let limit = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > limit {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn time_ago(timestamp: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(timestamp);
    timeago::Formatter::new().convert(elapsed.to_std().unwrap_or_default())
}
