//! Listing, filtering, search and pagination.
//!
//! The pipeline runs in a fixed order over the scope-limited record set:
//!
//! 1. exact filters (every one that is set must match),
//! 2. free-text search, OR-ed across the text fields and tag names,
//! 3. ordering by title,
//! 4. pagination with the requested page clamped into range.
//!
//! The publication years offered by the filter UI come from the scoped set
//! *before* any filter is applied, so choosing a year never hides the others.

use crate::access::AccessScope;
use crate::commands::helpers::display_sheet;
use crate::commands::{CmdResult, DisplaySheet, FilterChoices};
use crate::error::Result;
use crate::model::Sheet;
use crate::query::{ListQuery, SelectedFilters};
use crate::store::DataStore;
use crate::tags::{tag_names, Tag};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

pub const PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct SheetPage {
    pub sheets: Vec<DisplaySheet>,
    /// 1-based number of this page after clamping
    pub number: usize,
    pub num_pages: usize,
    /// Matching records across all pages
    pub total_count: usize,
    pub has_other_pages: bool,
    pub has_previous: bool,
    pub has_next: bool,
    pub years: Vec<i32>,
    pub selected: SelectedFilters,
    pub choices: FilterChoices,
}

pub fn run<S: DataStore>(store: &S, scope: AccessScope, query: &ListQuery) -> Result<CmdResult> {
    let scoped = scope.narrow(store.list_sheets()?);
    let tags = store.list_tags()?;

    let years: Vec<i32> = scoped
        .iter()
        .filter_map(|s| s.publication_year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let needle = query.q.to_lowercase();
    let mut matching: Vec<Sheet> = scoped
        .into_iter()
        .filter(|s| matches_filters(s, query))
        .filter(|s| needle.is_empty() || matches_search(s, &tags, &needle))
        .collect();
    matching.sort_by(by_title);

    let total_count = matching.len();
    let num_pages = total_count.div_ceil(PAGE_SIZE).max(1);
    let number = query.page.clamp(1, num_pages);
    let sheets = matching
        .into_iter()
        .skip((number - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .map(|s| display_sheet(&tags, s))
        .collect();

    tracing::debug!(total_count, number, num_pages, "listed sheets");

    Ok(CmdResult::default().with_page(SheetPage {
        sheets,
        number,
        num_pages,
        total_count,
        has_other_pages: num_pages > 1,
        has_previous: number > 1,
        has_next: number < num_pages,
        years,
        selected: query.selected(),
        choices: FilterChoices::all(),
    }))
}

fn matches_filters(sheet: &Sheet, query: &ListQuery) -> bool {
    fn eq<T: PartialEq>(wanted: Option<T>, actual: Option<T>) -> bool {
        wanted.is_none() || wanted == actual
    }
    eq(query.cast, sheet.cast)
        && eq(query.season, sheet.season)
        && eq(query.liturgical_use, sheet.liturgical_use)
        && eq(query.genre, sheet.genre)
        && eq(query.difficulty, sheet.difficulty)
        && eq(query.year, sheet.publication_year)
}

/// `needle` must already be lowercased.
fn matches_search(sheet: &Sheet, tags: &[Tag], needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);
    let optional = |text: &Option<String>| text.as_deref().is_some_and(contains);

    contains(&sheet.title)
        || contains(&sheet.composer)
        || optional(&sheet.arranger)
        || optional(&sheet.publisher)
        || optional(&sheet.isbn)
        || optional(&sheet.description)
        || tag_names(tags, &sheet.tags).iter().any(|n| contains(n.as_str()))
}

fn by_title(a: &Sheet, b: &Sheet) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.date_created.cmp(&b.date_created))
}
