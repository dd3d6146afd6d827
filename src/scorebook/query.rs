//! Parsing of listing query parameters.
//!
//! The listing accepts a handful of optional parameters. Each one is parsed on
//! its own into an `Option`, with one rule for "no filter": the parameter is
//! absent, empty, or the literal `all`.
//!
//! | Parameter | Parsed as | Invalid input |
//! |-----------|-----------|---------------|
//! | `cast` `season` `liturgical_use` `genre` `difficulty` | code | `InvalidQuery` |
//! | `year` | integer publication year | `InvalidQuery` |
//! | `q` | trimmed search text, empty = no search | never |
//! | `page` | page number, clamped later | falls back to page 1 |

use crate::error::{CatalogError, Result};
use crate::model::{Cast, Classification, Difficulty, Genre, LiturgicalUse, Season};
use serde::Serialize;
use std::collections::HashMap;

/// Literal value meaning "do not filter on this field".
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub cast: Option<Cast>,
    pub season: Option<Season>,
    pub liturgical_use: Option<LiturgicalUse>,
    pub genre: Option<Genre>,
    pub difficulty: Option<Difficulty>,
    pub year: Option<i32>,
    /// Trimmed search text; empty means no search
    pub q: String,
    /// Requested page, 1-based, not yet clamped to the available pages
    pub page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            cast: None,
            season: None,
            liturgical_use: None,
            genre: None,
            difficulty: None,
            year: None,
            q: String::new(),
            page: 1,
        }
    }
}

/// The current filter state, echoed back for the filter UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFilters {
    pub cast: String,
    pub season: String,
    pub liturgical_use: String,
    pub genre: String,
    pub difficulty: String,
    pub year: String,
    pub q: String,
}

impl ListQuery {
    pub fn from_params<'a, I>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let params: HashMap<&str, &str> = params.into_iter().collect();
        let get = |key: &str| params.get(key).copied();

        let query = Self {
            cast: parse_filter(get(Cast::FIELD))?,
            season: parse_filter(get(Season::FIELD))?,
            liturgical_use: parse_filter(get(LiturgicalUse::FIELD))?,
            genre: parse_filter(get(Genre::FIELD))?,
            difficulty: parse_filter(get(Difficulty::FIELD))?,
            year: parse_year(get("year"))?,
            q: get("q").map(str::trim).unwrap_or_default().to_string(),
            page: parse_page(get("page")),
        };
        tracing::debug!(?query, "parsed listing query");
        Ok(query)
    }

    pub fn from_map(params: &HashMap<String, String>) -> Result<Self> {
        Self::from_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn has_search(&self) -> bool {
        !self.q.is_empty()
    }

    pub fn selected(&self) -> SelectedFilters {
        fn echo<C: Classification>(value: Option<C>) -> String {
            value.map(|c| c.code().to_string()).unwrap_or_else(|| ALL.to_string())
        }
        SelectedFilters {
            cast: echo(self.cast),
            season: echo(self.season),
            liturgical_use: echo(self.liturgical_use),
            genre: echo(self.genre),
            difficulty: echo(self.difficulty),
            year: self
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| ALL.to_string()),
            q: self.q.clone(),
        }
    }
}

/// `None` when the raw value means "no filter".
fn filter_value(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty() && *v != ALL)
}

fn parse_filter<C: Classification>(raw: Option<&str>) -> Result<Option<C>> {
    match filter_value(raw) {
        None => Ok(None),
        Some(code) => C::from_code(code).map(Some).ok_or_else(|| {
            CatalogError::InvalidQuery(format!("unknown {} '{}'", C::FIELD, code))
        }),
    }
}

fn parse_year(raw: Option<&str>) -> Result<Option<i32>> {
    match filter_value(raw) {
        None => Ok(None),
        Some(value) => value
            .parse::<i32>()
            .map(Some)
            .map_err(|_| CatalogError::InvalidQuery(format!("year '{}' is not a number", value))),
    }
}

/// Non-numeric input means the first page; numbers too large to represent
/// mean "as far as possible" and end up clamped to the last page.
fn parse_page(raw: Option<&str>) -> usize {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return 1;
    };
    match value.parse::<i64>() {
        Ok(n) if n < 1 => 1,
        Ok(n) => usize::try_from(n).unwrap_or(usize::MAX),
        Err(_) if value.chars().all(|c| c.is_ascii_digit()) => usize::MAX,
        Err(_) => 1,
    }
}
