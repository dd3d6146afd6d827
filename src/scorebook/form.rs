//! Validation of submitted sheet forms.
//!
//! A [`SheetForm`] holds what the client sent, as raw strings. [`SheetForm::validate`]
//! either produces typed [`SheetFields`] or a [`ValidationErrors`] map keyed by
//! field name. Validation errors are meant to be shown next to the form, which is
//! re-rendered with the original input; they are never fatal.

use crate::model::{Cast, Classification, Difficulty, Genre, LiturgicalUse, Season, Sheet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";
pub const INVALID_NUMBER: &str = "Enter a whole number.";

const MAX_TEXT_LEN: usize = 200;
const MAX_ISBN_LEN: usize = 20;

/// Field-keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Raw form input. Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetForm {
    pub title: String,
    pub composer: String,
    pub arranger: String,
    pub cast: String,
    pub season: String,
    pub liturgical_use: String,
    pub genre: String,
    pub difficulty: String,
    pub publication_year: String,
    pub publisher: String,
    pub isbn: String,
    pub description: String,
    /// Comma-separated tag names
    pub tags: String,
    pub public: bool,
}

/// Validated form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetFields {
    pub title: String,
    pub composer: String,
    pub arranger: Option<String>,
    pub cast: Option<Cast>,
    pub season: Option<Season>,
    pub liturgical_use: Option<LiturgicalUse>,
    pub genre: Option<Genre>,
    pub difficulty: Option<Difficulty>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub public: bool,
    /// Raw tag input, resolved later by the tag normalizer
    pub tags: String,
}

impl SheetForm {
    /// Pre-fills a form from an existing sheet, e.g. for the edit page.
    pub fn from_sheet(sheet: &Sheet, tag_names: &[String]) -> Self {
        fn code<C: Classification>(value: Option<C>) -> String {
            value.map(|c| c.code().to_string()).unwrap_or_default()
        }
        Self {
            title: sheet.title.clone(),
            composer: sheet.composer.clone(),
            arranger: sheet.arranger.clone().unwrap_or_default(),
            cast: code(sheet.cast),
            season: code(sheet.season),
            liturgical_use: code(sheet.liturgical_use),
            genre: code(sheet.genre),
            difficulty: code(sheet.difficulty),
            publication_year: sheet
                .publication_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
            publisher: sheet.publisher.clone().unwrap_or_default(),
            isbn: sheet.isbn.clone().unwrap_or_default(),
            description: sheet.description.clone().unwrap_or_default(),
            tags: tag_names.join(", "),
            public: sheet.public,
        }
    }

    pub fn validate(&self) -> Result<SheetFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = required(&mut errors, "title", &self.title);
        let composer = required(&mut errors, "composer", &self.composer);
        let arranger = optional(&mut errors, "arranger", &self.arranger, MAX_TEXT_LEN);
        let publisher = optional(&mut errors, "publisher", &self.publisher, MAX_TEXT_LEN);
        let isbn = optional(&mut errors, "isbn", &self.isbn, MAX_ISBN_LEN);
        let description = non_empty(&self.description);

        let cast = choice::<Cast>(&mut errors, &self.cast);
        let season = choice::<Season>(&mut errors, &self.season);
        let liturgical_use = choice::<LiturgicalUse>(&mut errors, &self.liturgical_use);
        let genre = choice::<Genre>(&mut errors, &self.genre);
        let difficulty = choice::<Difficulty>(&mut errors, &self.difficulty);

        let publication_year = match non_empty(&self.publication_year) {
            None => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(year) => Some(year),
                Err(_) => {
                    errors.add("publication_year", INVALID_NUMBER);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SheetFields {
            title,
            composer,
            arranger,
            cast,
            season,
            liturgical_use,
            genre,
            difficulty,
            publication_year,
            publisher,
            isbn,
            description,
            public: self.public,
            tags: self.tags.clone(),
        })
    }
}

impl SheetFields {
    /// Copies every scalar field onto `sheet`. Tags, files, slug and audit
    /// fields are handled by the caller.
    pub fn apply_to(&self, sheet: &mut Sheet) {
        sheet.title = self.title.clone();
        sheet.composer = self.composer.clone();
        sheet.arranger = self.arranger.clone();
        sheet.cast = self.cast;
        sheet.season = self.season;
        sheet.liturgical_use = self.liturgical_use;
        sheet.genre = self.genre;
        sheet.difficulty = self.difficulty;
        sheet.publication_year = self.publication_year;
        sheet.publisher = self.publisher.clone();
        sheet.isbn = self.isbn.clone();
        sheet.description = self.description.clone();
        sheet.public = self.public;
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn too_long(max: usize) -> String {
    format!("Ensure this value has at most {} characters.", max)
}

fn required(errors: &mut ValidationErrors, field: &str, raw: &str) -> String {
    match non_empty(raw) {
        None => {
            errors.add(field, REQUIRED);
            String::new()
        }
        Some(value) => {
            if value.chars().count() > MAX_TEXT_LEN {
                errors.add(field, too_long(MAX_TEXT_LEN));
            }
            value
        }
    }
}

fn optional(errors: &mut ValidationErrors, field: &str, raw: &str, max: usize) -> Option<String> {
    let value = non_empty(raw)?;
    if value.chars().count() > max {
        errors.add(field, too_long(max));
    }
    Some(value)
}

fn choice<C: Classification>(errors: &mut ValidationErrors, raw: &str) -> Option<C> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = C::from_code(raw);
    if parsed.is_none() {
        errors.add(C::FIELD, INVALID_CHOICE);
    }
    parsed
}
