//! Tag support.
//!
//! Tags are free-text labels shared by many sheets. Users type them as one
//! comma-separated string (`"Advent, alto solo, SATB"`); the normalizer turns
//! that string into a set of tag ids.
//!
//! ## Normalization Rules
//!
//! 1. Split on `,`, trim every piece, drop empty pieces.
//! 2. Look each name up **case-insensitively** among existing tags. A hit is
//!    reused as-is, keeping the casing it was first stored with.
//! 3. A miss creates a new tag with the casing exactly as submitted.
//! 4. The result never holds the same tag twice, so `"Alto, alto, ALTO"`
//!    yields a single tag.
//!
//! An empty input yields an empty set. On edit that clears the sheet's tags.
//!
//! Tag rows are never deleted together with a sheet.

use crate::error::{CatalogError, Result};
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Splits raw comma-separated input into distinct names, first casing wins.
pub fn parse_tag_input(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for piece in raw.split(',') {
        let name = piece.trim();
        if name.is_empty() {
            continue;
        }
        let folded = name.to_lowercase();
        if !names.iter().any(|n| n.to_lowercase() == folded) {
            names.push(name.to_string());
        }
    }
    names
}

/// Resolves raw tag input to tag ids, creating tags that do not exist yet.
pub fn normalize_tags<S: DataStore>(store: &mut S, raw: &str) -> Result<Vec<Uuid>> {
    let names = parse_tag_input(raw);
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut known = store.list_tags()?;
    let mut ids = Vec::with_capacity(names.len());

    for name in names {
        let id = match known.iter().find(|t| t.matches(&name)) {
            Some(existing) => existing.id,
            None => {
                let tag = Tag::new(name.clone());
                match store.save_tag(&tag) {
                    Ok(()) => {
                        tracing::debug!(tag = %tag.name, "created tag");
                        let id = tag.id;
                        known.push(tag);
                        id
                    }
                    // Someone else created it in the meantime; reuse theirs
                    Err(CatalogError::TagConflict(_)) => {
                        known = store.list_tags()?;
                        known
                            .iter()
                            .find(|t| t.matches(&name))
                            .map(|t| t.id)
                            .ok_or(CatalogError::TagConflict(name))?
                    }
                    Err(e) => return Err(e),
                }
            }
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

/// Tag names for a list of ids, in the order given. Unknown ids are skipped.
pub fn tag_names(tags: &[Tag], ids: &[Uuid]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| tags.iter().find(|t| &t.id == id))
        .map(|t| t.name.clone())
        .collect()
}
