//! # Slug Assignment
//!
//! Every sheet gets a human-readable, URL-safe identifier derived from its title
//! (`"Ave Maria"` → `ave-maria`). Slugs are unique across the catalog and never
//! change once assigned, even if the title is edited later.
//!
//! ## Algorithm
//!
//! 1. If the sheet already has a slug, keep it.
//! 2. `base = slugify(title)`.
//! 3. If no *other* sheet uses `base`, take it.
//! 4. Otherwise try `base-2`, `base-3`, … and take the first free candidate.
//!
//! A title without any letters or digits yields an empty base; such a sheet
//! stays unslugged and is reachable through its id only.
//!
//! ## Races
//!
//! The search reads store state and the write happens afterwards, so two writers
//! with the same title could compute the same candidate. Stores reject a write
//! whose slug is taken by another sheet ([`CatalogError::SlugConflict`]), and
//! [`save_with_slug`] answers that by searching again against fresh state.

use crate::error::{CatalogError, Result};
use crate::model::Sheet;
use crate::store::DataStore;
use std::collections::HashSet;
use uuid::Uuid;

/// Upper bound on save attempts when the store keeps reporting slug conflicts.
pub const MAX_SLUG_ATTEMPTS: usize = 32;

/// Lowercase ASCII slug: diacritics folded, every run of other characters
/// collapsed to a single hyphen, no leading or trailing hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        let mut buf = [0u8; 4];
        let piece: &str = if ch.is_ascii_alphanumeric() {
            ch.to_ascii_lowercase().encode_utf8(&mut buf)
        } else if let Some(folded) = fold_diacritic(ch) {
            folded
        } else {
            pending_dash = true;
            continue;
        };
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push_str(piece);
    }

    slug
}

/// ASCII spelling of common accented Latin letters, lowercased.
fn fold_diacritic(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ą' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' | 'Ą' => "a",
        'č' | 'ć' | 'ç' | 'Č' | 'Ć' | 'Ç' => "c",
        'ď' | 'Ď' | 'đ' | 'Đ' => "d",
        'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ę' | 'É' | 'È' | 'Ê' | 'Ë' | 'Ě' | 'Ę' => "e",
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => "i",
        'ľ' | 'ĺ' | 'ł' | 'Ľ' | 'Ĺ' | 'Ł' => "l",
        'ň' | 'ń' | 'ñ' | 'Ň' | 'Ń' | 'Ñ' => "n",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ő' | 'ø' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ő' | 'Ø' => "o",
        'ř' | 'ŕ' | 'Ř' | 'Ŕ' => "r",
        'š' | 'ś' | 'Š' | 'Ś' => "s",
        'ß' => "ss",
        'ť' | 'Ť' => "t",
        'ú' | 'ù' | 'û' | 'ü' | 'ů' | 'ű' | 'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ů' | 'Ű' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ž' | 'ź' | 'ż' | 'Ž' | 'Ź' | 'Ż' => "z",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        _ => return None,
    };
    Some(folded)
}

/// First free slug among `base`, `base-2`, `base-3`, … ignoring `own_id`.
pub fn unique_slug<S: DataStore>(store: &S, base: &str, own_id: &Uuid) -> Result<String> {
    let taken: HashSet<String> = store
        .list_sheets()?
        .into_iter()
        .filter(|s| &s.id != own_id)
        .filter_map(|s| s.slug)
        .collect();

    if !taken.contains(base) {
        return Ok(base.to_string());
    }
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !taken.contains(&candidate) {
            tracing::debug!(%base, %candidate, "slug base taken, using suffix");
            return Ok(candidate);
        }
        suffix += 1;
    }
}

/// Fills in `sheet.slug` if it is unset and the title yields a base.
///
/// Returns whether a slug was assigned by this call.
pub fn assign_slug<S: DataStore>(store: &S, sheet: &mut Sheet) -> Result<bool> {
    if sheet.slug.is_some() {
        return Ok(false);
    }
    let base = slugify(&sheet.title);
    if base.is_empty() {
        return Ok(false);
    }
    sheet.slug = Some(unique_slug(store, &base, &sheet.id)?);
    Ok(true)
}

/// Assigns a slug if needed and persists the sheet, searching again when the
/// store reports that the chosen slug was taken in the meantime.
pub fn save_with_slug<S: DataStore>(store: &mut S, sheet: &mut Sheet) -> Result<()> {
    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let assigned = assign_slug(store, sheet)?;
        match store.save_sheet(sheet) {
            Ok(()) => return Ok(()),
            Err(CatalogError::SlugConflict(slug)) if assigned => {
                tracing::warn!(%slug, attempt, "slug taken concurrently, retrying");
                sheet.slug = None;
            }
            Err(e) => return Err(e),
        }
    }
    Err(CatalogError::SlugConflict(slugify(&sheet.title)))
}
