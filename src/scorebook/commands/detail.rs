use crate::access::AccessScope;
use crate::commands::helpers::{ensure_visible, load_display_sheet, sheet_in_scope};
use crate::commands::{CmdResult, FilterChoices};
use crate::error::{CatalogError, Result};
use crate::slug::save_with_slug;
use crate::store::DataStore;
use uuid::Uuid;

/// Looks a sheet up by its slug.
pub fn by_slug<S: DataStore>(store: &S, scope: AccessScope, slug: &str) -> Result<CmdResult> {
    let sheet = store
        .find_by_slug(slug)?
        .ok_or_else(|| CatalogError::SlugNotFound(slug.to_string()))?;
    ensure_visible(scope, &sheet)?;
    Ok(CmdResult::default().with_affected_sheet(load_display_sheet(store, sheet)?))
}

/// Looks a sheet up by id, the addressing scheme of old links.
///
/// Records created before slugs existed get one assigned here, so the caller
/// can redirect to the canonical slug address.
pub fn by_id<S: DataStore>(store: &mut S, scope: AccessScope, id: &Uuid) -> Result<CmdResult> {
    let mut sheet = sheet_in_scope(store, scope, id)?;
    if sheet.slug.is_none() {
        save_with_slug(store, &mut sheet)?;
        if let Some(slug) = &sheet.slug {
            tracing::info!(id = %sheet.id, %slug, "backfilled slug");
        }
    }
    Ok(CmdResult::default().with_affected_sheet(load_display_sheet(store, sheet)?))
}

/// The current record plus the form choices, for pre-filling an edit page.
pub fn for_edit<S: DataStore>(store: &S, scope: AccessScope, id: &Uuid) -> Result<CmdResult> {
    let sheet = sheet_in_scope(store, scope, id)?;
    Ok(CmdResult::default()
        .with_affected_sheet(load_display_sheet(store, sheet)?)
        .with_choices(FilterChoices::all()))
}
