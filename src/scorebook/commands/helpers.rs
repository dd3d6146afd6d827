use crate::access::AccessScope;
use crate::commands::DisplaySheet;
use crate::error::{CatalogError, Result};
use crate::model::{BlobRef, Sheet};
use crate::store::blob::BlobStore;
use crate::store::DataStore;
use crate::tags::{tag_names, Tag};
use uuid::Uuid;

pub fn display_sheet(tags: &[Tag], sheet: Sheet) -> DisplaySheet {
    let names = tag_names(tags, &sheet.tags);
    DisplaySheet {
        sheet,
        tag_names: names,
    }
}

pub fn load_display_sheet<S: DataStore>(store: &S, sheet: Sheet) -> Result<DisplaySheet> {
    let tags = store.list_tags()?;
    Ok(display_sheet(&tags, sheet))
}

/// Fails with `Forbidden` when the scope does not admit the sheet.
pub fn ensure_visible(scope: AccessScope, sheet: &Sheet) -> Result<()> {
    if scope.admits(sheet) {
        Ok(())
    } else {
        Err(CatalogError::Forbidden(format!(
            "sheet '{}' is not public",
            sheet.title
        )))
    }
}

/// Loads a sheet by id, enforcing existence and scope.
pub fn sheet_in_scope<S: DataStore>(store: &S, scope: AccessScope, id: &Uuid) -> Result<Sheet> {
    let sheet = store.get_sheet(id)?;
    ensure_visible(scope, &sheet)?;
    Ok(sheet)
}

/// Removes blobs that are no longer referenced. Failures are logged only.
pub fn discard_blobs<B: BlobStore>(blobs: &mut B, stale: &[BlobRef]) {
    for blob in stale {
        if let Err(e) = blobs.remove(blob) {
            tracing::warn!(key = %blob.key, error = %e, "failed to remove attachment");
        }
    }
}
