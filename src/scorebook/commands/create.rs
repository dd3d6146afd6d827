use crate::access::Caller;
use crate::commands::helpers::{discard_blobs, load_display_sheet};
use crate::commands::{Attachments, CmdMessage, CmdResult};
use crate::error::{CatalogError, Result};
use crate::form::{SheetFields, SheetForm, REQUIRED};
use crate::model::{BlobRef, Sheet};
use crate::slug::save_with_slug;
use crate::store::blob::{BlobKind, BlobStore};
use crate::store::DataStore;
use crate::tags::normalize_tags;
use uuid::Uuid;

pub fn run<S: DataStore, B: BlobStore>(
    store: &mut S,
    blobs: &mut B,
    caller: &Caller,
    form: &SheetForm,
    files: Attachments<'_>,
) -> Result<CmdResult> {
    let (fields, upload) = match (form.validate(), files.sheet_file) {
        (Ok(fields), Some(upload)) => (fields, upload),
        (validated, _) => {
            let mut errors = validated.err().unwrap_or_default();
            if files.sheet_file.is_none() {
                errors.add("sheet_file", REQUIRED);
            }
            return Err(CatalogError::Validation(errors));
        }
    };

    let id = Uuid::new_v4();
    let sheet_file = blobs.put(&id, BlobKind::SheetFile, upload)?;
    let mut uploaded = vec![sheet_file.clone()];

    let preview_image = match files.preview_image {
        Some(preview) => match blobs.put(&id, BlobKind::PreviewImage, preview) {
            Ok(blob) => {
                uploaded.push(blob.clone());
                Some(blob)
            }
            Err(e) => {
                discard_blobs(blobs, &uploaded);
                return Err(e);
            }
        },
        None => None,
    };

    let mut sheet = Sheet::new(
        fields.title.clone(),
        fields.composer.clone(),
        caller.username.clone(),
        sheet_file,
    );
    sheet.id = id;
    sheet.preview_image = preview_image;

    if let Err(e) = persist(store, &mut sheet, &fields) {
        discard_blobs(blobs, &uploaded);
        return Err(e);
    }

    tracing::info!(id = %sheet.id, slug = ?sheet.slug, user = %caller.username, "sheet created");

    let mut result = CmdResult::default().with_affected_sheet(load_display_sheet(store, sheet)?);
    result.add_message(CmdMessage::success(format!(
        "Successfully added '{}'",
        fields.title
    )));
    Ok(result)
}

fn persist<S: DataStore>(store: &mut S, sheet: &mut Sheet, fields: &SheetFields) -> Result<()> {
    fields.apply_to(sheet);
    sheet.tags = normalize_tags(store, &fields.tags)?;
    save_with_slug(store, sheet)
}

/// The attachments a sheet currently references.
pub(crate) fn attached_blobs(sheet: &Sheet) -> Vec<BlobRef> {
    std::iter::once(sheet.sheet_file.clone())
        .chain(sheet.preview_image.clone())
        .collect()
}
