use crate::access::{AccessScope, Caller};
use crate::commands::helpers::{discard_blobs, load_display_sheet, sheet_in_scope};
use crate::commands::{Attachments, CmdMessage, CmdResult};
use crate::error::{CatalogError, Result};
use crate::form::SheetForm;
use crate::model::BlobRef;
use crate::slug::save_with_slug;
use crate::store::blob::{BlobKind, BlobStore, Upload};
use crate::store::DataStore;
use crate::tags::normalize_tags;
use uuid::Uuid;

/// Replaces the editable fields of an existing sheet.
///
/// Tags are replaced wholesale, so an empty tag input clears them. Attachments
/// are only replaced when a new upload is given. The slug is never touched.
///
/// New uploads always land under fresh keys, so the old attachments stay
/// intact until the record pointing at the new ones is saved.
pub fn run<S: DataStore, B: BlobStore>(
    store: &mut S,
    blobs: &mut B,
    scope: AccessScope,
    caller: &Caller,
    id: &Uuid,
    form: &SheetForm,
    files: Attachments<'_>,
) -> Result<CmdResult> {
    let mut sheet = sheet_in_scope(store, scope, id)?;
    let fields = form.validate().map_err(CatalogError::Validation)?;

    let mut fresh: Vec<BlobRef> = Vec::new();
    let mut replaced: Vec<BlobRef> = Vec::new();

    if let Some(upload) = files.sheet_file {
        let blob = put_or_rollback(blobs, id, BlobKind::SheetFile, upload, &fresh)?;
        fresh.push(blob.clone());
        replaced.push(std::mem::replace(&mut sheet.sheet_file, blob));
    }
    if let Some(upload) = files.preview_image {
        let blob = put_or_rollback(blobs, id, BlobKind::PreviewImage, upload, &fresh)?;
        fresh.push(blob.clone());
        replaced.extend(sheet.preview_image.replace(blob));
    }

    fields.apply_to(&mut sheet);
    let saved = normalize_tags(store, &fields.tags).and_then(|tags| {
        sheet.tags = tags;
        sheet.touch(&caller.username);
        save_with_slug(store, &mut sheet)
    });
    if let Err(e) = saved {
        discard_blobs(blobs, &fresh);
        return Err(e);
    }
    discard_blobs(blobs, &replaced);

    tracing::info!(id = %sheet.id, user = %caller.username, "sheet updated");

    let mut result = CmdResult::default().with_affected_sheet(load_display_sheet(store, sheet)?);
    result.add_message(CmdMessage::success(format!(
        "Successfully updated '{}'",
        fields.title
    )));
    Ok(result)
}

fn put_or_rollback<B: BlobStore>(
    blobs: &mut B,
    owner: &Uuid,
    kind: BlobKind,
    upload: &Upload,
    fresh: &[BlobRef],
) -> Result<BlobRef> {
    blobs.put(owner, kind, upload).inspect_err(|_| {
        discard_blobs(blobs, fresh);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::model::Sheet;
    use crate::store::blob::MemBlobStore;
    use crate::store::memory::InMemoryStore;
    use crate::tags::Tag;

    /// Accepts everything except sheet writes.
    struct ReadOnlySheets {
        inner: InMemoryStore,
    }

    impl DataStore for ReadOnlySheets {
        fn save_sheet(&mut self, _sheet: &Sheet) -> Result<()> {
            Err(CatalogError::Io(std::io::Error::other("disk full")))
        }
        fn get_sheet(&self, id: &Uuid) -> Result<Sheet> {
            self.inner.get_sheet(id)
        }
        fn list_sheets(&self) -> Result<Vec<Sheet>> {
            self.inner.list_sheets()
        }
        fn delete_sheet(&mut self, id: &Uuid) -> Result<Sheet> {
            self.inner.delete_sheet(id)
        }
        fn list_tags(&self) -> Result<Vec<Tag>> {
            self.inner.list_tags()
        }
        fn save_tag(&mut self, tag: &Tag) -> Result<()> {
            self.inner.save_tag(tag)
        }
    }

    struct Setup {
        store: InMemoryStore,
        blobs: MemBlobStore,
        sheet: Sheet,
    }

    fn base_form() -> SheetForm {
        SheetForm {
            title: "Ave Maria".into(),
            composer: "Arcadelt".into(),
            tags: "Marian, SATB".into(),
            ..Default::default()
        }
    }

    fn setup() -> Setup {
        let mut store = InMemoryStore::new();
        let mut blobs = MemBlobStore::new();
        let upload = Upload::new("ave.pdf", b"v1".to_vec());
        let result = create::run(
            &mut store,
            &mut blobs,
            &Caller::member("jana"),
            &base_form(),
            Attachments {
                sheet_file: Some(&upload),
                preview_image: None,
            },
        )
        .unwrap();
        let sheet = result.sheet().unwrap().sheet.clone();
        Setup { store, blobs, sheet }
    }

    #[test]
    fn updates_fields_and_keeps_slug() {
        let mut s = setup();
        let form = SheetForm {
            title: "Salve Regina".into(),
            publication_year: "1700".into(),
            ..base_form()
        };

        let result = run(
            &mut s.store,
            &mut s.blobs,
            AccessScope::All,
            &Caller::member("petr"),
            &s.sheet.id,
            &form,
            Attachments::default(),
        )
        .unwrap();

        let updated = &result.sheet().unwrap().sheet;
        assert_eq!(updated.title, "Salve Regina");
        assert_eq!(updated.slug.as_deref(), Some("ave-maria"));
        assert_eq!(updated.publication_year, Some(1700));
        assert_eq!(updated.created_by, "jana");
        assert_eq!(updated.modified_by, "petr");
        assert!(updated.date_modified >= s.sheet.date_modified);
        assert_eq!(updated.sheet_file, s.sheet.sheet_file);
        assert_eq!(result.messages[0].content, "Successfully updated 'Salve Regina'");
    }

    #[test]
    fn empty_tag_input_clears_tags() {
        let mut s = setup();
        assert_eq!(s.sheet.tags.len(), 2);
        let form = SheetForm {
            tags: String::new(),
            ..base_form()
        };

        run(
            &mut s.store,
            &mut s.blobs,
            AccessScope::All,
            &Caller::member("jana"),
            &s.sheet.id,
            &form,
            Attachments::default(),
        )
        .unwrap();

        assert!(s.store.get_sheet(&s.sheet.id).unwrap().tags.is_empty());
        // Tag rows themselves stay
        assert_eq!(s.store.list_tags().unwrap().len(), 2);
    }

    #[test]
    fn new_upload_replaces_the_old_file() {
        let mut s = setup();
        let old_key = s.sheet.sheet_file.key.clone();
        let upload = Upload::new("ave-revised.pdf", b"v2".to_vec());

        let result = run(
            &mut s.store,
            &mut s.blobs,
            AccessScope::All,
            &Caller::member("jana"),
            &s.sheet.id,
            &base_form(),
            Attachments {
                sheet_file: Some(&upload),
                preview_image: None,
            },
        )
        .unwrap();

        let new_key = &result.sheet().unwrap().sheet.sheet_file.key;
        assert_ne!(new_key, &old_key);
        assert!(s.blobs.get(&old_key).is_none());
        assert_eq!(s.blobs.get(new_key), Some(&b"v2"[..]));
    }

    #[test]
    fn same_file_name_gets_a_new_blob() {
        let mut s = setup();
        let old_key = s.sheet.sheet_file.key.clone();
        let upload = Upload::new("ave.pdf", b"v2".to_vec());

        let result = run(
            &mut s.store,
            &mut s.blobs,
            AccessScope::All,
            &Caller::member("jana"),
            &s.sheet.id,
            &base_form(),
            Attachments {
                sheet_file: Some(&upload),
                preview_image: None,
            },
        )
        .unwrap();

        let new_file = &result.sheet().unwrap().sheet.sheet_file;
        assert_eq!(new_file.file_name, "ave.pdf");
        assert_ne!(new_file.key, old_key);
        assert_eq!(s.blobs.get(&new_file.key), Some(&b"v2"[..]));
        assert!(s.blobs.get(&old_key).is_none());
        assert_eq!(s.blobs.len(), 1);
    }

    #[test]
    fn failed_save_keeps_the_old_attachment() {
        let s = setup();
        let mut store = ReadOnlySheets { inner: s.store };
        let mut blobs = s.blobs;
        let upload = Upload::new("ave.pdf", b"v2".to_vec());

        let err = run(
            &mut store,
            &mut blobs,
            AccessScope::All,
            &Caller::member("jana"),
            &s.sheet.id,
            &base_form(),
            Attachments {
                sheet_file: Some(&upload),
                preview_image: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));

        let stored = store.get_sheet(&s.sheet.id).unwrap();
        assert_eq!(stored.sheet_file, s.sheet.sheet_file);
        assert_eq!(blobs.get(&stored.sheet_file.key), Some(&b"v1"[..]));
        assert_eq!(blobs.len(), 1);
    }

    #[test]
    fn private_sheet_outside_scope_is_forbidden() {
        let mut s = setup();
        let err = run(
            &mut s.store,
            &mut s.blobs,
            AccessScope::PublicOnly,
            &Caller::member("guest"),
            &s.sheet.id,
            &base_form(),
            Attachments::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut s = setup();
        let err = run(
            &mut s.store,
            &mut s.blobs,
            AccessScope::All,
            &Caller::member("jana"),
            &Uuid::new_v4(),
            &base_form(),
            Attachments::default(),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn invalid_form_leaves_record_untouched() {
        let mut s = setup();
        let form = SheetForm {
            difficulty: "10".into(),
            ..base_form()
        };
        let err = run(
            &mut s.store,
            &mut s.blobs,
            AccessScope::All,
            &Caller::member("jana"),
            &s.sheet.id,
            &form,
            Attachments::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(s.store.get_sheet(&s.sheet.id).unwrap(), s.sheet);
    }
}
