use crate::access::{AccessScope, Caller};
use crate::commands::create::attached_blobs;
use crate::commands::helpers::{discard_blobs, display_sheet, sheet_in_scope};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::blob::BlobStore;
use crate::store::DataStore;
use uuid::Uuid;

pub fn run<S: DataStore, B: BlobStore>(
    store: &mut S,
    blobs: &mut B,
    scope: AccessScope,
    caller: &Caller,
    id: &Uuid,
) -> Result<CmdResult> {
    sheet_in_scope(store, scope, id)?;
    let tags = store.list_tags()?;
    let sheet = store.delete_sheet(id)?;
    discard_blobs(blobs, &attached_blobs(&sheet));

    tracing::info!(id = %sheet.id, user = %caller.username, "sheet deleted");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Successfully deleted '{}'",
        sheet.title
    )));
    Ok(result.with_affected_sheet(display_sheet(&tags, sheet)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, Attachments};
    use crate::error::CatalogError;
    use crate::form::SheetForm;
    use crate::store::blob::{MemBlobStore, Upload};
    use crate::store::memory::InMemoryStore;

    fn created(store: &mut InMemoryStore, blobs: &mut MemBlobStore, public: bool) -> Uuid {
        let form = SheetForm {
            title: "Ave Maria".into(),
            composer: "Arcadelt".into(),
            tags: "Marian".into(),
            public,
            ..Default::default()
        };
        let upload = Upload::new("ave.pdf", vec![1, 2, 3]);
        let preview = Upload::new("ave.png", vec![4]);
        let files = Attachments {
            sheet_file: Some(&upload),
            preview_image: Some(&preview),
        };
        create::run(store, blobs, &Caller::member("jana"), &form, files)
            .unwrap()
            .sheet()
            .unwrap()
            .sheet
            .id
    }

    #[test]
    fn removes_record_and_attachments_but_keeps_tags() {
        let mut store = InMemoryStore::new();
        let mut blobs = MemBlobStore::new();
        let id = created(&mut store, &mut blobs, false);
        assert_eq!(blobs.len(), 2);

        let result = run(&mut store, &mut blobs, AccessScope::All, &Caller::member("jana"), &id)
            .unwrap();

        assert_eq!(result.messages[0].content, "Successfully deleted 'Ave Maria'");
        assert_eq!(result.sheet().unwrap().tag_names, vec!["Marian"]);
        assert!(store.get_sheet(&id).unwrap_err().is_not_found());
        assert!(blobs.is_empty());
        assert_eq!(store.list_tags().unwrap().len(), 1);
    }

    #[test]
    fn private_sheet_is_protected_from_public_scope() {
        let mut store = InMemoryStore::new();
        let mut blobs = MemBlobStore::new();
        let id = created(&mut store, &mut blobs, false);

        let err = run(
            &mut store,
            &mut blobs,
            AccessScope::PublicOnly,
            &Caller::member("guest"),
            &id,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));
        assert!(store.get_sheet(&id).is_ok());
        assert_eq!(blobs.len(), 2);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut store = InMemoryStore::new();
        let mut blobs = MemBlobStore::new();
        let err = run(
            &mut store,
            &mut blobs,
            AccessScope::All,
            &Caller::member("jana"),
            &Uuid::new_v4(),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }
}
