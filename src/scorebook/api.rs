//! # API Facade
//!
//! The API layer is a thin facade over the command layer and the single entry
//! point for every catalog operation, whether it comes from the HTTP service or
//! the CLI.
//!
//! The facade:
//! - **Resolves scope** from the [`Caller`] once per call, using the configured
//!   editor group, so no command ever sees raw role flags
//! - **Dispatches** to the matching `commands::*::run`
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no I/O of its own and formats nothing.
//!
//! `CatalogApi<S, B>` is generic over both the record store and the blob store:
//! production runs `CatalogApi<FileStore, FsBlobStore>`, tests run
//! `CatalogApi<InMemoryStore, MemBlobStore>`.

use crate::access::{AccessScope, Caller};
use crate::commands::{self, Attachments, CmdResult};
use crate::error::Result;
use crate::form::SheetForm;
use crate::query::ListQuery;
use crate::store::blob::BlobStore;
use crate::store::DataStore;
use uuid::Uuid;

pub struct CatalogApi<S: DataStore, B: BlobStore> {
    store: S,
    blobs: B,
    editor_group: String,
}

impl<S: DataStore, B: BlobStore> CatalogApi<S, B> {
    pub fn new(store: S, blobs: B, editor_group: impl Into<String>) -> Self {
        Self {
            store,
            blobs,
            editor_group: editor_group.into(),
        }
    }

    pub fn scope_for(&self, caller: &Caller) -> AccessScope {
        AccessScope::resolve(caller, &self.editor_group)
    }

    pub fn list_sheets(&self, caller: &Caller, query: &ListQuery) -> Result<CmdResult> {
        commands::list::run(&self.store, self.scope_for(caller), query)
    }

    pub fn create_sheet(
        &mut self,
        caller: &Caller,
        form: &SheetForm,
        files: Attachments<'_>,
    ) -> Result<CmdResult> {
        commands::create::run(&mut self.store, &mut self.blobs, caller, form, files)
    }

    pub fn update_sheet(
        &mut self,
        caller: &Caller,
        id: &Uuid,
        form: &SheetForm,
        files: Attachments<'_>,
    ) -> Result<CmdResult> {
        let scope = self.scope_for(caller);
        commands::update::run(&mut self.store, &mut self.blobs, scope, caller, id, form, files)
    }

    pub fn delete_sheet(&mut self, caller: &Caller, id: &Uuid) -> Result<CmdResult> {
        let scope = self.scope_for(caller);
        commands::delete::run(&mut self.store, &mut self.blobs, scope, caller, id)
    }

    pub fn sheet_by_slug(&self, caller: &Caller, slug: &str) -> Result<CmdResult> {
        commands::detail::by_slug(&self.store, self.scope_for(caller), slug)
    }

    /// Legacy id lookup; assigns a slug to records that lack one.
    pub fn sheet_by_id(&mut self, caller: &Caller, id: &Uuid) -> Result<CmdResult> {
        let scope = self.scope_for(caller);
        commands::detail::by_id(&mut self.store, scope, id)
    }

    pub fn sheet_for_edit(&self, caller: &Caller, id: &Uuid) -> Result<CmdResult> {
        commands::detail::for_edit(&self.store, self.scope_for(caller), id)
    }

    pub fn tags(&self, caller: &Caller) -> Result<CmdResult> {
        commands::tags::run(&self.store, self.scope_for(caller))
    }

    pub fn choices(&self) -> CmdResult {
        commands::choices::run()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DEFAULT_EDITOR_GROUP;
    use crate::error::CatalogError;
    use crate::store::blob::{MemBlobStore, Upload};
    use crate::store::memory::InMemoryStore;

    fn api() -> CatalogApi<InMemoryStore, MemBlobStore> {
        CatalogApi::new(InMemoryStore::new(), MemBlobStore::new(), DEFAULT_EDITOR_GROUP)
    }

    fn form(public: bool) -> SheetForm {
        SheetForm {
            title: "Ave Maria".into(),
            composer: "Arcadelt".into(),
            public,
            ..Default::default()
        }
    }

    fn add(api: &mut CatalogApi<InMemoryStore, MemBlobStore>, public: bool) -> Uuid {
        let upload = Upload::new("ave.pdf", vec![1]);
        let files = Attachments {
            sheet_file: Some(&upload),
            preview_image: None,
        };
        api.create_sheet(&Caller::member("jana"), &form(public), files)
            .unwrap()
            .sheet()
            .unwrap()
            .sheet
            .id
    }

    #[test]
    fn scope_follows_configured_editor_group() {
        let api = CatalogApi::new(InMemoryStore::new(), MemBlobStore::new(), "cantors");
        let cantor = Caller::member("a").with_groups(["cantors"]);
        let editor = Caller::member("b").with_groups([DEFAULT_EDITOR_GROUP]);
        assert_eq!(api.scope_for(&cantor), AccessScope::All);
        assert_eq!(api.scope_for(&editor), AccessScope::PublicOnly);
    }

    #[test]
    fn list_dispatches_with_caller_scope() {
        let mut api = api();
        add(&mut api, false);
        add(&mut api, true);

        let member = Caller::member("guest");
        let editor = Caller::member("ed").with_groups([DEFAULT_EDITOR_GROUP]);
        let query = ListQuery::default();
        assert_eq!(api.list_sheets(&member, &query).unwrap().page.unwrap().total_count, 1);
        assert_eq!(api.list_sheets(&editor, &query).unwrap().page.unwrap().total_count, 2);
    }

    #[test]
    fn writes_respect_scope() {
        let mut api = api();
        let id = add(&mut api, false);
        let member = Caller::member("guest");

        assert!(matches!(
            api.delete_sheet(&member, &id),
            Err(CatalogError::Forbidden(_))
        ));
        assert!(matches!(
            api.update_sheet(&member, &id, &form(true), Attachments::default()),
            Err(CatalogError::Forbidden(_))
        ));
        assert!(api.delete_sheet(&Caller::operator("root"), &id).is_ok());
    }

    #[test]
    fn detail_dispatch() {
        let mut api = api();
        let id = add(&mut api, true);
        let caller = Caller::member("guest");

        let by_slug = api.sheet_by_slug(&caller, "ave-maria").unwrap();
        assert_eq!(by_slug.sheet().unwrap().sheet.id, id);
        let by_id = api.sheet_by_id(&caller, &id).unwrap();
        assert_eq!(by_id.sheet().unwrap().sheet.slug.as_deref(), Some("ave-maria"));
        assert!(api.sheet_for_edit(&caller, &id).unwrap().choices.is_some());
        assert!(api.choices().choices.is_some());
    }
}
