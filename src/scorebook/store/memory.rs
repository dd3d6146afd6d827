use super::{check_slug_free, check_tag_free, DataStore};
use crate::error::{CatalogError, Result};
use crate::model::Sheet;
use crate::tags::Tag;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    sheets: HashMap<Uuid, Sheet>,
    tags: HashMap<Uuid, Tag>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for InMemoryStore {
    fn save_sheet(&mut self, sheet: &Sheet) -> Result<()> {
        check_slug_free(sheet, self.sheets.values())?;
        self.sheets.insert(sheet.id, sheet.clone());
        Ok(())
    }

    fn get_sheet(&self, id: &Uuid) -> Result<Sheet> {
        self.sheets
            .get(id)
            .cloned()
            .ok_or(CatalogError::SheetNotFound(*id))
    }

    fn list_sheets(&self) -> Result<Vec<Sheet>> {
        Ok(self.sheets.values().cloned().collect())
    }

    fn delete_sheet(&mut self, id: &Uuid) -> Result<Sheet> {
        self.sheets
            .remove(id)
            .ok_or(CatalogError::SheetNotFound(*id))
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.values().cloned().collect())
    }

    fn save_tag(&mut self, tag: &Tag) -> Result<()> {
        check_tag_free(tag, self.tags.values())?;
        self.tags.insert(tag.id, tag.clone());
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::BlobRef;

    pub fn blob(name: &str) -> BlobRef {
        BlobRef {
            key: format!("sheets/fixture/{}", name),
            file_name: name.to_string(),
            size: 0,
        }
    }

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        /// Adds `count` public sheets titled "Sheet 01", "Sheet 02", …
        pub fn with_public_sheets(mut self, count: usize) -> Self {
            for i in 0..count {
                let mut sheet = Sheet::new(
                    format!("Sheet {:02}", i + 1),
                    "Composer",
                    "fixture",
                    blob("score.pdf"),
                );
                sheet.public = true;
                sheet.slug = Some(format!("sheet-{:02}", i + 1));
                self.store.save_sheet(&sheet).unwrap();
            }
            self
        }

        pub fn with_sheet(mut self, sheet: Sheet) -> Self {
            self.store.save_sheet(&sheet).unwrap();
            self
        }

        pub fn with_tag(mut self, name: &str) -> Self {
            self.store.save_tag(&Tag::new(name)).unwrap();
            self
        }
    }
}
