//! # Storage Layer
//!
//! This module defines the storage abstraction for the catalog. The [`DataStore`]
//! trait holds the records (sheets and tags); the [`blob::BlobStore`] trait holds
//! the attached files. Both are traits so the command layer never knows whether
//! it is talking to the filesystem or to memory.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production storage
//!   - Sheets stored in `sheets.json`, tags in `tags.json`
//!   - Every write goes to a temporary file that is then renamed over the original
//!
//! - [`memory::InMemoryStore`]: In-memory storage for testing
//!   - No persistence
//!
//! ## Constraints Enforced Here
//!
//! Stores are the last line of defence for the two uniqueness rules:
//!
//! - `save_sheet` fails with [`CatalogError::SlugConflict`] when the sheet's slug
//!   is already held by a *different* sheet. The slug assigner retries on this
//!   error (see [`crate::slug::save_with_slug`]).
//! - `save_tag` fails with [`CatalogError::TagConflict`] when a different tag
//!   already has exactly the same name.
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <data_dir>/
//! ├── sheets.json        # All sheets, keyed by id
//! ├── tags.json          # All tags, keyed by id
//! └── blobs/             # Attachments (see blob::FsBlobStore)
//!     ├── sheets/<id>/...
//!     └── previews/<id>/...
//! ```

use crate::error::{CatalogError, Result};
use crate::model::Sheet;
use crate::tags::Tag;
use uuid::Uuid;

pub mod blob;
pub mod fs;
pub mod memory;

/// Abstract interface for catalog record storage.
pub trait DataStore {
    /// Save a sheet (create or update).
    ///
    /// Must reject the write with `SlugConflict` if another sheet holds the same slug.
    fn save_sheet(&mut self, sheet: &Sheet) -> Result<()>;

    /// Get a sheet by id
    fn get_sheet(&self, id: &Uuid) -> Result<Sheet>;

    /// List every sheet, in no particular order
    fn list_sheets(&self) -> Result<Vec<Sheet>>;

    /// Delete a sheet permanently, returning the removed record
    fn delete_sheet(&mut self, id: &Uuid) -> Result<Sheet>;

    /// List every tag, in no particular order
    fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Save a tag (create or rename).
    ///
    /// Must reject the write with `TagConflict` if another tag has the exact same name.
    fn save_tag(&mut self, tag: &Tag) -> Result<()>;

    fn find_by_slug(&self, slug: &str) -> Result<Option<Sheet>> {
        Ok(self
            .list_sheets()?
            .into_iter()
            .find(|s| s.slug.as_deref() == Some(slug)))
    }
}

/// Shared check used by every store before writing a sheet.
pub(crate) fn check_slug_free<'a, I>(sheet: &Sheet, existing: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Sheet>,
{
    let Some(slug) = sheet.slug.as_deref() else {
        return Ok(());
    };
    let taken = existing
        .into_iter()
        .any(|other| other.id != sheet.id && other.slug.as_deref() == Some(slug));
    if taken {
        return Err(CatalogError::SlugConflict(slug.to_string()));
    }
    Ok(())
}

pub(crate) fn check_tag_free<'a, I>(tag: &Tag, existing: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Tag>,
{
    if existing
        .into_iter()
        .any(|other| other.id != tag.id && other.name == tag.name)
    {
        return Err(CatalogError::TagConflict(tag.name.clone()));
    }
    Ok(())
}
