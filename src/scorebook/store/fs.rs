use super::{check_slug_free, check_tag_free, DataStore};
use crate::error::{CatalogError, Result};
use crate::model::Sheet;
use crate::tags::Tag;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const SHEETS_FILE: &str = "sheets.json";
const TAGS_FILE: &str = "tags.json";
const LOCK_FILE: &str = ".lock";

/// File-backed store. Every operation re-reads the index files, so several
/// processes sharing a data directory see each other's writes.
///
/// Writes hold an exclusive advisory lock on `<root>/.lock` from the read of
/// the index to the rename of its replacement. Reads take no lock; the rename
/// keeps them from ever seeing a half-written file.
pub struct FileStore {
    root: PathBuf,
}

/// Exclusive lock on a data directory, released on drop.
struct DirLock {
    file: File,
}

impl DirLock {
    fn acquire(root: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(root.join(LOCK_FILE))
            .map_err(CatalogError::Io)?;
        file.lock_exclusive().map_err(CatalogError::Io)?;
        Ok(Self { file })
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn lock(&self) -> Result<DirLock> {
        self.ensure_dir()?;
        DirLock::acquire(&self.root)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(CatalogError::Io)?;
        }
        Ok(())
    }

    fn load_map<T: DeserializeOwned>(&self, file: &str) -> Result<HashMap<Uuid, T>> {
        let path = self.root.join(file);
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&path).map_err(CatalogError::Io)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(CatalogError::Serialization)
    }

    fn save_map<T: Serialize>(&self, file: &str, map: &HashMap<Uuid, T>) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(map).map_err(CatalogError::Serialization)?;
        write_atomic(&self.root.join(file), &content)
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension(format!("json.tmp-{}", Uuid::new_v4().simple()));
    fs::write(&tmp, content).map_err(CatalogError::Io)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(CatalogError::Io(e));
    }
    Ok(())
}

impl DataStore for FileStore {
    fn save_sheet(&mut self, sheet: &Sheet) -> Result<()> {
        let _lock = self.lock()?;
        let mut sheets: HashMap<Uuid, Sheet> = self.load_map(SHEETS_FILE)?;
        check_slug_free(sheet, sheets.values())?;
        sheets.insert(sheet.id, sheet.clone());
        self.save_map(SHEETS_FILE, &sheets)
    }

    fn get_sheet(&self, id: &Uuid) -> Result<Sheet> {
        let mut sheets: HashMap<Uuid, Sheet> = self.load_map(SHEETS_FILE)?;
        sheets.remove(id).ok_or(CatalogError::SheetNotFound(*id))
    }

    fn list_sheets(&self) -> Result<Vec<Sheet>> {
        let sheets: HashMap<Uuid, Sheet> = self.load_map(SHEETS_FILE)?;
        Ok(sheets.into_values().collect())
    }

    fn delete_sheet(&mut self, id: &Uuid) -> Result<Sheet> {
        let _lock = self.lock()?;
        let mut sheets: HashMap<Uuid, Sheet> = self.load_map(SHEETS_FILE)?;
        let removed = sheets.remove(id).ok_or(CatalogError::SheetNotFound(*id))?;
        self.save_map(SHEETS_FILE, &sheets)?;
        Ok(removed)
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let tags: HashMap<Uuid, Tag> = self.load_map(TAGS_FILE)?;
        Ok(tags.into_values().collect())
    }

    fn save_tag(&mut self, tag: &Tag) -> Result<()> {
        let _lock = self.lock()?;
        let mut tags: HashMap<Uuid, Tag> = self.load_map(TAGS_FILE)?;
        check_tag_free(tag, tags.values())?;
        tags.insert(tag.id, tag.clone());
        self.save_map(TAGS_FILE, &tags)
    }
}
