//! Attachment storage.
//!
//! The catalog never interprets attachment bytes. A [`BlobStore`] takes an
//! upload for a given sheet and hands back a [`BlobRef`] that is stored on the
//! record. Keys have the shape `<kind>/<sheet id>/<nonce>-<sanitized file name>`,
//! so every upload lands under a fresh key and never overwrites a blob that a
//! stored record still points at.

use crate::error::{CatalogError, Result};
use crate::model::BlobRef;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    SheetFile,
    PreviewImage,
}

impl BlobKind {
    fn dir(self) -> &'static str {
        match self {
            BlobKind::SheetFile => "sheets",
            BlobKind::PreviewImage => "previews",
        }
    }
}

/// A file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

pub trait BlobStore {
    /// Store an upload for `owner` under a key no earlier upload has used.
    fn put(&mut self, owner: &Uuid, kind: BlobKind, upload: &Upload) -> Result<BlobRef>;

    /// Remove a blob. Removing a missing blob is not an error.
    fn remove(&mut self, blob: &BlobRef) -> Result<()>;
}

fn blob_key(owner: &Uuid, kind: BlobKind, file_name: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}/{}-{}",
        kind.dir(),
        owner,
        &nonce[..12],
        sanitize_file_name(file_name)
    )
}

/// Keeps only the final path component and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Blobs as plain files under a root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, blob: &BlobRef) -> PathBuf {
        self.root.join(&blob.key)
    }
}

impl BlobStore for FsBlobStore {
    fn put(&mut self, owner: &Uuid, kind: BlobKind, upload: &Upload) -> Result<BlobRef> {
        let key = blob_key(owner, kind, &upload.file_name);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(CatalogError::Io)?;
        }
        fs::write(&path, &upload.bytes).map_err(CatalogError::Io)?;
        Ok(BlobRef {
            key,
            file_name: upload.file_name.clone(),
            size: upload.bytes.len() as u64,
        })
    }

    fn remove(&mut self, blob: &BlobRef) -> Result<()> {
        let path = self.path_for(blob);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CatalogError::Io(e)),
        }
        // Drop the per-sheet directory once it is empty
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
        Ok(())
    }
}

/// In-memory blobs for tests.
#[derive(Default)]
pub struct MemBlobStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemBlobStore {
    fn put(&mut self, owner: &Uuid, kind: BlobKind, upload: &Upload) -> Result<BlobRef> {
        let key = blob_key(owner, kind, &upload.file_name);
        self.blobs.insert(key.clone(), upload.bytes.clone());
        Ok(BlobRef {
            key,
            file_name: upload.file_name.clone(),
            size: upload.bytes.len() as u64,
        })
    }

    fn remove(&mut self, blob: &BlobRef) -> Result<()> {
        self.blobs.remove(&blob.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name("score.pdf"), "score.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\scans\\Ave Maria.pdf"), "Ave_Maria.pdf");
        assert_eq!(sanitize_file_name("píseň.pdf"), "p_se_.pdf");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name(".."), "upload");
    }

    #[test]
    fn fs_store_writes_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut blobs = FsBlobStore::new(dir.path());
        let owner = Uuid::new_v4();

        let blob = blobs
            .put(&owner, BlobKind::SheetFile, &Upload::new("score.pdf", b"%PDF".to_vec()))
            .unwrap();
        let dir_prefix = format!("sheets/{}/", owner);
        assert!(blob.key.starts_with(&dir_prefix));
        assert!(blob.key.ends_with("-score.pdf"));
        assert_eq!(blob.size, 4);
        assert_eq!(fs::read(blobs.path_for(&blob)).unwrap(), b"%PDF");

        blobs.remove(&blob).unwrap();
        assert!(!blobs.path_for(&blob).exists());
        // Second removal is a no-op
        blobs.remove(&blob).unwrap();
    }

    #[test]
    fn previews_live_apart_from_sheet_files() {
        let mut blobs = MemBlobStore::new();
        let owner = Uuid::new_v4();
        let sheet = blobs
            .put(&owner, BlobKind::SheetFile, &Upload::new("a.pdf", vec![1]))
            .unwrap();
        let preview = blobs
            .put(&owner, BlobKind::PreviewImage, &Upload::new("a.png", vec![2]))
            .unwrap();
        assert!(sheet.key.starts_with("sheets/"));
        assert!(preview.key.starts_with("previews/"));
        assert_eq!(blobs.len(), 2);
    }

    #[test]
    fn same_file_name_gets_a_fresh_key_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut blobs = FsBlobStore::new(dir.path());
        let owner = Uuid::new_v4();

        let first = blobs
            .put(&owner, BlobKind::SheetFile, &Upload::new("ave.pdf", b"v1".to_vec()))
            .unwrap();
        let second = blobs
            .put(&owner, BlobKind::SheetFile, &Upload::new("ave.pdf", b"v2".to_vec()))
            .unwrap();

        assert_ne!(first.key, second.key);
        assert_eq!(fs::read(blobs.path_for(&first)).unwrap(), b"v1");
        assert_eq!(fs::read(blobs.path_for(&second)).unwrap(), b"v2");

        // The sheet directory stays while another blob lives in it
        blobs.remove(&first).unwrap();
        assert_eq!(fs::read(blobs.path_for(&second)).unwrap(), b"v2");
    }
}
