//! # Configuration
//!
//! Configuration is loaded with [`confique`], layered in priority order:
//!
//! 1. **Environment variables**: `SCOREBOOK_DATA_DIR`, `SCOREBOOK_BIND`,
//!    `SCOREBOOK_EDITOR_GROUP`, `SCOREBOOK_MAX_UPLOAD_BYTES`.
//! 2. **Config file**: `scorebook.toml` in the OS config directory (via the
//!    `directories` crate). A missing file is fine.
//! 3. **Compiled defaults**: `#[config(default = ...)]` below.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data directory | Where records and attachments live |
//! | `bind` | `127.0.0.1:8000` | Listen address for `scorebook serve` |
//! | `editor_group` | `editors` | Group whose members see private sheets |
//! | `max_upload_bytes` | 20 MiB | Request body limit for form posts |

use crate::error::{CatalogError, Result};
use confique::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "scorebook.toml";

#[derive(Config, Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Directory holding `sheets.json`, `tags.json` and `blobs/`
    #[config(env = "SCOREBOOK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(env = "SCOREBOOK_BIND", default = "127.0.0.1:8000")]
    pub bind: String,

    #[config(env = "SCOREBOOK_EDITOR_GROUP", default = "editors")]
    pub editor_group: String,

    #[config(env = "SCOREBOOK_MAX_UPLOAD_BYTES", default = 20971520)]
    pub max_upload_bytes: usize,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "scorebook")
}

impl CatalogConfig {
    /// Environment over the user's config file over defaults.
    pub fn load() -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(dirs) = project_dirs() {
            builder = builder.file(dirs.config_dir().join(CONFIG_FILENAME));
        }
        builder.load().map_err(|e| CatalogError::Config(e.to_string()))
    }

    /// A single config file over defaults, without the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::builder()
            .file(path)
            .load()
            .map_err(|e| CatalogError::Config(e.to_string()))
    }

    /// The configured data directory, or the OS data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| CatalogError::Config("could not determine a data directory".into()))
    }

    pub fn blob_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("blobs"))
    }
}
