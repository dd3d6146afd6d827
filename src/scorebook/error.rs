use crate::form::ValidationErrors;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Sheet not found: {0}")]
    SheetNotFound(Uuid),

    #[error("No sheet with slug '{0}'")]
    SlugNotFound(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Slug already in use: {0}")]
    SlugConflict(String),

    #[error("Tag already exists: {0}")]
    TagConflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl CatalogError {
    /// True for failures that mean "this record does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::SheetNotFound(_) | CatalogError::SlugNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
