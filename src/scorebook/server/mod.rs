//! # HTTP Service
//!
//! An axum front end over [`CatalogApi`]. Every response is JSON; rendering
//! is up to the client.
//!
//! ## Identity
//!
//! Authentication happens upstream. A front proxy vouches for the caller through
//! trusted headers, read by [`caller_from_headers`]:
//!
//! | Header | Meaning |
//! |--------|---------|
//! | `x-remote-user` | username, required on every route except `/health` |
//! | `x-remote-staff` | `true`, `1` or `yes` marks staff |
//! | `x-remote-superuser` | same values, marks a superuser |
//! | `x-remote-groups` | comma-separated group names |
//!
//! ## Concurrency
//!
//! Catalog work is synchronous: each handler moves it onto the blocking pool and
//! takes the one mutex around the API. Writes are therefore serialized within the
//! process, which together with the store's own slug check keeps slugs unique.

use crate::access::Caller;
use crate::api::CatalogApi;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::store::blob::{BlobStore, FsBlobStore};
use crate::store::fs::FileStore;
use crate::store::DataStore;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod error;
mod handlers;

pub use error::ApiError;

pub const USER_HEADER: &str = "x-remote-user";
pub const STAFF_HEADER: &str = "x-remote-staff";
pub const SUPERUSER_HEADER: &str = "x-remote-superuser";
pub const GROUPS_HEADER: &str = "x-remote-groups";

pub struct AppState<S: DataStore, B: BlobStore> {
    api: Arc<Mutex<CatalogApi<S, B>>>,
}

impl<S: DataStore, B: BlobStore> Clone for AppState<S, B> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<S, B> AppState<S, B>
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    pub fn new(api: CatalogApi<S, B>) -> Self {
        Self {
            api: Arc::new(Mutex::new(api)),
        }
    }

    /// Runs `f` on the blocking pool while holding the API lock.
    async fn with_api<T, F>(&self, f: F) -> std::result::Result<Result<T>, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut CatalogApi<S, B>) -> Result<T> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        tokio::task::spawn_blocking(move || {
            let mut api = api
                .lock()
                .map_err(|_| CatalogError::Store("catalog lock poisoned".into()))?;
            f(&mut api)
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "catalog task failed");
            ApiError::internal(error::SAVE_FAILED)
        })
    }
}

pub fn router<S, B>(api: CatalogApi<S, B>, max_upload_bytes: usize) -> Router
where
    S: DataStore + Send + 'static,
    B: BlobStore + Send + 'static,
{
    Router::new()
        .route("/", get(handlers::list::<S, B>))
        .route(
            "/sheet/add",
            get(handlers::add_form::<S, B>).post(handlers::create::<S, B>),
        )
        .route(
            "/edit/:id",
            get(handlers::edit_form::<S, B>).post(handlers::update::<S, B>),
        )
        .route(
            "/delete/:id",
            get(handlers::confirm_delete::<S, B>).post(handlers::delete::<S, B>),
        )
        .route("/noty/:slug", get(handlers::detail::<S, B>))
        .route("/book/:id", get(handlers::legacy_detail::<S, B>))
        .route("/tags", get(handlers::tags::<S, B>))
        .route("/health", get(health))
        .with_state(AppState::new(api))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Serves the file-backed catalog until Ctrl-C.
pub async fn serve(config: &CatalogConfig) -> Result<()> {
    let data_dir = config.data_dir()?;
    let api = CatalogApi::new(
        FileStore::new(data_dir.clone()),
        FsBlobStore::new(config.blob_dir()?),
        config.editor_group.clone(),
    );
    let app = router(api, config.max_upload_bytes);

    let listener = TcpListener::bind(&config.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        data_dir = %data_dir.display(),
        "serving catalog"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn health() -> &'static str {
    "ok"
}

fn flag(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The caller vouched for by the front proxy.
pub fn caller_from_headers(headers: &HeaderMap) -> std::result::Result<Caller, ApiError> {
    let username = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(ApiError::unauthenticated)?;

    let groups: Vec<String> = headers
        .get(GROUPS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(Caller {
        username: username.to_string(),
        is_staff: flag(headers, STAFF_HEADER),
        is_superuser: flag(headers, SUPERUSER_HEADER),
        groups,
    })
}
