//! # Scorebook Architecture
//!
//! Scorebook is a catalog of sheet-music records: choirs upload scores, then
//! browse, filter, search and edit them. The catalog is a library first. The
//! HTTP service and the CLI are two clients of the same API.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Clients: server/ (axum, JSON) and cli/ (binary only)       │
//! │  - Identify the caller, parse input, format output          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Resolves the caller's access scope                       │
//! │  - Dispatches to commands, returns Result<CmdResult>        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Listing, detail, create, update, delete, tags, choices   │
//! │  - Built on slug.rs, tags.rs, form.rs, query.rs, access.rs  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore: FileStore (JSON files), InMemoryStore         │
//! │  - BlobStore: FsBlobStore, MemBlobStore                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns Rust types. It
//! never writes to stdout, never exits the process and never knows whether a
//! request came from a browser or a terminal.
//!
//! ## Slugs
//!
//! Every sheet gets a URL slug derived from its title the first time it is
//! saved (`ave-maria`, then `ave-maria-2`, ...). A slug never changes after
//! that, even when the title does, so shared links keep working. Records from
//! before slugs existed get one on their first visit through the id address.
//!
//! ## Visibility
//!
//! Sheets are private unless marked public. Staff, superusers and members of
//! the editor group see everything; everyone else sees public sheets only.
//! See [`access`].
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: most tests live beside `commands/*.rs`, over the in-memory
//!    stores.
//! 2. **API**: dispatch and scope resolution.
//! 3. **Clients**: the router is driven in-process with `tower::ServiceExt`;
//!    the binary is driven with `assert_cmd`.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade, entry point for all operations
//! - [`commands`]: business logic per operation
//! - [`store`]: record and blob storage
//! - [`model`]: `Sheet`, classification sets, blob references
//! - [`slug`]: slug derivation and uniqueness
//! - [`tags`]: tag parsing and normalization
//! - [`access`]: callers and their access scope
//! - [`form`]: form input and validation
//! - [`query`]: listing query parameters
//! - [`config`]: layered configuration
//! - [`server`]: the HTTP service
//! - [`error`]: error types
//! - `cli`: argument parsing and terminal rendering for the binary (not part of the lib API)

pub mod access;
pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod query;
pub mod server;
pub mod slug;
pub mod store;
pub mod tags;
