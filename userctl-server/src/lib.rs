//! userctl-server: HTTP service for the user resource
//!
//! Three layers wired explicitly at startup:
//! - `store`: persistence boundary (PostgreSQL or in-memory)
//! - `service`: validation and error normalization
//! - `http`: axum routes mapping service outcomes to status codes

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod service;
pub mod store;

pub use config::{ConfigError, StorageBackend, UserctlConfig};
pub use models::{User, UserCandidate, ValidationError};
pub use service::{ServiceError, UserService};
pub use store::{MemoryUserStore, StoreError, UserStore};
