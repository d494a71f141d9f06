//! Statutebook API: Axum server exposing regulations and their articles.
//!
//! The domain logic (identifier generation, hierarchical ordering,
//! duplicate detection, bulk-edit reconciliation, flat-text codec) lives in
//! `statutebook-core`; this crate binds it to Postgres and HTTP.

pub mod articles;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod regulations;

pub use config::AppConfig;
pub use db::{create_pool, run_migrations};
pub use error::{ApiError, Result};
pub use handlers::router;
