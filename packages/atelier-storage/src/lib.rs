//! Postgres catalog store: pgvector similarity, full-text ranking and word-boundary lexical
//! browsing over one `products` table, plus the admin-maintained search settings row and
//! aggregate community ratings.

pub mod catalog;
pub mod db;
pub mod models;
pub mod ratings;
pub mod schema;
pub mod settings;
pub mod vector;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
