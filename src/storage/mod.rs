//! Storage Layer - SQLite-backed persistence
//!
//! A single database file with two independent tables:
//! - users(id, name, email) with `email` unique
//! - products(id, name, price)
//!
//! `SqliteStore` holds only the file location. Every operation opens its own
//! connection and drops it before returning.

pub mod init;
pub mod schema;
pub mod sqlite;

pub use init::InitOutcome;
pub use sqlite::{DbStats, SqliteStore};
