//! Store initialization
//!
//! Runs once at process start, before any record operation. When the file is
//! absent, the store is built and seeded in a hidden staging file next to it
//! and then moved into place in one step, so the real path only ever holds a
//! complete store. An existing file is never modified, but it must contain
//! both tables or startup fails.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use rusqlite::{params, Connection, OpenFlags};
use serde::Serialize;
use super::schema;
use super::sqlite::SqliteStore;
use crate::entity::{Entity, Product, User};
use crate::{Error, Result};

const STAGING_PREFIX: &str = ".storefront-init-";

/// What `initialize_store` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InitOutcome {
    /// The file was absent and has been created and seeded
    Created { users: usize, products: usize },
    /// The file already existed; nothing was changed
    Existing,
}

impl SqliteStore {
    /// Ensure the store exists, creating and seeding it on first run.
    ///
    /// Idempotent: an existing, complete store is left as is. Every failure
    /// is returned as `Error::Init` (fatal): a path that is not a regular
    /// file, an existing file without both tables, or any error while
    /// building a new store. A build that dies part-way leaves the real path
    /// absent, so the next start retries.
    pub fn initialize_store(&self) -> Result<InitOutcome> {
        let path = self.path();

        if path.exists() {
            verify_existing(path)?;
            tracing::info!("Store already present at {}", path.display());
            return Ok(InitOutcome::Existing);
        }

        tracing::info!("Creating store at {}", path.display());
        match create_store(path) {
            Ok(outcome) => {
                tracing::info!("Store initialized: {:?}", outcome);
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!("Store initialization failed: {}", err);
                Err(init_error(path, err))
            }
        }
    }
}

fn init_error(path: &Path, message: impl ToString) -> Error {
    Error::Init {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

/// Refuse to serve from a file that is not a complete store.
fn verify_existing(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(init_error(path, "path exists but is not a regular file"));
    }

    let missing = missing_tables(path).map_err(|e| init_error(path, e))?;
    if !missing.is_empty() {
        return Err(init_error(
            path,
            format!("existing file is missing tables: {}", missing.join(", ")),
        ));
    }
    Ok(())
}

fn missing_tables(path: &Path) -> Result<Vec<&'static str>> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)?;
    conn.busy_timeout(Duration::from_secs(5))?;

    let mut stmt = conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let mut missing = Vec::new();
    for table in [User::TABLE, Product::TABLE] {
        if !stmt.exists([table])? {
            missing.push(table);
        }
    }
    Ok(missing)
}

fn create_store(path: &Path) -> Result<InitOutcome> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    // Dropped (and deleted) on every early return below.
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(".db")
        .tempfile_in(&dir)?;
    tracing::debug!("Building store in {}", staging.path().display());
    let outcome = build_store(staging.path())?;

    match staging.persist_noclobber(path) {
        Ok(_) => Ok(outcome),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            tracing::info!("Store at {} was created concurrently; keeping it", path.display());
            Ok(InitOutcome::Existing)
        }
        Err(e) => Err(e.error.into()),
    }
}

fn build_store(path: &Path) -> Result<InitOutcome> {
    let mut conn = Connection::open(path)?;
    let tx = conn.transaction()?;

    for stmt in schema::all_schema_statements() {
        tx.execute(stmt, [])?;
    }

    {
        let mut insert_user = tx.prepare("INSERT INTO users (name, email) VALUES (?1, ?2)")?;
        for (name, email) in schema::SEED_USERS {
            insert_user.execute(params![name, email])?;
        }

        let mut insert_product = tx.prepare("INSERT INTO products (name, price) VALUES (?1, ?2)")?;
        for (name, price) in schema::SEED_PRODUCTS {
            insert_product.execute(params![name, price])?;
        }
    }

    tx.commit()?;
    conn.close().map_err(|(_, err)| err)?;

    Ok(InitOutcome::Created {
        users: schema::SEED_USERS.len(),
        products: schema::SEED_PRODUCTS.len(),
    })
}
