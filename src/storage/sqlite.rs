//! SQLite storage implementation

use std::path::{Path, PathBuf};
use std::time::Duration;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension};
use crate::entity::{Ack, Entity, Fields, Product, ProductFields, User, UserFields};
use crate::{Error, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Record operations open an existing file by plain path: no create, no URI parsing.
const OPEN_FLAGS: OpenFlags = OpenFlags::SQLITE_OPEN_READ_WRITE.union(OpenFlags::SQLITE_OPEN_NO_MUTEX);

/// SQLite-backed storage for users and products.
///
/// Holds the database location only; cloning is cheap and clones may be used
/// from different threads, each operation acquiring its own connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Point at a database file. Nothing is opened until an operation runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection to an existing database file.
    ///
    /// The file is never created here, so a store that was not initialized
    /// fails loudly instead of silently growing an empty database.
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(&self.path, OPEN_FLAGS)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Run `op` on a fresh connection, closing it on every exit path.
    fn with_connection<T>(&self, op: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.connect()?;
        let result = op(&conn);
        if let Err((_, err)) = conn.close() {
            tracing::warn!("Failed to close connection to {}: {}", self.path.display(), err);
        }
        result
    }

    // ========== User Operations ==========

    /// All users in store order
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.list()
    }

    /// Get a user by id; `None` when no such user exists
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.get(id)
    }

    /// Insert a user and return its newly assigned id
    pub fn create_user(&self, fields: &UserFields) -> Result<i64> {
        self.create(fields)
    }

    pub fn update_user(&self, id: i64, fields: &UserFields) -> Result<Ack> {
        self.update(id, fields)
    }

    pub fn delete_user(&self, id: i64) -> Result<Ack> {
        self.delete::<User>(id)
    }

    // ========== Product Operations ==========

    /// All products in store order
    pub fn list_products(&self) -> Result<Vec<Product>> {
        self.list()
    }

    /// Get a product by id; `None` when no such product exists
    pub fn get_product(&self, id: i64) -> Result<Option<Product>> {
        self.get(id)
    }

    /// Insert a product and return its newly assigned id
    pub fn create_product(&self, fields: &ProductFields) -> Result<i64> {
        self.create(fields)
    }

    pub fn update_product(&self, id: i64, fields: &ProductFields) -> Result<Ack> {
        self.update(id, fields)
    }

    pub fn delete_product(&self, id: i64) -> Result<Ack> {
        self.delete::<Product>(id)
    }

    // ========== Generic Operations ==========

    fn list<E: Entity>(&self) -> Result<Vec<E>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", E::COLUMNS, E::TABLE);
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([], |row| E::from_row(row))?
                .collect::<rusqlite::Result<Vec<E>>>()?;
            tracing::debug!("Listed {} rows from {}", records.len(), E::TABLE);
            Ok(records)
        })
    }

    fn get<E: Entity>(&self, id: i64) -> Result<Option<E>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", E::COLUMNS, E::TABLE);
        self.with_connection(|conn| {
            let record = conn
                .query_row(&sql, [id], |row| E::from_row(row))
                .optional()?;
            if record.is_none() {
                tracing::debug!("No {} with id {}", E::LABEL, id);
            }
            Ok(record)
        })
    }

    fn create<F: Fields>(&self, fields: &F) -> Result<i64> {
        let columns = fields.to_columns()?;
        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            <F::Entity as Entity>::TABLE,
            names.join(", "),
            placeholders.join(", "),
        );

        self.with_connection(|conn| {
            conn.execute(&sql, params_from_iter(columns.iter().map(|(_, value)| value)))
                .map_err(|e| write_error(e, &columns))?;
            let id = conn.last_insert_rowid();
            tracing::debug!("Created {} {}", <F::Entity as Entity>::LABEL, id);
            Ok(id)
        })
    }

    fn update<F: Fields>(&self, id: i64, fields: &F) -> Result<Ack> {
        let columns = fields.to_columns()?;
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} = ?{}", name, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            <F::Entity as Entity>::TABLE,
            assignments.join(", "),
            columns.len() + 1,
        );
        let mut values: Vec<Value> = columns.iter().map(|(_, value)| value.clone()).collect();
        values.push(Value::Integer(id));

        self.with_connection(|conn| {
            let affected = conn
                .execute(&sql, params_from_iter(values.iter()))
                .map_err(|e| write_error(e, &columns))?;
            log_mutation(<F::Entity as Entity>::LABEL, "Updated", id, affected);
            Ok(Ack { affected })
        })
    }

    fn delete<E: Entity>(&self, id: i64) -> Result<Ack> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);
        self.with_connection(|conn| {
            let affected = conn.execute(&sql, [id])?;
            log_mutation(E::LABEL, "Deleted", id, affected);
            Ok(Ack { affected })
        })
    }

    // ========== Statistics ==========

    fn count<E: Entity>(conn: &Connection) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        self.with_connection(|conn| {
            Ok(DbStats {
                users: Self::count::<User>(conn)?,
                products: Self::count::<Product>(conn)?,
            })
        })
    }
}

fn log_mutation(label: &str, verb: &str, id: i64, affected: usize) {
    if affected == 0 {
        tracing::debug!("{} {} {}: no matching row", verb, label, id);
    } else {
        tracing::debug!("{} {} {}", verb, label, id);
    }
}

/// Map a failed write to `Error::Uniqueness` when a UNIQUE constraint fired.
///
/// SQLite reports the column as `UNIQUE constraint failed: <table>.<column>`.
fn write_error(err: rusqlite::Error, columns: &[(&'static str, Value)]) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            let field = message
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            let value = columns
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, value)| value_text(value))
                .unwrap_or_default();
            tracing::warn!("Rejected duplicate {} '{}'", field, value);
            return Error::Uniqueness { field, value };
        }
    }
    Error::Storage(err)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub users: usize,
    pub products: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Users: {}", self.users)?;
        write!(f, "  Products: {}", self.products)
    }
}
