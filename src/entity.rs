//! Entity types for the two collections
//!
//! Read side:
//! - `User`: id, name, email (email unique across users)
//! - `Product`: id, name, price
//!
//! Write side:
//! - `UserFields` / `ProductFields`: caller-supplied values, every field optional
//!   until validated. Validation turns them into named column/value pairs that
//!   the store binds as parameters.

use crate::{Error, Result};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A record type stored in its own table.
///
/// Rows are decoded by column name, so the column order of `COLUMNS`
/// never leaks to callers.
pub trait Entity: Sized {
    /// Table name
    const TABLE: &'static str;
    /// Human label used in logs and errors
    const LABEL: &'static str;
    /// Column list for SELECT statements
    const COLUMNS: &'static str;

    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Write input for an [`Entity`].
pub trait Fields {
    type Entity: Entity;

    /// Validate and return `(column, value)` pairs in a stable order.
    fn to_columns(&self) -> Result<Vec<(&'static str, Value)>>;
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const LABEL: &'static str = "user";
    const COLUMNS: &'static str = "id, name, email";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
        })
    }
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

impl Entity for Product {
    const TABLE: &'static str = "products";
    const LABEL: &'static str = "product";
    const COLUMNS: &'static str = "id, name, price";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get("id")?,
            name: row.get("name")?,
            price: row.get("price")?,
        })
    }
}

/// Values for creating or replacing a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFields {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserFields {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}

impl Fields for UserFields {
    type Entity = User;

    fn to_columns(&self) -> Result<Vec<(&'static str, Value)>> {
        let name = required_text("name", self.name.as_deref())?;
        let email = required_text("email", self.email.as_deref())?;
        validate_email(&email)?;
        Ok(vec![("name", Value::Text(name)), ("email", Value::Text(email))])
    }
}

/// Values for creating or replacing a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl ProductFields {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: Some(name.into()),
            price: Some(price),
        }
    }
}

impl Fields for ProductFields {
    type Entity = Product;

    fn to_columns(&self) -> Result<Vec<(&'static str, Value)>> {
        let name = required_text("name", self.name.as_deref())?;
        let price = self
            .price
            .ok_or_else(|| Error::validation("price", "is required"))?;
        if !price.is_finite() {
            return Err(Error::validation("price", "must be a finite number"));
        }
        if price < 0.0 {
            return Err(Error::validation("price", format!("must not be negative (got {})", price)));
        }
        Ok(vec![("name", Value::Text(name)), ("price", Value::Real(price))])
    }
}

/// Acknowledgment for update/delete. `affected == 0` means no row had that id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub affected: usize,
}

impl Ack {
    pub fn matched(&self) -> bool {
        self.affected > 0
    }
}

fn required_text(field: &'static str, value: Option<&str>) -> Result<String> {
    let value = value.ok_or_else(|| Error::validation(field, "is required"))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

fn validate_email(email: &str) -> Result<()> {
    let malformed = || Error::validation("email", format!("'{}' is not an email address", email));

    if email.chars().any(char::is_whitespace) {
        return Err(malformed());
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(malformed()),
    }
}
