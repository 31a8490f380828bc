//! Database models
//!
//! Plain record shapes read from the store, and their row mapping. Mapping is
//! strict: a missing column, a NULL in a required column or a type mismatch
//! is an [`Error::Mapping`], never a default.

use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Decode, Row, Sqlite, Type, ValueRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub item_id: i32,
    pub name: String,
    pub price: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i32,
    pub item: String,
    pub timestamp: NaiveDateTime,
}

/// One message taken off the order notification queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: i64,
    /// Raw body bytes, None when the producer sent no body
    pub message_body: Option<Vec<u8>>,
}

impl QueueMessage {
    pub fn new(message_id: i64, message_body: Option<Vec<u8>>) -> Self {
        Self {
            message_id,
            message_body,
        }
    }
}

impl MenuItem {
    /// Map a `menu` row (`ItemId, Name, Price, Category`)
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            item_id: column(row, "ItemId")?,
            name: column(row, "Name")?,
            price: column(row, "Price")?,
            category: column(row, "Category")?,
        })
    }
}

impl Order {
    /// Map a `restaurant_order` row (`OrderId, Item, Timestamp`)
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            order_id: column(row, "OrderId")?,
            item: column(row, "Item")?,
            timestamp: column(row, "Timestamp")?,
        })
    }
}

/// Read one required column, turning lookup, NULL and decode failures into
/// mapping errors
fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    let raw = row.try_get_raw(name).map_err(|e| mapping_error(name, e))?;
    if raw.is_null() {
        return Err(Error::Mapping(format!("column '{}' is NULL", name)));
    }

    row.try_get::<T, _>(name).map_err(|e| mapping_error(name, e))
}

fn mapping_error(name: &str, e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::ColumnNotFound(_) => Error::Mapping(format!("missing column '{}'", name)),
        sqlx::Error::ColumnDecode { source, .. } => {
            Error::Mapping(format!("column '{}' has wrong type: {}", name, source))
        }
        sqlx::Error::Decode(source) => {
            Error::Mapping(format!("column '{}' could not be decoded: {}", name, source))
        }
        other => Error::Database(other),
    }
}
