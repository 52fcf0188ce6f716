//! Storage workflows, one module per aggregate. Every public method lives on
//! `Database`; the free functions take a `&Connection` so that workflows can
//! compose them inside a single transaction.

pub mod audit;
pub mod categories;
pub mod entities;
pub mod interactions;
pub mod interface;
pub mod languages;
pub mod tags;
pub mod translations;
pub mod users;
pub mod words;

use crate::DbResult;

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> DbResult<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> DbResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Trimmed value, or a validation error naming the field.
pub(crate) fn required<'a>(value: &'a str, field: &str) -> DbResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::DbError::Validation(format!("{field} is required")));
    }
    Ok(value)
}
