//! Internal helpers for converting between wire values and cached columns.
//!
//! These utilities are **not** part of the public API. They centralize the
//! date format and raw-value parsing so every entity stores the same shapes.

use chrono::{Days, NaiveDate};
use sea_orm::Value;

use crate::{EngineError, ResultEngine};

/// Canonical date format of every cached date column.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a cached date column and return a labeled error on failure.
pub(crate) fn parse_date(value: &str, label: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| EngineError::InvalidValue(format!("invalid {label} date: {value}")))
}

pub(crate) fn day_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}

pub(crate) fn day_before(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN)
}

/// Read an integer id out of a dynamically typed column value.
pub(crate) fn value_as_id(value: &Value) -> Option<i64> {
    match value {
        Value::BigInt(Some(id)) => Some(*id),
        Value::Int(Some(id)) => Some(i64::from(*id)),
        Value::BigUnsigned(Some(id)) => i64::try_from(*id).ok(),
        Value::Unsigned(Some(id)) => Some(i64::from(*id)),
        _ => None,
    }
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
