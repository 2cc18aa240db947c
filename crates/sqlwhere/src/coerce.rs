//! Scalar coercion helpers used when binding operator values.
//!
//! These never fail: shapes without a dedicated rule degrade to their
//! textual representation.

use crate::value::Value;
use chrono::{NaiveDateTime, Timelike};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a value as plain text.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        Value::Date(_) | Value::DateTime(_) => to_datetime_text(value),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(to_text).collect();
            format!("[{}]", parts.join(" "))
        }
    }
}

/// Wrap a value in a list unless it already is one. `Null` becomes an empty list.
pub fn to_list(value: &Value) -> Value {
    match value {
        Value::Null => Value::List(Vec::new()),
        Value::List(_) => value.clone(),
        other => Value::List(vec![other.clone()]),
    }
}

/// Convert a value into a form safe to bind as a statement parameter.
///
/// Nulls, temporal values and raw bytes become text (inside lists too);
/// everything else is kept.
pub fn to_wire(value: &Value) -> Value {
    match value {
        Value::Null | Value::Date(_) | Value::DateTime(_) | Value::Bytes(_) => {
            Value::Text(to_text(value))
        }
        Value::List(items) => Value::List(items.iter().map(to_wire).collect()),
        other => other.clone(),
    }
}

fn is_midnight(dt: &NaiveDateTime) -> bool {
    dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 && dt.nanosecond() == 0
}

/// Format a temporal value as `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DD` when
/// there is no time-of-day component.
pub fn to_datetime_text(value: &Value) -> String {
    match value {
        Value::Date(d) => d.format(DATE_FORMAT).to_string(),
        Value::DateTime(dt) if is_midnight(dt) => dt.format(DATE_FORMAT).to_string(),
        Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        other => to_text(other),
    }
}

/// Truncate a temporal value to its date and format it as `YYYY-MM-DD`.
pub fn to_date_text(value: &Value) -> String {
    match value {
        Value::Date(d) => d.format(DATE_FORMAT).to_string(),
        Value::DateTime(dt) => dt.date().format(DATE_FORMAT).to_string(),
        other => to_text(other),
    }
}

/// Coerce one endpoint of a range operator.
///
/// Temporal endpoints are formatted as text; other endpoints keep their wire
/// representation so numeric ranges stay numeric.
pub fn to_range_bound(value: &Value) -> Value {
    if value.is_temporal() {
        Value::Text(to_datetime_text(value))
    } else {
        to_wire(value)
    }
}
