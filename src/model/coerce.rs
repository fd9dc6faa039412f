use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// First of `keys` that is present and not null
pub(crate) fn field<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}

/// Read a number, treating anything non-numeric as zero
pub(crate) fn number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Monetary amounts are never negative
pub(crate) fn amount(value: Option<&Value>) -> f64 {
    number(value).max(0.0)
}

pub(crate) fn count(value: Option<&Value>) -> u64 {
    let n = number(value);
    if n > 0.0 {
        n.trunc() as u64
    } else {
        0
    }
}

/// Read a display string; numbers are rendered, blanks are dropped
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// Reduce a date or timestamp to an ISO `YYYY-MM-DD` string.
/// Unrecognised strings are kept as the server sent them.
pub(crate) fn iso_date(value: Option<&Value>) -> Option<String> {
    let raw = text(value)?;
    if NaiveDate::parse_from_str(&raw, "%Y-%m-%d").is_ok() {
        return Some(raw);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Some(ts.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Some(prefix) = raw.get(..10) {
        if NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() {
            return Some(prefix.to_string());
        }
    }
    Some(raw)
}
