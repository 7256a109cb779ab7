//! Numeric extraction from the free-text columns of the pricing sheet.

use crate::{CoreError, Result};
use regex::Regex;
use std::sync::OnceLock;

static MEMORY_PREFIX: OnceLock<Regex> = OnceLock::new();
static FIRST_DECIMAL: OnceLock<Regex> = OnceLock::new();
static LEADING_INTEGER: OnceLock<Regex> = OnceLock::new();

fn memory_prefix_regex() -> &'static Regex {
    MEMORY_PREFIX.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)?").expect("valid memory regex"))
}

fn first_decimal_regex() -> &'static Regex {
    FIRST_DECIMAL.get_or_init(|| Regex::new(r"\d+\.?\d*").expect("valid decimal regex"))
}

fn leading_integer_regex() -> &'static Regex {
    LEADING_INTEGER.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("valid integer regex"))
}

/// Leading number of a memory string (`"0.5 GiB"` -> `"0.5"`), or the raw
/// string when it does not start with a digit.
pub fn memory_prefix(memory: &str) -> &str {
    memory_prefix_regex()
        .find(memory)
        .map(|m| m.as_str())
        .unwrap_or(memory)
}

/// First decimal number anywhere in `text` (`"0.0057 (25%)"` -> `0.0057`).
pub fn first_decimal(text: &str) -> Option<f64> {
    first_decimal_regex()
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Signed integer at the start of `raw` after trimming; trailing text is
/// ignored (`"2.0"` -> 2, `"30abc"` -> 30).
pub fn parse_integer(raw: &str) -> Result<i64> {
    leading_integer_regex()
        .find(raw.trim())
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .ok_or_else(|| CoreError::InvalidNumber(raw.to_string()))
}

pub fn parse_decimal(raw: &str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| CoreError::InvalidNumber(raw.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::InvalidNumber(raw.to_string()))
    }
}
