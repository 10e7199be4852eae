//! Pure helpers for reading typed options from a `serde_json::Value` object.
//!
//! The plain numeric and boolean helpers never fail: a missing key or a value
//! of the wrong type yields the default. Bounded numbers, colors and enum names
//! are different: a present value that is out of bounds or does not parse is an
//! error, never silently replaced.

use crate::color::Color;
use crate::error::{ParseError, ValidationError};
use serde_json::Value;
use std::str::FromStr;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only succeeds if the JSON value is a non-negative integer that fits in `u64`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

fn out_of_bounds(name: &str, value: impl ToString, expected: String) -> ValidationError {
    ValidationError::InvalidOption {
        option: name.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Reads a count in `[0, max]` from `params[name]`, returning `default` if the
/// key is missing or not a number. Negative, fractional and oversized numbers
/// are rejected.
pub fn param_count(params: &Value, name: &str, default: usize, max: usize) -> Result<usize, ValidationError> {
    let Some(value) = params.get(name).filter(|v| v.is_number()) else {
        return Ok(default);
    };
    value
        .as_u64()
        .and_then(|v| usize::try_from(v).ok())
        .filter(|&v| v <= max)
        .ok_or_else(|| out_of_bounds(name, value, format!("an integer in [0, {max}]")))
}

/// Reads a number in `(0, max]` from `params[name]`, returning `default` if the
/// key is missing or not a number.
pub fn param_positive(params: &Value, name: &str, default: f64, max: f64) -> Result<f64, ValidationError> {
    let value = param_f64(params, name, default);
    if value > 0.0 && value <= max {
        Ok(value)
    } else {
        Err(out_of_bounds(name, value, format!("a number in (0, {max}]")))
    }
}

/// The text of a present, non-null value; strings are taken verbatim, anything
/// else by its JSON rendering so that it fails to parse with a precise message.
fn present_text(params: &Value, name: &str) -> Option<String> {
    match params.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Parses a color literal from `params[name]`, returning `default` if the key
/// is missing or null.
pub fn param_color(params: &Value, name: &str, default: Color) -> Result<Color, ParseError> {
    match present_text(params, name) {
        Some(text) => Color::parse(&text),
        None => Ok(default),
    }
}

/// Parses `params[name]` with `T::from_str`, returning `default` if the key is
/// missing or null.
pub fn param_parsed<T: FromStr>(params: &Value, name: &str, default: T) -> Result<T, T::Err> {
    match present_text(params, name) {
        Some(text) => text.parse(),
        None => Ok(default),
    }
}
