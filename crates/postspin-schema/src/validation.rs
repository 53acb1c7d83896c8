//! Shared validation helpers and the [`StageOutput`] contract.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::str::FromStr;
use strum::VariantNames;

/// Structured output of one model stage.
pub trait StageOutput: DeserializeOwned + Sized {
    /// JSON template appended to the stage instruction so the model knows the expected shape.
    const SHAPE: &'static str;

    /// Check domain rules serde cannot express and normalise fields in place.
    ///
    /// Returns every problem found rather than stopping at the first.
    fn validate(&mut self) -> Result<(), Vec<String>>;
}

/// Lower-case a label and fold `-` and spaces to `_`, so `"How-To"` reads as `how_to`.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Parse a label into one of a fixed set of variants, tolerating case and separators.
pub(crate) fn parse_label<T>(raw: &str) -> Result<T, String>
where
    T: FromStr + VariantNames,
{
    T::from_str(&normalize_label(raw)).map_err(|_| {
        format!(
            "unknown value '{raw}', expected one of: {}",
            T::VARIANTS.join(", ")
        )
    })
}

pub(crate) fn check_score(issues: &mut Vec<String>, field: &str, value: f64) {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        issues.push(format!("{field}: {value} is outside 0..=100"));
    }
}

pub(crate) fn check_non_empty(issues: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(format!("{field} is empty"));
    }
}

pub(crate) fn into_result(issues: Vec<String>) -> Result<(), Vec<String>> {
    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

/// Deserialize an index that models sometimes emit as `1.0` instead of `1`.
pub(crate) fn deserialize_index<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = number.as_i64() {
        return Ok(i);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(f as i64),
        _ => Err(de::Error::custom(format!(
            "expected an integer index, got {number}"
        ))),
    }
}
