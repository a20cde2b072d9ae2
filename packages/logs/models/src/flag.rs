//! Normalization of `0`/`1` flag columns and form fields to `bool`.

use std::fmt;

use serde::Deserializer;
use serde::de::{self, Visitor};

/// Parses a textual flag.
///
/// Accepts `0`/`1`, `true`/`false` and `yes`/`no` in any case, with
/// surrounding whitespace ignored.
#[must_use]
pub fn parse(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Maps an integer flag to `bool`. Only `0` and `1` are valid.
#[must_use]
pub const fn from_int(value: i64) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// Deserializes a flag given as a JSON boolean, the integers `0`/`1`, or
/// the strings `"0"`/`"1"`.
///
/// Use with `#[serde(deserialize_with = "securecheck_log_models::flag::deserialize")]`.
///
/// # Errors
///
/// Returns a deserialization error for any other value.
pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlagVisitor)
}

struct FlagVisitor;

impl Visitor<'_> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, 0/1, or \"0\"/\"1\"")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        from_int(v).ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        i64::try_from(v)
            .ok()
            .and_then(from_int)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}
