//! Argument extraction and coercion for tool calls.
//!
//! Model output is loosely typed. A numeric argument may arrive as `800`,
//! `800.0`, `"800"`, `"800 lm"`, `"1,500 lumens"` or `"$4.99"`. Everything that
//! reduces to a single number with an optional currency prefix and unit
//! suffix is accepted; anything else is an error naming the argument.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

lazy_static! {
    /// Optional `$`, a decimal number, optional unit suffix such as `lm`, `m²` or `/kWh`.
    static ref NUMBER_WITH_UNIT: Regex = Regex::new(
        r"^\s*\$?\s*([-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?)\s*(?:[A-Za-z°²/$]+[A-Za-z°²/\s]*)?$"
    ).unwrap();

    /// A digit run grouped by thousands separators ("1,500", "1,500,000"),
    /// plus the character after it so "1,5000" is not mistaken for a group.
    static ref THOUSANDS: Regex = Regex::new(r"\b(\d{1,3}(?:,\d{3})+)(\D|$)").unwrap();
}

/// Parse a loosely formatted number.
pub fn coerce_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = THOUSANDS.replace_all(s, |caps: &Captures| {
                format!("{}{}", caps[1].replace(',', ""), &caps[2])
            });
            NUMBER_WITH_UNIT
                .captures(&cleaned)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Parse a loosely formatted non-negative whole number.
pub fn coerce_whole(raw: &Value) -> Option<u32> {
    if let Value::Number(n) = raw {
        if let Some(v) = n.as_u64() {
            return u32::try_from(v).ok();
        }
    }
    let v = coerce_number(raw)?;
    if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as u32)
    } else {
        None
    }
}

/// Typed accessors over a tool call's argument object.
pub struct Args<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    /// Required number.
    pub fn number(&self, key: &str) -> Result<f64, String> {
        let raw = self
            .present(key)
            .ok_or_else(|| format!("missing required argument `{}`", key))?;
        coerce_number(raw).ok_or_else(|| format!("`{}` is not a number: {}", key, raw))
    }

    /// Optional number with a fallback.
    pub fn number_or(&self, key: &str, default: f64) -> Result<f64, String> {
        match self.present(key) {
            Some(_) => self.number(key),
            None => Ok(default),
        }
    }

    /// Optional number without a fallback.
    pub fn number_opt(&self, key: &str) -> Result<Option<f64>, String> {
        match self.present(key) {
            Some(_) => self.number(key).map(Some),
            None => Ok(None),
        }
    }

    /// Required whole number.
    pub fn whole(&self, key: &str) -> Result<u32, String> {
        let raw = self
            .present(key)
            .ok_or_else(|| format!("missing required argument `{}`", key))?;
        coerce_whole(raw).ok_or_else(|| format!("`{}` is not a non-negative whole number: {}", key, raw))
    }

    /// Optional whole number with a fallback.
    pub fn whole_or(&self, key: &str, default: u32) -> Result<u32, String> {
        match self.present(key) {
            Some(_) => self.whole(key),
            None => Ok(default),
        }
    }

    /// Required string.
    pub fn text(&self, key: &str) -> Result<&'a str, String> {
        match self.present(key) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(format!("`{}` is not a string: {}", key, other)),
            None => Err(format!("missing required argument `{}`", key)),
        }
    }

    /// Optional string with a fallback.
    pub fn text_or(&self, key: &str, default: &'a str) -> Result<&'a str, String> {
        match self.present(key) {
            Some(_) => self.text(key),
            None => Ok(default),
        }
    }
}
