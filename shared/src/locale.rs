//! Locale-aware number parsing and formatting
//!
//! Form inputs arrive as text typed with either `,` or `.` as the decimal
//! separator; reports render numbers with `.` thousands grouping and a `,`
//! decimal separator (`1.234,56`). The engine itself only ever sees `f64`.
//!
//! # Rules
//!
//! 1. **Comma present**: `,` is the decimal separator and `.` may only appear
//!    as a thousands separator in groups of three (`1.234,5`).
//! 2. **No comma**: `.` is the decimal separator (`71.2`).
//! 3. **Non-finite output**: formats as `-`.

use regex_lite::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn comma_decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(\d{1,3}(\.\d{3})+|\d+)(,\d+)?$").expect("comma decimal pattern is valid")
    })
}

fn dot_decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("dot decimal pattern is valid"))
}

/// Parse a decimal typed with either separator convention
pub fn parse_decimal(text: &str) -> Result<f64, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Value cannot be empty".to_string());
    }

    let normalized = if trimmed.contains(',') {
        if !comma_decimal_pattern().is_match(trimmed) {
            return Err(format!("Invalid number: {}", trimmed));
        }
        trimmed.replace('.', "").replace(',', ".")
    } else {
        if !dot_decimal_pattern().is_match(trimmed) {
            return Err(format!("Invalid number: {}", trimmed));
        }
        trimmed.to_string()
    };

    normalized
        .parse::<f64>()
        .map_err(|_| format!("Invalid number: {}", trimmed))
}

/// Format with `.` thousands grouping and `,` decimals
pub fn format_decimal(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match fraction {
        Some(f) => format!("{}{},{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// A number that reads and writes in the comma-decimal convention
///
/// `Display` honours the formatter precision and defaults to 2 decimals:
/// `format!("{:.1}", DecimalText(1234.56))` gives `1.234,6`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalText(pub f64);

impl fmt::Display for DecimalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = f.precision().unwrap_or(2);
        f.write_str(&format_decimal(self.0, decimals))
    }
}

impl FromStr for DecimalText {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s).map(DecimalText)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Serde helper for optional measurements sent as numbers or typed text
///
/// `null`, an absent field and a blank string all read as `None`. Text that
/// is not a number reads as NaN, so validation rejects it under the field's
/// own name instead of failing the whole document.
pub fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        None => None,
        Some(NumberOrText::Number(value)) => Some(value),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => None,
        Some(NumberOrText::Text(text)) => Some(parse_decimal(&text).unwrap_or(f64::NAN)),
    })
}

/// Serde helper for whole-number inputs such as age
///
/// Follows [`deserialize_optional_decimal`]; fractions are truncated.
/// Anything that is not a finite number in `i32` range reads as 0, which
/// validation rejects by name.
pub fn deserialize_optional_whole<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_optional_decimal(deserializer)?;
    Ok(value.map(|v| {
        let whole = v.trunc();
        if whole.is_finite() && whole >= i32::MIN as f64 && whole <= i32::MAX as f64 {
            whole as i32
        } else {
            0
        }
    }))
}

/// Serde helper for diet-table cells
///
/// Numbers and locale text are accepted; `null`, blank and unreadable
/// cells count as 0.
pub fn deserialize_cell<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_decimal(deserializer)?
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}
