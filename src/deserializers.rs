//! Forgiving coercions for spreadsheet cell values.
//!
//! Spreadsheet columns are edited by hand, so a cell that "should" hold a
//! number may arrive as `"3"`, `3`, `3.0` or `"3 pax"`, and a text cell may
//! arrive as a number. These helpers accept all of those and never fail.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Renders a scalar cell as text. Integral floats print without a fraction
/// (`5.0` → `"5"`). Returns `None` for null, arrays and objects.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.is_finite() {
                        format!("{f:.0}")
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Trimmed text for an optional cell, `""` when absent or non-scalar.
pub fn trimmed_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(scalar_to_string)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Integer parse with leading-digit semantics: `"3 pax"` → 3, `"2.9"` → 2,
/// `" -1"` → -1, `"abc"` → `None`. Numbers are truncated toward zero.
pub fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let end = digits
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map(|(i, _)| i)
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

/// Headcount parse: anything that is not a positive integer becomes 1.
pub fn headcount_or_one(value: Option<&Value>) -> u32 {
    value
        .and_then(lenient_int)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1)
}

/// JavaScript-style truthiness, used when the proxy signals errors loosely.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Deserializes any scalar cell into a trimmed string; null or missing → `""`.
///
/// # Examples
///
/// ```json
/// { "Guest": 2 }        // "2"
/// { "Guest": "2 " }     // "2"
/// { "Guest": null }     // ""
/// ```
pub fn de_cell_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    Ok(trimmed_or_empty(opt.as_ref()))
}
