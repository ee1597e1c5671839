//! Small pure helpers used by the management page: numeric checks,
//! title casing and JSON validation.

use serde_json::Value;
use thiserror::Error;

/// Why a piece of text is not JSON
#[derive(Debug, Error)]
pub enum JsonCheckError {
    #[error("empty input")]
    Empty,
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
}

/// Anything that can be read as a floating point number
pub trait NumericLike {
    fn as_float(&self) -> Option<f64>;
}

impl NumericLike for str {
    fn as_float(&self) -> Option<f64> {
        self.trim().parse::<f64>().ok()
    }
}

impl NumericLike for String {
    fn as_float(&self) -> Option<f64> {
        self.as_str().as_float()
    }
}

impl NumericLike for f64 {
    fn as_float(&self) -> Option<f64> {
        Some(*self)
    }
}

impl NumericLike for f32 {
    fn as_float(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl NumericLike for i64 {
    fn as_float(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl NumericLike for i32 {
    fn as_float(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl NumericLike for Value {
    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.as_float(),
            _ => None,
        }
    }
}

impl<T: NumericLike + ?Sized> NumericLike for &T {
    fn as_float(&self) -> Option<f64> {
        (**self).as_float()
    }
}

/// True when `value` reads as a finite number.
///
/// Numeric strings such as `"3.14"` are accepted; `inf`, `NaN` and
/// anything that does not parse in full are not.
pub fn is_numeric<T: NumericLike + ?Sized>(value: &T) -> bool {
    value.as_float().is_some_and(f64::is_finite)
}

/// Lower-case the text, then upper-case the first character of every
/// whitespace-delimited word
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut word_start = true;

    for c in text.chars() {
        if c.is_whitespace() {
            word_start = true;
            result.push(c);
        } else if word_start {
            word_start = false;
            result.extend(c.to_uppercase());
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

/// Parse `text` as JSON, rejecting the empty string up front
pub fn parse_json(text: &str) -> Result<Value, JsonCheckError> {
    if text.is_empty() {
        return Err(JsonCheckError::Empty);
    }
    Ok(serde_json::from_str(text)?)
}

/// Predicate form of [`parse_json`].
///
/// Valid JSON that happens to be falsy (`null`, `0`, `false`) still counts.
pub fn is_json(text: &str) -> bool {
    match parse_json(text) {
        Ok(_) => true,
        Err(e) => {
            tracing::trace!("Rejected JSON input: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_accepts_numbers() {
        assert!(is_numeric("42"));
        assert!(is_numeric("3.14"));
        assert!(is_numeric(&-1));
        assert!(is_numeric(" 7 "));
        assert!(is_numeric(&serde_json::json!(12.5)));
        assert!(is_numeric(&serde_json::json!("0")));
    }

    #[test]
    fn test_is_numeric_rejects_non_finite() {
        assert!(!is_numeric("abc"));
        assert!(!is_numeric(&f64::INFINITY));
        assert!(!is_numeric(&f64::NAN));
        assert!(!is_numeric("Infinity"));
        assert!(!is_numeric("NaN"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("12abc"));
        assert!(!is_numeric(&serde_json::json!(true)));
        assert!(!is_numeric(&Value::Null));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("the quick BROWN fox"), "The Quick Brown Fox");
        assert_eq!(title_case("waveshare"), "Waveshare");
        assert_eq!(title_case("  two  spaces"), "  Two  Spaces");
        assert_eq!(title_case("(mtr) light-RAIL"), "(mtr) Light-rail");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(r#"{"a":1}"#));
        assert!(!is_json(""));
        assert!(!is_json("{bad json"));
        assert!(is_json("null"));
        assert!(is_json("0"));
        assert!(is_json("false"));
    }

    #[test]
    fn test_parse_json_reports_reason() {
        assert!(matches!(parse_json(""), Err(JsonCheckError::Empty)));
        assert!(matches!(parse_json("{"), Err(JsonCheckError::Syntax(_))));
        assert_eq!(parse_json("[1,2]").unwrap(), serde_json::json!([1, 2]));
    }
}
