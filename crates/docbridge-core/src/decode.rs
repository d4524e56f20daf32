//! Value decoders
//!
//! Pure functions that turn loosely-typed argument values into validated
//! domain values. `None` means "skip this mutation" unless the caller treats
//! the argument as mandatory.

use serde_json::Value;

use crate::model::{Color, PaddingQuad};

/// Decode a 3- or 6-digit hex color, with or without a leading `#`
///
/// Only strings decode. Surrounding whitespace is ignored and a 3-digit form
/// expands by duplicating each digit.
pub fn decode_color(value: Option<&Value>) -> Option<Color> {
    let raw = value?.as_str()?.trim();
    let hex = raw.strip_prefix('#').unwrap_or(raw);

    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    if !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Color::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
}

/// Decode box padding
///
/// A number yields four equal sides. A string is split on commas and every
/// part numerically coerced: one part applies to all sides, four parts are
/// top, right, bottom, left. Arrays of one or four numbers follow the same
/// rule. Any non-finite or negative side rejects the whole value.
pub fn decode_padding(value: Option<&Value>) -> Option<PaddingQuad> {
    let sides: Vec<f64> = match value? {
        Value::Null => return None,
        Value::Number(n) => vec![n.as_f64()?],
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) => s
            .split(',')
            .map(coerce_str)
            .collect::<Option<Vec<_>>>()?,
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => coerce_str(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?,
        Value::Bool(_) | Value::Object(_) => return None,
    };

    if sides.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return None;
    }

    match sides.as_slice() {
        [all] => Some(PaddingQuad::uniform(*all)),
        [top, right, bottom, left] => Some(PaddingQuad {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        }),
        _ => None,
    }
}

/// Decode a finite number
///
/// Null, absent and the empty string never decode; everything else is
/// numerically coerced and must be finite.
pub fn decode_finite_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => coerce_number(other).filter(|v| v.is_finite()),
    }
}

/// Decode a non-empty string label (ids, names, page selectors)
pub fn decode_label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Truthiness of a loose argument: null, false, 0, NaN and "" are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text a loose argument renders as inside a message
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(v) => v.to_string(),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Loose numeric coercion of an arbitrary JSON value
///
/// Booleans become 0/1, strings follow [`coerce_str`]; null, arrays and
/// objects do not coerce.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => coerce_str(s),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Loose numeric coercion of a string
///
/// Whitespace-only strings coerce to 0. Accepts decimal literals with an
/// optional sign and exponent, `0x`/`0o`/`0b` integer literals and signed
/// `Infinity`. Anything else does not coerce.
pub fn coerce_str(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            // from_str_radix would also take a sign here
            if !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|v| v as f64);
        }
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn color(v: Value) -> Option<Color> {
        decode_color(Some(&v))
    }

    #[test]
    fn test_decode_color_forms() {
        assert_eq!(color(json!("#FF0000")), Some(Color::from_rgb8(255, 0, 0)));
        assert_eq!(color(json!("ff0000")), Some(Color::from_rgb8(255, 0, 0)));
        assert_eq!(color(json!("  #0f0 ")), Some(Color::from_rgb8(0, 255, 0)));
        assert_eq!(color(json!("abc")), Some(Color::from_rgb8(0xaa, 0xbb, 0xcc)));
    }

    #[test]
    fn test_decode_color_rejects() {
        assert_eq!(color(json!("#FF00")), None);
        assert_eq!(color(json!("#GG0000")), None);
        assert_eq!(color(json!("##FF0000")), None);
        assert_eq!(color(json!(16711680)), None);
        assert_eq!(color(json!(null)), None);
        assert_eq!(decode_color(None), None);
    }

    #[test]
    fn test_decode_padding() {
        assert_eq!(
            decode_padding(Some(&json!(5))),
            Some(PaddingQuad::uniform(5.0))
        );
        assert_eq!(
            decode_padding(Some(&json!("1,2,3,4"))),
            Some(PaddingQuad {
                top: 1.0,
                right: 2.0,
                bottom: 3.0,
                left: 4.0
            })
        );
        assert_eq!(
            decode_padding(Some(&json!(" 8 "))),
            Some(PaddingQuad::uniform(8.0))
        );
        assert_eq!(
            decode_padding(Some(&json!([4, 8, 4, 8]))).map(|p| p.right),
            Some(8.0)
        );
    }

    #[test]
    fn test_decode_padding_rejects() {
        assert_eq!(decode_padding(Some(&json!("1,2"))), None);
        assert_eq!(decode_padding(Some(&json!("1,2,3"))), None);
        assert_eq!(decode_padding(Some(&json!("a,b,c,d"))), None);
        assert_eq!(decode_padding(Some(&json!("-1"))), None);
        assert_eq!(decode_padding(Some(&json!(""))), None);
        assert_eq!(decode_padding(Some(&json!(null))), None);
        assert_eq!(decode_padding(Some(&json!({"top": 1}))), None);
        assert_eq!(decode_padding(None), None);
    }

    #[test]
    fn test_decode_finite_number() {
        assert_eq!(decode_finite_number(Some(&json!("3.5"))), Some(3.5));
        assert_eq!(decode_finite_number(Some(&json!(0.25))), Some(0.25));
        assert_eq!(decode_finite_number(Some(&json!(" 7 "))), Some(7.0));
        assert_eq!(decode_finite_number(Some(&json!(true))), Some(1.0));
        assert_eq!(decode_finite_number(Some(&json!(""))), None);
        assert_eq!(decode_finite_number(Some(&json!(null))), None);
        assert_eq!(decode_finite_number(Some(&json!("abc"))), None);
        assert_eq!(decode_finite_number(Some(&json!("Infinity"))), None);
        assert_eq!(decode_finite_number(Some(&json!([1]))), None);
        assert_eq!(decode_finite_number(None), None);
    }

    #[test]
    fn test_coerce_str() {
        assert_eq!(coerce_str("   "), Some(0.0));
        assert_eq!(coerce_str("0x10"), Some(16.0));
        assert_eq!(coerce_str("1e3"), Some(1000.0));
        assert_eq!(coerce_str(".5"), Some(0.5));
        assert_eq!(coerce_str("inf"), None);
        assert_eq!(coerce_str("nan"), None);
        assert_eq!(coerce_str("12px"), None);
    }

    #[test]
    fn test_radix_literals_take_no_sign() {
        assert_eq!(coerce_str("0x+1"), None);
        assert_eq!(coerce_str("0b-1"), None);
        assert_eq!(coerce_str("0x"), None);
        assert_eq!(coerce_str("0o17"), Some(15.0));
    }

    #[test]
    fn test_truthiness_and_display() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{}", falsy);
        }
        for truthy in [json!(true), json!(5), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{}", truthy);
        }

        assert_eq!(display_text(&json!(5)), "5");
        assert_eq!(display_text(&json!(1.5)), "1.5");
        assert_eq!(display_text(&json!(true)), "true");
        assert_eq!(display_text(&json!(["a", 1, null])), "a,1,");
        assert_eq!(display_text(&json!({"k": 1})), "[object Object]");
    }

    #[test]
    fn test_decode_label() {
        assert_eq!(decode_label(Some(&json!("1:2"))), Some("1:2".to_string()));
        assert_eq!(decode_label(Some(&json!(""))), None);
        assert_eq!(decode_label(Some(&json!(12))), None);
    }
}
