//! Canonical JSON rendering for chain hashing
//!
//! The rendering is byte-compatible with a Python-style
//! `json.dumps(value, sort_keys=True, default=str)`:
//!
//! - object keys sorted by code point
//! - `", "` and `": "` separators
//! - everything outside printable ASCII escaped as `\uXXXX` (UTF-16)
//! - floats in shortest round-trip form, exponent notation outside
//!   `1e-4 <= |x| < 1e16`
//!
//! Digests produced by other implementations of the same ledger therefore
//! verify here and vice versa.

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Convert any serializable value into a JSON tree.
///
/// Serialization failures do not propagate: the value is replaced by a
/// deterministic string describing the failure, so hashing stays total.
pub fn to_canonical_value<T: Serialize + ?Sized>(data: &T) -> Value {
    serde_json::to_value(data)
        .unwrap_or_else(|e| Value::String(format!("<unserializable: {}>", e)))
}

/// Render a JSON tree as canonical text.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::with_capacity(128);
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(out, map),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    out.push('{');
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_string(out, key);
        out.push_str(": ");
        if let Some(v) = map.get(key) {
            write_value(out, v);
        }
    }
    out.push('}');
}

fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else if let Some(f) = n.as_f64() {
        write_float(out, f);
    } else {
        out.push_str(&n.to_string());
    }
}

/// Shortest round-trip float text with Python `repr` layout.
fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
        return;
    }
    if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }
    if f == 0.0 {
        out.push_str(if f.is_sign_negative() { "-0.0" } else { "0.0" });
        return;
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "-1.25e-7".
    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    if f.is_sign_negative() {
        out.push('-');
    }

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() > int_len {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            } else {
                out.push_str(&digits);
                for _ in digits.len()..int_len {
                    out.push('0');
                }
                out.push_str(".0");
            }
        } else {
            out.push_str("0.");
            for _ in 0..(-exponent - 1) {
                out.push('0');
            }
            out.push_str(&digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        out.push_str(&format!("e{}{:02}", sign, exponent.abs()));
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_keys_are_sorted() {
        let value = json!({"zebra": 1, "apple": 2, "mango": {"b": 1, "a": 2}});
        assert_eq!(
            canonical_json(&value),
            r#"{"apple": 2, "mango": {"a": 2, "b": 1}, "zebra": 1}"#
        );
    }

    #[test]
    fn test_separators_and_primitives() {
        let value = json!([1, -2, true, false, null, "x"]);
        assert_eq!(canonical_json(&value), r#"[1, -2, true, false, null, "x"]"#);
        assert_eq!(canonical_json(&json!({})), "{}");
        assert_eq!(canonical_json(&json!([])), "[]");
    }

    #[test]
    fn test_non_ascii_is_escaped_as_utf16() {
        let value = json!("caf\u{e9} \u{1F600}");
        assert_eq!(canonical_json(&value), r#""caf\u00e9 \ud83d\ude00""#);
    }

    #[test]
    fn test_control_characters_escaped() {
        let value = json!("a\"b\\c\nd\te\u{01}\u{7f}");
        assert_eq!(
            canonical_json(&value),
            r#""a\"b\\c\nd\te\u0001\u007f""#
        );
    }

    #[test]
    fn test_float_layout() {
        let value = json!([
            1e16,
            1e15,
            0.0001,
            1e-05,
            123.0,
            -0.0,
            1.5e-07,
            12345678.9,
            2.5,
            -3.75
        ]);
        assert_eq!(
            canonical_json(&value),
            "[1e+16, 1000000000000000.0, 0.0001, 1e-05, 123.0, -0.0, 1.5e-07, 12345678.9, 2.5, -3.75]"
        );
    }

    #[test]
    fn test_large_unsigned_integer() {
        let value = json!(u64::MAX);
        assert_eq!(canonical_json(&value), u64::MAX.to_string());
    }

    #[test]
    fn test_unserializable_falls_back_to_string() {
        // Maps keyed by sequences cannot be represented as JSON objects.
        let mut map: HashMap<Vec<u8>, u8> = HashMap::new();
        map.insert(vec![1, 2], 3);

        let value = to_canonical_value(&map);
        assert!(value.is_string());
        assert_eq!(value, to_canonical_value(&map));
    }
}
