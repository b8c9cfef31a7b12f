//! Loose numeric coercion of untyped JSON values.
//!
//! Follows the ECMAScript `Number(value)` conversion so that a metrics body
//! produced for browser clients decodes to the same numbers here. Values
//! that do not convert yield `NaN`; coercion never fails.

use serde_json::Value;

/// Convert an optional JSON value to a number. A missing value is `NaN`.
pub fn js_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or_else(|| string_to_number(&n.to_string())),
        Some(Value::String(s)) => string_to_number(s),
        Some(v @ Value::Array(_)) => string_to_number(&primitive_string(v)),
        Some(Value::Object(_)) => f64::NAN,
    }
}

/// String form of a value as an array join would produce it.
fn primitive_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(primitive_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// `Number(string)`: trimmed; empty is zero; `Infinity` and radix prefixes
/// are accepted; anything else must be a plain decimal literal.
pub fn string_to_number(input: &str) -> f64 {
    let s = input.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(n) = parse_radix_literal(s) {
        return n;
    }

    if !is_decimal_literal(s) {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// `0x..`, `0o..`, `0b..` (unsigned). Returns `Some(NaN)` for a known prefix
/// with bad digits.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let mut acc = 0.0_f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => acc = acc * f64::from(radix) + f64::from(d),
            None => return Some(f64::NAN),
        }
    }
    Some(acc)
}

/// `[+-] (digits [. digits?] | . digits) ([eE] [+-] digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    if matches!(chars.peek(), Some('+' | '-')) {
        chars.next();
    }

    let mut int_digits = 0;
    while chars.next_if(char::is_ascii_digit).is_some() {
        int_digits += 1;
    }

    let mut frac_digits = 0;
    if chars.next_if_eq(&'.').is_some() {
        while chars.next_if(char::is_ascii_digit).is_some() {
            frac_digits += 1;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if chars.next_if(|c| matches!(c, 'e' | 'E')).is_some() {
        if matches!(chars.peek(), Some('+' | '-')) {
            chars.next();
        }
        let mut exp_digits = 0;
        while chars.next_if(char::is_ascii_digit).is_some() {
            exp_digits += 1;
        }
        if exp_digits == 0 {
            return false;
        }
    }

    chars.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn num(v: Value) -> f64 {
        js_number(Some(&v))
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(num(json!(1234)), 1234.0);
        assert_eq!(num(json!(5.6)), 5.6);
        assert_eq!(num(json!(-0.5)), -0.5);
    }

    #[test]
    fn out_of_range_literals_overflow_to_infinity() {
        let body: Value = serde_json::from_str(r#"[1e400, -1e400, 1e-400]"#).expect("valid json");
        assert_eq!(num(body[0].clone()), f64::INFINITY);
        assert_eq!(num(body[1].clone()), f64::NEG_INFINITY);
        assert_eq!(num(body[2].clone()), 0.0);
    }

    #[test]
    fn numeric_strings() {
        assert_eq!(num(json!("1234")), 1234.0);
        assert_eq!(num(json!("5.6")), 5.6);
        assert_eq!(num(json!("  42\n")), 42.0);
        assert_eq!(num(json!(".5")), 0.5);
        assert_eq!(num(json!("5.")), 5.0);
        assert_eq!(num(json!("+3")), 3.0);
        assert_eq!(num(json!("1e3")), 1000.0);
        assert_eq!(num(json!("1.5E-1")), 0.15);
    }

    #[test]
    fn empty_and_blank_strings_are_zero() {
        assert_eq!(num(json!("")), 0.0);
        assert_eq!(num(json!("   ")), 0.0);
    }

    #[test]
    fn infinity_spellings() {
        assert_eq!(num(json!("Infinity")), f64::INFINITY);
        assert_eq!(num(json!("+Infinity")), f64::INFINITY);
        assert_eq!(num(json!("-Infinity")), f64::NEG_INFINITY);
        assert!(num(json!("infinity")).is_nan());
        assert!(num(json!("inf")).is_nan());
    }

    #[test]
    fn radix_prefixes() {
        assert_eq!(num(json!("0x1F")), 31.0);
        assert_eq!(num(json!("0o17")), 15.0);
        assert_eq!(num(json!("0b101")), 5.0);
        assert!(num(json!("0x")).is_nan());
        assert!(num(json!("0xZZ")).is_nan());
        assert!(num(json!("-0x10")).is_nan());
    }

    #[test]
    fn non_numeric_strings_are_nan() {
        for s in ["abc", "12abc", "1,234", "NaN", "nan", "1e", ".", "+", "1_000", "$5"] {
            assert!(num(json!(s)).is_nan(), "{s:?} should be NaN");
        }
    }

    #[test]
    fn null_bool_missing() {
        assert_eq!(num(json!(null)), 0.0);
        assert_eq!(num(json!(true)), 1.0);
        assert_eq!(num(json!(false)), 0.0);
        assert!(js_number(None).is_nan());
    }

    #[test]
    fn arrays_coerce_through_join() {
        assert_eq!(num(json!([])), 0.0);
        assert_eq!(num(json!([7])), 7.0);
        assert_eq!(num(json!(["  8 "])), 8.0);
        assert_eq!(num(json!([[9]])), 9.0);
        assert_eq!(num(json!([null])), 0.0);
        assert!(num(json!([1, 2])).is_nan());
        assert!(num(json!([true])).is_nan());
    }

    #[test]
    fn objects_are_nan() {
        assert!(num(json!({})).is_nan());
        assert!(num(json!({"value": 1})).is_nan());
    }

    proptest! {
        #[test]
        fn finite_numbers_survive_string_round_trip(x in proptest::num::f64::NORMAL) {
            prop_assert_eq!(string_to_number(&x.to_string()), x);
        }

        #[test]
        fn padding_does_not_change_result(x in -1.0e9_f64..1.0e9) {
            let padded = format!(" \t{x}\n ");
            prop_assert_eq!(string_to_number(&padded), x);
        }
    }
}
