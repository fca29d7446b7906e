use swimmer_table::Value;

/// Numeric coercion with the loose semantics spreadsheet authors expect.
///
/// Blank text is `0`, numeric text is parsed, booleans are `1`/`0`, everything else
/// (missing cells, dates, words) is `NaN`.
pub(crate) fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Null | Value::DateTime(_) => f64::NAN,
    }
}

/// `true` for values a spreadsheet author would read as "not set": null, blank text, `0`,
/// `NaN` and `false`.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Number(n) => *n == 0.0 || n.is_nan(),
        Value::String(s) => s.is_empty(),
        Value::Boolean(b) => !b,
        Value::DateTime(_) => false,
    }
}

pub(crate) fn to_text(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_coerce_like_a_spreadsheet_author_expects() {
        assert_eq!(to_number(&Value::from("")), 0.0);
        assert_eq!(to_number(&Value::from(" 4.5 ")), 4.5);
        assert_eq!(to_number(&Value::Boolean(true)), 1.0);
        assert!(to_number(&Value::from("dashed")).is_nan());
        assert!(to_number(&Value::Null).is_nan());
    }

    #[test]
    fn falsy_values() {
        assert!(is_falsy(&Value::Null));
        assert!(is_falsy(&Value::from("")));
        assert!(is_falsy(&Value::Number(0.0)));
        assert!(is_falsy(&Value::Number(f64::NAN)));
        assert!(!is_falsy(&Value::from("0")));
        assert!(!is_falsy(&Value::Number(12.0)));
    }
}
