//! Best-effort scalar coercion for flat string values.

use super::types::ConfigValue;
use serde_json::Number;

/// Coerce a raw string into a boolean, number, or string.
///
/// The empty string is never coerced.
pub fn coerce(raw: &str) -> ConfigValue {
    match raw {
        "" => ConfigValue::String(String::new()),
        "true" => ConfigValue::Bool(true),
        "false" => ConfigValue::Bool(false),
        _ => parse_number(raw)
            .map(ConfigValue::Number)
            .unwrap_or_else(|| ConfigValue::String(raw.to_string())),
    }
}

/// Coerce string leaves, recursing into sequences.
///
/// Everything else is already typed and passes through unchanged.
pub fn coerce_value(value: ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::String(s) => coerce(&s),
        ConfigValue::Sequence(items) => {
            ConfigValue::Sequence(items.into_iter().map(coerce_value).collect())
        }
        other => other,
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    // f64 parsing accepts spellings like "inf" and "NaN"; only digits,
    // signs, a decimal point and an exponent make a numeric literal here.
    let numeric = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric || !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    if let Ok(n) = raw.parse::<i64>() {
        return Some(n.into());
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n.into());
    }
    let float = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    // `1e5` names an integer just as `100000` does.
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        return Some((float as i64).into());
    }
    Number::from_f64(float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booleans() {
        assert_eq!(coerce("true"), ConfigValue::Bool(true));
        assert_eq!(coerce("false"), ConfigValue::Bool(false));
        assert_eq!(coerce("TRUE"), ConfigValue::from("TRUE"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(coerce("8080").as_i64(), Some(8080));
        assert_eq!(coerce("-3").as_i64(), Some(-3));
        assert_eq!(coerce("2.75").as_f64(), Some(2.75));
        assert_eq!(coerce("1e3").as_i64(), Some(1000));
        assert_eq!(coerce(".5").as_f64(), Some(0.5));
    }

    #[test]
    fn test_integers_stay_integral() {
        let ConfigValue::Number(n) = coerce("8080") else {
            panic!("expected a number");
        };
        assert!(n.is_i64());
        assert_eq!(serde_json::to_string(&n).unwrap(), "8080");
    }

    #[test]
    fn test_integral_exponents_become_integers() {
        for (raw, expected) in [("1e5", "100000"), ("2.0", "2"), ("-1.5e1", "-15"), ("1.5", "1.5")] {
            let ConfigValue::Number(n) = coerce(raw) else {
                panic!("expected a number for {raw:?}");
            };
            assert_eq!(serde_json::to_string(&n).unwrap(), expected, "{raw:?}");
        }
    }

    #[test]
    fn test_non_numeric_strings_stay_strings() {
        for raw in ["plainstring", "inf", "NaN", "infinity", " 5", "1.2.3", "-", "e", "0x1f"] {
            assert_eq!(coerce(raw), ConfigValue::from(raw), "{raw:?}");
        }
    }

    #[test]
    fn test_empty_string_is_never_coerced() {
        assert_eq!(coerce(""), ConfigValue::String(String::new()));
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_round_trip_through_display() {
        let values = [
            ConfigValue::Bool(true),
            ConfigValue::Bool(false),
            ConfigValue::from(0),
            ConfigValue::from(-3),
            ConfigValue::Number(Number::from_f64(3.14).unwrap()),
            ConfigValue::from("plainstring"),
        ];
        for value in values {
            assert_eq!(coerce(&value.to_string()), value);
        }
    }

    #[test]
    fn test_coerce_value_recurses_into_sequences() {
        let value = ConfigValue::Sequence(vec!["1".into(), "x".into(), true.into()]);
        assert_eq!(
            coerce_value(value),
            ConfigValue::Sequence(vec![1.into(), "x".into(), true.into()])
        );
    }
}
