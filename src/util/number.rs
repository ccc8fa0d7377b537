//! Numeric conversion of XML text values.
//!
//! Values are parsed as IEEE 754 double precision, after trimming XML
//! whitespace. Integers are accepted only when the parsed double is finite,
//! has no fractional part and lies inside the range where every integer is
//! exactly representable, so `"9007199254740993"` (which silently rounds to
//! 2^53) is rejected instead of coming back off by one.

use crate::error::{FragmentError, Result};

/// Returns `true` if `s` is empty or contains only XML whitespace.
pub(crate) fn is_blank(s: &str) -> bool {
    trim_xml_whitespace(s).is_empty()
}

fn trim_xml_whitespace(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Returns `true` if `x` is an integer that survives a round trip through
/// `f64` arithmetic: finite, integral, and distinguishable from both of its
/// neighbours.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_exact_integer(x: f64) -> bool {
    if !x.is_finite() || x.fract() != 0.0 {
        return false;
    }
    x - 1.0 != x && x + 1.0 != x
}

/// Parses `s` as a floating-point number.
///
/// Infinity is only spelled `Infinity`, optionally signed; `inf` and `nan`
/// in any case are rejected.
///
/// # Errors
///
/// Returns [`FragmentError::ValueConversion`] if `s` is not numeric.
pub fn parse_float(s: &str) -> Result<f64> {
    let trimmed = trim_xml_whitespace(s);
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return match (unsigned, trimmed.starts_with('-')) {
            ("Infinity", false) => Ok(f64::INFINITY),
            ("Infinity", true) => Ok(f64::NEG_INFINITY),
            _ => Err(FragmentError::conversion(s, "a float")),
        };
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| FragmentError::conversion(s, "a float"))
}

/// Parses `s` as an exactly representable integer.
///
/// # Errors
///
/// Returns [`FragmentError::ValueConversion`] if `s` is not numeric, has a
/// fractional part, or is too large in magnitude to be represented exactly.
#[allow(clippy::cast_possible_truncation)]
pub fn parse_int(s: &str) -> Result<i64> {
    let num = parse_float(s).map_err(|_| FragmentError::conversion(s, "an integer"))?;
    if !is_exact_integer(num) {
        return Err(FragmentError::conversion(s, "an integer"));
    }
    // |num| < 2^53 here, so the cast is exact.
    Ok(num as i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_int_simple() {
        assert_eq!(parse_int("42").unwrap(), 42);
        assert_eq!(parse_int("-7").unwrap(), -7);
        assert_eq!(parse_int("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_int_trims_whitespace() {
        assert_eq!(parse_int(" 12\n").unwrap(), 12);
    }

    #[test]
    fn test_parse_int_exponent_form() {
        assert_eq!(parse_int("1e3").unwrap(), 1000);
        assert_eq!(parse_int("42.0").unwrap(), 42);
    }

    #[test]
    fn test_parse_int_rejects_fraction() {
        let err = parse_int("42.5").unwrap_err();
        assert!(matches!(err, FragmentError::ValueConversion { .. }));
    }

    #[test]
    fn test_parse_int_rejects_non_numeric() {
        assert!(parse_int("abc").is_err());
        assert!(parse_int("12abc").is_err());
        assert!(parse_int("").is_err());
    }

    #[test]
    fn test_parse_int_precision_boundary() {
        assert_eq!(parse_int("9007199254740991").unwrap(), 9_007_199_254_740_991);
        assert_eq!(
            parse_int("-9007199254740991").unwrap(),
            -9_007_199_254_740_991
        );
        assert!(parse_int("9007199254740992").is_err());
        assert!(parse_int("9007199254740993").is_err());
        assert!(parse_int("-9007199254740993").is_err());
        assert!(parse_int("1e300").is_err());
    }

    #[test]
    fn test_parse_int_rejects_infinity() {
        assert!(parse_int("inf").is_err());
        assert!(parse_int("-infinity").is_err());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("12.5").unwrap(), 12.5);
        assert_eq!(parse_float("-0.25").unwrap(), -0.25);
        assert_eq!(parse_float("3").unwrap(), 3.0);
        assert_eq!(parse_float("\t1.5 ").unwrap(), 1.5);
    }

    #[test]
    fn test_parse_float_rejects_nan() {
        assert!(parse_float("NaN").is_err());
        assert!(parse_float("twelve").is_err());
    }

    #[test]
    fn test_parse_float_infinity_spelling() {
        assert_eq!(parse_float("Infinity").unwrap(), f64::INFINITY);
        assert_eq!(parse_float("+Infinity").unwrap(), f64::INFINITY);
        assert_eq!(parse_float(" -Infinity ").unwrap(), f64::NEG_INFINITY);
        assert!(parse_float("inf").is_err());
        assert!(parse_float("INF").is_err());
        assert!(parse_float("infinity").is_err());
        assert!(parse_float("nan").is_err());
        assert!(parse_float("--5").is_err());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t"));
        assert!(!is_blank(" x "));
    }
}
