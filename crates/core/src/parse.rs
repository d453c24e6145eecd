//! Lenient numeric parsing for metric cells. Bad input degrades to zero.

/// Parse a floating-point cell. Missing, blank, malformed, or non-finite
/// text yields `0.0`.
pub fn parse_float(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse an integer cell. Decimal text is truncated toward zero
/// (`"12.7"` is 12); anything unparseable or outside `i64` yields `0`.
pub fn parse_int(raw: Option<&str>) -> i64 {
    let Some(s) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(v) = s.parse::<i64>() {
        return v;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 => v.trunc() as i64,
        _ => 0,
    }
}

/// Clamp an overflowed result to the largest finite value of the same
/// sign. NaN becomes `0.0`.
pub fn saturate(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else if v.is_nan() {
        0.0
    } else {
        f64::MAX.copysign(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(Some("2.5")), 2.5);
        assert_eq!(parse_float(Some(" 3 ")), 3.0);
        assert_eq!(parse_float(Some("-0.75")), -0.75);
        assert_eq!(parse_float(Some("")), 0.0);
        assert_eq!(parse_float(Some("n/a")), 0.0);
        assert_eq!(parse_float(None), 0.0);
    }

    #[test]
    fn test_parse_float_rejects_non_finite() {
        assert_eq!(parse_float(Some("NaN")), 0.0);
        assert_eq!(parse_float(Some("inf")), 0.0);
        assert_eq!(parse_float(Some("-infinity")), 0.0);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(Some("42")), 42);
        assert_eq!(parse_int(Some(" 7\t")), 7);
        assert_eq!(parse_int(Some("-3")), -3);
        assert_eq!(parse_int(Some("12.7")), 12);
        assert_eq!(parse_int(Some("-12.7")), -12);
        assert_eq!(parse_int(Some("300.0")), 300);
        assert_eq!(parse_int(Some("abc")), 0);
        assert_eq!(parse_int(Some("")), 0);
        assert_eq!(parse_int(None), 0);
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(1.5), 1.5);
        assert_eq!(saturate(f64::INFINITY), f64::MAX);
        assert_eq!(saturate(f64::NEG_INFINITY), -f64::MAX);
        assert_eq!(saturate(f64::NAN), 0.0);
    }

    #[test]
    fn test_parse_int_out_of_range() {
        assert_eq!(parse_int(Some("1e30")), 0);
        assert_eq!(parse_int(Some("NaN")), 0);
    }
}
