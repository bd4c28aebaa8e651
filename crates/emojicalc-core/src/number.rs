//! Decimal parsing and display formatting.
//!
//! Operands arrive as user-entered text and results are shown back as text.
//! Parsing is strict and locale independent; formatting keeps 14 significant
//! digits so that float noise such as `59.110000000000003` displays as
//! `59.11`.

/// Significant digits kept when formatting a number for display.
pub const DISPLAY_PRECISION: usize = 14;

/// Parses a locale-independent decimal number.
///
/// Surrounding whitespace is ignored. Accepted forms are an optional sign,
/// digits with an optional fraction (or a bare fraction such as `.5`), and
/// an optional exponent. Words like `inf` or `nan`, hexadecimal, thousands
/// separators and values that overflow to infinity are rejected.
///
/// # Example
///
/// ```
/// use emojicalc_core::number::parse_decimal;
///
/// assert_eq!(parse_decimal(" 102.43 "), Some(102.43));
/// assert_eq!(parse_decimal("-1e3"), Some(-1000.0));
/// assert_eq!(parse_decimal("ten"), None);
/// ```
#[must_use]
pub fn parse_decimal(input: &str) -> Option<f64> {
    let trimmed = input.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\0'));
    if !is_decimal_literal(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        frac_digits = count_digits(&bytes[pos..]);
        pos += frac_digits;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exp_digits = count_digits(&bytes[pos..]);
        if exp_digits == 0 {
            return false;
        }
        pos += exp_digits;
    }

    pos == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Formats a number for display with 14 significant digits.
///
/// Trailing zeros are removed, whole numbers have no fractional part, and
/// very large or very small magnitudes switch to `1.5E+20` style.
///
/// # Example
///
/// ```
/// use emojicalc_core::number::format_number;
///
/// assert_eq!(format_number(102.43 - 43.32), "59.11");
/// assert_eq!(format_number(100.0), "100");
/// assert_eq!(format_number(1.0 / 3.0), "0.33333333333333");
/// assert_eq!(format_number(1.0e25), "1.0E+25");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounds once, to DISPLAY_PRECISION significant digits.
    let scientific = format!("{:.*e}", DISPLAY_PRECISION - 1, value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if value.is_sign_negative() { "-" } else { "" };

    #[allow(clippy::cast_possible_wrap)]
    let precision = DISPLAY_PRECISION as i32;

    if exponent < -4 || exponent >= precision {
        let significant = digits.trim_end_matches('0');
        let (lead, rest) = significant.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{lead}.{rest}E{exp_sign}{}", exponent.unsigned_abs());
    }

    let (integer, fraction) = if exponent >= 0 {
        #[allow(clippy::cast_sign_loss)]
        let split = exponent as usize + 1;
        let (integer, fraction) = digits.split_at(split);
        (integer.to_string(), fraction.to_string())
    } else {
        let zeros = "0".repeat(exponent.unsigned_abs() as usize - 1);
        ("0".to_string(), format!("{zeros}{digits}"))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    }
}
