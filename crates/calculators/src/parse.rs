//! Text formats shared by the calculators: numeric prefixes, comma-separated
//! series and newline-separated row records.

use crate::error::CalcError;

/// Parses the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// Mirrors lenient decimal parsing: `"12.5%"` is `12.5`, `"1e3 units"` is `1000`,
/// `"Infinity"` is infinite, and text without a leading number is `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let sign = if s.starts_with('-') { -1.0 } else { 1.0 };
        return Some(sign * f64::INFINITY);
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // An exponent only counts when it carries at least one digit.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Splits comma-separated text into numbers, silently dropping tokens that are
/// not finite numbers.
pub fn parse_series(text: &str) -> Vec<f64> {
    text.split(',')
        .filter_map(|token| parse_number(token.trim()))
        .filter(|n| n.is_finite())
        .collect()
}

/// The non-blank lines of a multi-line block, trimmed.
pub fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Splits each non-blank line into exactly `fields` trimmed fields.
///
/// A line with any other field count fails the whole parse with
/// `Invalid format: <line>`.
pub fn parse_rows(text: &str, fields: usize) -> Result<Vec<Vec<&str>>, CalcError> {
    non_blank_lines(text)
        .map(|line| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() == fields {
                Ok(parts)
            } else {
                Err(invalid_row(line))
            }
        })
        .collect()
}

/// Like [`parse_rows`], but every field must also be a finite number.
pub fn parse_numeric_rows(text: &str, fields: usize) -> Result<Vec<Vec<f64>>, CalcError> {
    non_blank_lines(text)
        .map(|line| {
            let parts: Vec<f64> = line
                .split(',')
                .map(|p| parse_number(p.trim()).filter(|n| n.is_finite()))
                .collect::<Option<_>>()
                .ok_or_else(|| invalid_row(line))?;
            if parts.len() == fields {
                Ok(parts)
            } else {
                Err(invalid_row(line))
            }
        })
        .collect()
}

fn invalid_row(line: &str) -> CalcError {
    CalcError::malformed(format!("Invalid format: {line}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_prefixes() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("  -3.5"), Some(-3.5));
        assert_eq!(parse_number("12abc"), Some(12.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1e3x"), Some(1000.0));
        assert_eq!(parse_number("2e"), Some(2.0));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn series_drops_non_numeric_tokens() {
        assert_eq!(parse_series("100, 102, 101.5"), vec![100.0, 102.0, 101.5]);
        assert_eq!(parse_series("1, x, 3,,"), vec![1.0, 3.0]);
        assert!(parse_series("").is_empty());
    }

    #[test]
    fn rows_skip_blank_lines() {
        let rows = parse_numeric_rows("102,98,101\n\n  \n103,100,102\n", 3).unwrap();
        assert_eq!(rows, vec![vec![102.0, 98.0, 101.0], vec![103.0, 100.0, 102.0]]);
    }

    #[test]
    fn malformed_row_names_the_line() {
        let err = parse_numeric_rows("102,98,101\n103,100", 3).unwrap_err();
        assert_eq!(err.to_string(), "Invalid format: 103,100");

        let err = parse_numeric_rows("1,two,3", 3).unwrap_err();
        assert_eq!(err.to_string(), "Invalid format: 1,two,3");
    }

    #[test]
    fn text_rows_keep_labels() {
        let rows = parse_rows("Aave, 5.2, 0.1\nCompound,4.8,0.05", 3).unwrap();
        assert_eq!(rows[0], vec!["Aave", "5.2", "0.1"]);
        assert!(parse_rows("Aave,5.2", 3).is_err());
    }
}
