//! Display formatting for calculator outputs.
//!
//! Values are rendered the way an en-US locale renders them: comma thousands
//! separators, a fixed number of fraction digits, and ties rounded away from zero.
//! Rounding is done on the exact value of the `f64` via `rust_decimal`.

use rust_decimal::prelude::*;

/// Formats a number with thousands separators and exactly `digits` fraction digits.
pub fn format_number(value: f64, digits: u32) -> String {
    if let Some(special) = non_finite(value) {
        return special.to_string();
    }
    let body = group_thousands(&round_fixed(value.abs(), digits));
    if value < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

/// Formats a dollar amount, e.g. `$1,234.56` or `-$1,234.56`.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    match non_finite(value) {
        Some(_) if value.is_nan() => "$NaN".to_string(),
        Some(_) => format!("{sign}$∞"),
        None => format!("{sign}${}", group_thousands(&round_fixed(value.abs(), 2))),
    }
}

/// Formats a fraction as a percentage with two decimals, e.g. `0.1234` as `12.34%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value * 100.0, 2))
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("∞")
    } else if value == f64::NEG_INFINITY {
        Some("-∞")
    } else {
        None
    }
}

/// Rounds a non-negative finite value to `digits` places and renders it without grouping.
fn round_fixed(value: f64, digits: u32) -> String {
    let precision = digits as usize;
    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let rounded =
                exact.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
            format!("{rounded:.precision$}")
        }
        // Outside the decimal range; plain float formatting is exact enough there.
        None => format!("{value:.precision$}"),
    }
}

fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_and_signs() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(-1234.567), "-$1,234.57");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(f64::INFINITY), "$∞");
    }

    #[test]
    fn number_respects_digit_count() {
        assert_eq!(format_number(333.333333, 2), "333.33");
        assert_eq!(format_number(12345.6789, 0), "12,346");
        assert_eq!(format_number(0.5, 4), "0.5000");
        assert_eq!(format_number(-9876543.21, 1), "-9,876,543.2");
        assert_eq!(format_number(f64::NAN, 2), "NaN");
    }

    #[test]
    fn ties_round_away_from_zero_on_exact_values() {
        // 0.125 is exactly representable, so this is a genuine tie.
        assert_eq!(format_number(0.125, 2), "0.13");
        assert_eq!(format_number(2.5, 0), "3");
        // 1.005 is stored slightly below the tie.
        assert_eq!(format_number(1.005, 2), "1.00");
    }

    #[test]
    fn percent_scales_by_one_hundred() {
        assert_eq!(format_percent(0.1234), "12.34%");
        assert_eq!(format_percent(-0.05), "-5.00%");
        assert_eq!(format_percent(12.5), "1,250.00%");
    }
}
