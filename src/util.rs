// Utility helpers for parsing, key joins, progress bars and number formatting.
//
// Spreadsheet cells arrive as loosely typed text; this module keeps the
// forgiving parsing in one place so the pipeline stages can work on clean
// `f64` values.
use crate::error::JoinMismatch;
use num_format::{Locale, ToFormattedString};
use std::collections::BTreeSet;

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace, including non-breaking spaces used as thousands
///   separators by French locales.
/// - Rejects values that contain alphabetic characters.
/// - A lone comma with no dot is read as a decimal comma (`12,5`);
///   otherwise commas are thousands separators and are stripped.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    let s: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    let s = if s.matches(',').count() == 1 && !s.contains('.') {
        s.replace(',', ".")
    } else {
        s.replace(',', "")
    };
    s.parse::<f64>().ok()
}

/// Inner-join two key sets. Returns the matched keys in sorted order plus
/// the keys each side had that the other did not.
pub fn inner_join<'a, L, R>(left: L, right: R) -> (Vec<&'a str>, JoinMismatch)
where
    L: IntoIterator<Item = &'a str>,
    R: IntoIterator<Item = &'a str>,
{
    let left: BTreeSet<&str> = left.into_iter().collect();
    let right: BTreeSet<&str> = right.into_iter().collect();
    let matched = left.intersection(&right).copied().collect();
    let mismatch = JoinMismatch {
        left_only: left.difference(&right).map(|s| s.to_string()).collect(),
        right_only: right.difference(&left).map(|s| s.to_string()).collect(),
    };
    (matched, mismatch)
}

/// Text progress bar of `width` cells, filled in proportion to `value / max`.
pub fn progress_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus locale-aware thousands
    // separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // `-0.00` reads as noise in a margin column.
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// `format_number` for optional ratios, rendering the sentinel as `N/A`.
pub fn format_optional(n: Option<f64>, decimals: usize) -> String {
    match n {
        Some(v) => format_number(v, decimals),
        None => "N/A".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_separated_numbers() {
        assert_eq!(parse_f64_safe(Some(" 42 ")), Some(42.0));
        assert_eq!(parse_f64_safe(Some("1,234.5")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("12,5")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("1\u{a0}234")), Some(1234.0));
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn inner_join_reports_both_sides() {
        let (matched, mismatch) = inner_join(["a", "b", "c"], ["b", "c", "d"]);
        assert_eq!(matched, vec!["b", "c"]);
        assert_eq!(mismatch.left_only, vec!["a".to_string()]);
        assert_eq!(mismatch.right_only, vec!["d".to_string()]);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_optional(None, 2), "N/A");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn progress_bar_is_clamped() {
        assert_eq!(progress_bar(5.0, 10.0, 10), "#####-----");
        assert_eq!(progress_bar(20.0, 10.0, 4), "####");
        assert_eq!(progress_bar(3.0, 0.0, 3), "---");
    }
}
