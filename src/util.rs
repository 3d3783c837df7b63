// Utility helpers for parsing and number formatting.
//
// This module centralizes all the "dirty" dataset field handling so the
// pipeline can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use serde::de::{self, Deserializer, Visitor};
use std::fmt;

/// Placeholder the movie dataset uses for unknown values.
const MISSING: &str = "N/A";

/// Date layouts seen in movie datasets, most common first.
const DATE_FORMATS: [&str; 4] = ["%d %b %Y", "%Y-%m-%d", "%B %d, %Y", "%m/%d/%Y"];

/// Trim a field and map empty or `N/A` values to `None`.
pub fn non_missing(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case(MISSING) {
        return None;
    }
    Some(s)
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    non_missing(s)?.parse::<i32>().ok()
}

/// Parse currency text such as `$292,568,851` into whole units.
///
/// - Strips `$` and `,` anywhere in the value.
/// - Reads the leading run of digits and ignores anything after it, so
///   `"$1,200 (est.)"` yields `1200`.
/// - Returns `None` when no digits lead the value (`"N/A"`, `"unknown"`, `"-5"`).
pub fn parse_currency_safe(s: Option<&str>) -> Option<u64> {
    let s = non_missing(s)?;
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    let digits: String = cleaned
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = non_missing(s)?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// First entry of a `", "`-separated genre list, or an empty string.
pub fn primary_genre(s: Option<&str>) -> String {
    non_missing(s)
        .and_then(|g| g.split(", ").next())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Deserialize a text-ish field that may arrive as a string, a number, a
/// boolean or null. Datasets disagree on whether `Year` is `"2010"` or `2010`.
pub fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, number or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(TextVisitor)
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
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
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
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
    fn currency_strips_symbols_and_separators() {
        assert_eq!(parse_currency_safe(Some("$292,568,851")), Some(292_568_851));
        assert_eq!(parse_currency_safe(Some(" $100 ")), Some(100));
        assert_eq!(parse_currency_safe(Some("$0")), Some(0));
    }

    #[test]
    fn currency_reads_leading_digits_only() {
        assert_eq!(parse_currency_safe(Some("$1,200 (est.)")), Some(1200));
        assert_eq!(parse_currency_safe(Some("N/A")), None);
        assert_eq!(parse_currency_safe(Some("unknown")), None);
        assert_eq!(parse_currency_safe(Some("-5")), None);
        assert_eq!(parse_currency_safe(None), None);
    }

    #[test]
    fn year_parse_rejects_ranges_and_text() {
        assert_eq!(parse_i32_safe(Some(" 2010 ")), Some(2010));
        assert_eq!(parse_i32_safe(Some("2010–2012")), None);
        assert_eq!(parse_i32_safe(Some("twenty ten")), None);
        assert_eq!(parse_i32_safe(Some("")), None);
    }

    #[test]
    fn dates_accept_several_layouts() {
        let expected = NaiveDate::from_ymd_opt(2010, 7, 16);
        assert_eq!(parse_date_safe(Some("16 Jul 2010")), expected);
        assert_eq!(parse_date_safe(Some("2010-07-16")), expected);
        assert_eq!(parse_date_safe(Some("July 16, 2010")), expected);
        assert_eq!(parse_date_safe(Some("07/16/2010")), expected);
        assert_eq!(parse_date_safe(Some("sometime in 2010")), None);
        assert_eq!(parse_date_safe(Some("N/A")), None);
    }

    #[test]
    fn primary_genre_splits_on_comma_space() {
        assert_eq!(primary_genre(Some("Drama, War")), "Drama");
        assert_eq!(primary_genre(Some("Comedy")), "Comedy");
        assert_eq!(primary_genre(Some("N/A")), "");
        assert_eq!(primary_genre(None), "");
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(0.0, 1), "0.0");
        assert_eq!(format_int(9855), "9,855");
    }
}
