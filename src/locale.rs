//! Locale codecs: German decimal amounts and multi-format dates.
//!
//! SWIFT bodies carry amounts in German notation (comma decimal separator,
//! explicit sign for debits) and dates either as fixed `YYMMDD` strings or,
//! in German bank extracts, in a handful of loosely standardized layouts.

use crate::error::{Error, Result};
use crate::types::DebitCredit;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a German-notation amount with an optional leading sign.
///
/// The magnitude is always returned non-negative; the sign maps to the
/// credit/debit indicator (`-` means debit, absence or `+` means credit).
///
/// # Examples
///
/// ```
/// use swift_mt::locale::parse_signed_amount;
/// use swift_mt::types::DebitCredit;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let (value, dc) = parse_signed_amount("-100,00").unwrap();
/// assert_eq!(value, Decimal::from_str("100.00").unwrap());
/// assert_eq!(dc, DebitCredit::Debit);
/// ```
pub fn parse_signed_amount(s: &str) -> Result<(Decimal, DebitCredit)> {
    let s = s.trim();
    let (dc, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (DebitCredit::Debit, rest),
        None => (DebitCredit::Credit, s.strip_prefix('+').unwrap_or(s)),
    };

    let value = parse_unsigned_amount(magnitude)?;
    Ok((value, dc))
}

/// Parse a German-notation amount without a sign character.
pub fn parse_unsigned_amount(s: &str) -> Result<Decimal> {
    let normalized = s.trim().replace(',', ".");
    if normalized.is_empty() || normalized.starts_with('-') {
        return Err(Error::InvalidAmount(s.to_string()));
    }
    Decimal::from_str(&normalized).map_err(|_| Error::InvalidAmount(s.to_string()))
}

/// Format a magnitude plus credit/debit indicator back into German notation.
///
/// Debits get an explicit leading `-`; credits carry no sign.
pub fn format_signed_amount(value: &Decimal, dc: DebitCredit) -> String {
    match dc {
        DebitCredit::Debit => format!("-{}", format_amount(value)),
        DebitCredit::Credit => format_amount(value),
    }
}

/// Format a magnitude in German notation (comma decimal separator).
pub fn format_amount(value: &Decimal) -> String {
    value.to_string().replace('.', ",")
}

/// Expand a two-digit year using the interchange century pivot:
/// years up to 30 land in 20xx, everything above in 19xx.
pub fn expand_two_digit_year(yy: i32) -> i32 {
    if yy <= 30 {
        2000 + yy
    } else {
        1900 + yy
    }
}

/// Parse a SWIFT `YYMMDD` date.
pub fn parse_swift_date(s: &str) -> Result<NaiveDate> {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(s.to_string()));
    }
    let yy: i32 = s[0..2].parse().map_err(|_| Error::InvalidDate(s.to_string()))?;
    let month: u32 = s[2..4].parse().map_err(|_| Error::InvalidDate(s.to_string()))?;
    let day: u32 = s[4..6].parse().map_err(|_| Error::InvalidDate(s.to_string()))?;

    NaiveDate::from_ymd_opt(expand_two_digit_year(yy), month, day)
        .ok_or_else(|| Error::InvalidDate(s.to_string()))
}

/// Format a date as SWIFT `YYMMDD`.
pub fn format_swift_date(date: &NaiveDate) -> String {
    format!("{:02}{:02}{:02}", date.year() % 100, date.month(), date.day())
}

/// Format a date as a SWIFT `MMDD` entry date.
pub fn format_entry_date(date: &NaiveDate) -> String {
    format!("{:02}{:02}", date.month(), date.day())
}

/// Parse a SWIFT `MMDD` entry date, borrowing the year from the value date.
pub fn parse_entry_date(s: &str, year: i32) -> Result<NaiveDate> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(s.to_string()));
    }
    let month: u32 = s[0..2].parse().map_err(|_| Error::InvalidDate(s.to_string()))?;
    let day: u32 = s[2..4].parse().map_err(|_| Error::InvalidDate(s.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| Error::InvalidDate(s.to_string()))
}

/// Parse a date in any of the layouts German bank extracts use.
///
/// Formats are tried in a fixed order: `Y-m-d`, `d.m.Y`, `d.m.y`, `Ymd`,
/// `ymd`, `dmY`, `dmy`, `d/m/Y`, `d-m-Y`. Two-digit years use the same
/// century pivot as [`parse_swift_date`]. As a last resort, non-digit
/// characters are stripped and the compact digit layouts are retried.
pub fn parse_flexible_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d.%m.%Y") {
        return Ok(d);
    }
    if let Some(d) = try_dotted_short(s) {
        return Ok(d);
    }
    if let Some(d) = try_compact(s) {
        return Ok(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Ok(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d-%m-%Y") {
        return Ok(d);
    }

    // Free-text fallback: keep only digits and retry the compact layouts.
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 6 || digits.len() == 8 {
        if let Some(d) = try_compact(&digits) {
            return Ok(d);
        }
    }

    Err(Error::InvalidDate(s.to_string()))
}

/// `d.m.y` with a two-digit year; chrono's `%y` pivot differs from ours,
/// so the components are split by hand.
fn try_dotted_short(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 3 || parts[2].len() > 2 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let yy: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(expand_two_digit_year(yy), month, day)
}

/// Compact all-digit layouts, in order: `Ymd`, `ymd`, `dmY`, `dmy`.
fn try_compact(s: &str) -> Option<NaiveDate> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.len() {
        8 => {
            let ymd = || {
                let y: i32 = s[0..4].parse().ok()?;
                NaiveDate::from_ymd_opt(y, s[4..6].parse().ok()?, s[6..8].parse().ok()?)
            };
            let dmy = || {
                let y: i32 = s[4..8].parse().ok()?;
                NaiveDate::from_ymd_opt(y, s[2..4].parse().ok()?, s[0..2].parse().ok()?)
            };
            ymd().or_else(dmy)
        }
        6 => {
            let ymd = || {
                let yy: i32 = s[0..2].parse().ok()?;
                NaiveDate::from_ymd_opt(
                    expand_two_digit_year(yy),
                    s[2..4].parse().ok()?,
                    s[4..6].parse().ok()?,
                )
            };
            let dmy = || {
                let yy: i32 = s[4..6].parse().ok()?;
                NaiveDate::from_ymd_opt(
                    expand_two_digit_year(yy),
                    s[2..4].parse().ok()?,
                    s[0..2].parse().ok()?,
                )
            };
            ymd().or_else(dmy)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_amount_debit() {
        let (value, dc) = parse_signed_amount("-100,00").unwrap();
        assert_eq!(value, Decimal::from_str("100.00").unwrap());
        assert_eq!(dc, DebitCredit::Debit);
    }

    #[test]
    fn test_signed_amount_default_credit() {
        let (value, dc) = parse_signed_amount("100,00").unwrap();
        assert_eq!(value, Decimal::from_str("100.00").unwrap());
        assert_eq!(dc, DebitCredit::Credit);
    }

    #[test]
    fn test_signed_amount_explicit_plus() {
        let (_, dc) = parse_signed_amount("+12,50").unwrap();
        assert_eq!(dc, DebitCredit::Credit);
    }

    #[test]
    fn test_signed_amount_rejects_garbage() {
        assert!(parse_signed_amount("abc").is_err());
        assert!(parse_signed_amount("").is_err());
        assert!(parse_signed_amount("--1,00").is_err());
    }

    #[test]
    fn test_format_signed_amount() {
        let value = Decimal::from_str("100.00").unwrap();
        assert_eq!(format_signed_amount(&value, DebitCredit::Debit), "-100,00");
        assert_eq!(format_signed_amount(&value, DebitCredit::Credit), "100,00");
    }

    #[test]
    fn test_swift_date_century_boundary() {
        assert_eq!(parse_swift_date("300101").unwrap().year(), 2030);
        assert_eq!(parse_swift_date("310101").unwrap().year(), 1931);
    }

    #[test]
    fn test_swift_date_roundtrip() {
        let date = parse_swift_date("250512").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 5, 12).unwrap());
        assert_eq!(format_swift_date(&date), "250512");
    }

    #[test]
    fn test_swift_date_rejects_bad_input() {
        assert!(parse_swift_date("25051").is_err());
        assert!(parse_swift_date("2505AB").is_err());
        assert!(parse_swift_date("251332").is_err());
    }

    #[test]
    fn test_entry_date() {
        let d = parse_entry_date("0512", 2025).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 5, 12).unwrap());
        assert_eq!(format_entry_date(&d), "0512");
    }

    #[test]
    fn test_flexible_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 5, 12).unwrap();
        for input in [
            "2025-05-12",
            "12.05.2025",
            "12.05.25",
            "20250512",
            "250512",
            "12052025",
            "12/05/2025",
            "12-05-2025",
        ] {
            assert_eq!(parse_flexible_date(input).unwrap(), expected, "input {input}");
        }
    }

    #[test]
    fn test_flexible_date_compact_first_match_wins() {
        // Six compact digits are ambiguous; the year-first reading is
        // tried before day-first and wins when both are plausible.
        assert_eq!(
            parse_flexible_date("120525").unwrap(),
            NaiveDate::from_ymd_opt(2012, 5, 25).unwrap()
        );
    }

    #[test]
    fn test_flexible_date_century_pivot() {
        assert_eq!(parse_flexible_date("01.01.30").unwrap().year(), 2030);
        assert_eq!(parse_flexible_date("01.01.31").unwrap().year(), 1931);
    }

    #[test]
    fn test_flexible_date_free_text_fallback() {
        // Stray separators are stripped before the compact retry.
        let d = parse_flexible_date("2025 05 12").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 5, 12).unwrap());
    }

    #[test]
    fn test_flexible_date_rejects_nonsense() {
        assert!(parse_flexible_date("not a date").is_err());
        assert!(parse_flexible_date("99.99.9999").is_err());
    }
}
