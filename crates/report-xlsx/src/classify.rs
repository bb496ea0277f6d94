//! Cell classification: from a cell's text and `xls-*` format hints to a
//! typed value plus number format.
//!
//! First applicable rule wins:
//! 1. blank text (empty, whitespace, `&nbsp;`) is [`CellValue::Blank`];
//! 2. date/time classes parse a date serial, falling back to literal text;
//! 3. `xls-percent` parses `42.5%` as `0.425`, falling through on failure;
//! 4. text classes keep the text verbatim with the `@` format;
//! 5. text containing `$` is tried as currency;
//! 6. anything numeric becomes a number;
//! 7. everything else is plain text.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use report_style::{resolve_format, FormatClass, CURRENCY_FORMAT, PERCENT_FORMAT, TEXT_FORMAT};

use crate::serial::from_ole_serial;
use crate::value::{CellValue, TypedCell};

/// Format class of a cell: its own `class` attribute first, then the
/// first descendant `<div>` class that names one.
pub fn resolve_cell_format(cell_class: &str, div_classes: &[String]) -> Option<FormatClass> {
    resolve_format(cell_class).or_else(|| div_classes.iter().find_map(|c| resolve_format(c)))
}

/// Classify cell text under an optional format class.
pub fn classify(text: &str, format: Option<FormatClass>) -> TypedCell {
    if is_blank_text(text) {
        return TypedCell::new(CellValue::Blank, None);
    }

    if let Some(format) = format {
        if format.is_date_time() {
            return match parse_float(text).and_then(from_ole_serial) {
                Some(datetime) => {
                    TypedCell::new(CellValue::DateTime(datetime), Some(format.format_string()))
                }
                None => TypedCell {
                    value: CellValue::Text(text.to_owned()),
                    number_format: Some(TEXT_FORMAT),
                    parse_fallback: Some(format),
                },
            };
        }

        if format == FormatClass::Percent {
            if let Some(pct) = parse_percent(text) {
                return TypedCell::new(CellValue::Number(pct), Some(PERCENT_FORMAT));
            }
        } else if format.is_text() {
            return TypedCell::new(CellValue::Text(text.to_owned()), Some(TEXT_FORMAT));
        }
    }

    classify_heuristic(text)
}

/// Classify a cell straight from its attributes.
pub fn classify_cell(text: &str, cell_class: &str, div_classes: &[String]) -> TypedCell {
    classify(text, resolve_cell_format(cell_class, div_classes))
}

fn classify_heuristic(text: &str) -> TypedCell {
    if let Some(amount) = parse_currency(text) {
        return TypedCell::new(CellValue::Currency(amount), Some(CURRENCY_FORMAT));
    }
    if let Some(number) = parse_number(text) {
        return TypedCell::new(CellValue::Number(number), None);
    }
    TypedCell::new(CellValue::Text(text.to_owned()), None)
}

/// Empty, whitespace-only (including U+00A0) or a literal `&nbsp;`.
pub fn is_blank_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("&nbsp;")
}

fn parse_float(text: &str) -> Option<f64> {
    let value = text.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

fn parse_percent(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_number(number).map(|v| v / 100.0)
}

/// A decimal number, optionally with `,` thousands separators.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if !cleaned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    parse_float(&cleaned)
}

/// A `$` amount such as `$1,234.56`, `-$45.00`, `$-45` or `($45.00)`.
pub fn parse_currency(text: &str) -> Option<BigDecimal> {
    if !text.contains('$') {
        return None;
    }
    let mut cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    let mut negative = false;
    if let Some(inner) = cleaned
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
    {
        negative = true;
        cleaned = inner.to_owned();
    }
    if let Some(rest) = cleaned.strip_prefix('-') {
        negative = !negative;
        cleaned = rest.to_owned();
    } else if let Some(rest) = cleaned.strip_prefix('+') {
        cleaned = rest.to_owned();
    }

    let mut parts = cleaned.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next().unwrap_or_default();
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits_only(whole) || !digits_only(frac) {
        return None;
    }

    let amount = BigDecimal::from_str(&cleaned).ok()?;
    Some(if negative { -amount } else { amount })
}
