use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use report_style::FormatClass;

/// A typed cell value ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
    Currency(BigDecimal),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }
}

/// Result of classifying one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedCell {
    pub value: CellValue,
    /// Catalog number-format string; `None` keeps the default format.
    pub number_format: Option<&'static str>,
    /// Set when the text failed to parse under this declared format class and
    /// was stored as literal text instead.
    pub parse_fallback: Option<FormatClass>,
}

impl TypedCell {
    pub(crate) fn new(value: CellValue, number_format: Option<&'static str>) -> Self {
        Self {
            value,
            number_format,
            parse_fallback: None,
        }
    }
}
