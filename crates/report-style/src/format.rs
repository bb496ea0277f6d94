//! Format classes: `xls-*` CSS class names the report generator emits as
//! data-type hints, and the number format each one maps to.

use std::sync::OnceLock;

/// Format string that forces a cell to display its text literally.
pub const TEXT_FORMAT: &str = "@";
/// Format string applied to detected currency values.
pub const CURRENCY_FORMAT: &str = "$#,##0.00";
/// Format string applied to `xls-percent` values.
pub const PERCENT_FORMAT: &str = "0%";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FormatClass {
    Text,
    LongText,
    Percent,
    Date,
    Time,
    GeneralDate,
    LongDate,
    MediumDate,
    ShortDate,
    LongTime,
    MediumTime,
    ShortTime,
    YearMonth,
    MonthDay,
    DateTime,
    SortableDateTime,
}

impl FormatClass {
    /// Catalog order.
    pub const ALL: [FormatClass; 16] = [
        FormatClass::Text,
        FormatClass::LongText,
        FormatClass::Percent,
        FormatClass::Date,
        FormatClass::Time,
        FormatClass::GeneralDate,
        FormatClass::LongDate,
        FormatClass::MediumDate,
        FormatClass::ShortDate,
        FormatClass::LongTime,
        FormatClass::MediumTime,
        FormatClass::ShortTime,
        FormatClass::YearMonth,
        FormatClass::MonthDay,
        FormatClass::DateTime,
        FormatClass::SortableDateTime,
    ];

    /// The CSS class name carrying this hint.
    pub const fn class_name(self) -> &'static str {
        match self {
            FormatClass::Text => "xls-text",
            FormatClass::LongText => "xls-long-text",
            FormatClass::Percent => "xls-percent",
            FormatClass::Date => "xls-date",
            FormatClass::Time => "xls-time",
            FormatClass::GeneralDate => "xls-date-GeneralDateFormat",
            FormatClass::LongDate => "xls-date-LongDateFormat",
            FormatClass::MediumDate => "xls-date-MediumDateFormat",
            FormatClass::ShortDate => "xls-date-ShortDateFormat",
            FormatClass::LongTime => "xls-date-LongTimeFormat",
            FormatClass::MediumTime => "xls-date-MediumTimeFormat",
            FormatClass::ShortTime => "xls-date-ShortTimeFormat",
            FormatClass::YearMonth => "xls-date-YearMonthFormat",
            FormatClass::MonthDay => "xls-date-MonthDayFormat",
            FormatClass::DateTime => "xls-date-DateTimeFormat",
            FormatClass::SortableDateTime => "xls-date-SortableDateTimeFormat",
        }
    }

    /// The catalog format string. Named formats (`Short Date`, ...) are
    /// translated to format codes by [`excel_format_code`].
    pub const fn format_string(self) -> &'static str {
        match self {
            FormatClass::Text | FormatClass::LongText => TEXT_FORMAT,
            FormatClass::Percent => PERCENT_FORMAT,
            FormatClass::Date | FormatClass::ShortDate => "Short Date",
            FormatClass::Time | FormatClass::LongTime => "Long Time",
            FormatClass::GeneralDate => "General Date",
            FormatClass::LongDate => "Long Date",
            FormatClass::MediumDate => "Medium Date",
            FormatClass::MediumTime => "Medium Time",
            FormatClass::ShortTime => "Short Time",
            FormatClass::YearMonth => "mmmm yyyy",
            FormatClass::MonthDay => "mmmm d",
            FormatClass::DateTime => "m/d/yyyy h:mm:ss",
            FormatClass::SortableDateTime => "yyyy-mm-dd\\Thh:mm:ss",
        }
    }

    pub const fn is_date_time(self) -> bool {
        !matches!(
            self,
            FormatClass::Text | FormatClass::LongText | FormatClass::Percent
        )
    }

    pub const fn is_text(self) -> bool {
        matches!(self, FormatClass::Text | FormatClass::LongText)
    }
}

fn longest_first() -> &'static [FormatClass] {
    static SORTED: OnceLock<Vec<FormatClass>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut classes = FormatClass::ALL.to_vec();
        // Stable: equal-length names keep catalog order.
        classes.sort_by_key(|c| std::cmp::Reverse(c.class_name().len()));
        classes
    })
}

/// Find the format class named in a `class` attribute.
///
/// Matching is substring containment; when several catalog names occur, the
/// longest one wins (`xls-date-ShortDateFormat` over `xls-date`).
pub fn resolve_format(class_attr: &str) -> Option<FormatClass> {
    longest_first()
        .iter()
        .copied()
        .find(|c| class_attr.contains(c.class_name()))
}

/// Translate a catalog format string into a spreadsheet number-format code.
///
/// Named date/time formats become their `en-US` codes; every other string is
/// already a format code and is returned unchanged.
pub fn excel_format_code(format: &str) -> &str {
    match format {
        "General Date" => "m/d/yyyy h:mm:ss AM/PM",
        "Long Date" => "dddd, mmmm d, yyyy",
        "Medium Date" => "d-mmm-yy",
        "Short Date" => "m/d/yyyy",
        "Long Time" => "h:mm:ss AM/PM",
        "Medium Time" => "h:mm AM/PM",
        "Short Time" => "h:mm",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_are_unique() {
        let mut names: Vec<&str> = FormatClass::ALL.iter().map(|c| c.class_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FormatClass::ALL.len());
    }

    #[test]
    fn eleven_date_time_sub_variants() {
        let subs = FormatClass::ALL
            .iter()
            .filter(|c| c.class_name().starts_with("xls-date-"))
            .count();
        assert_eq!(subs, 11);
    }
}
