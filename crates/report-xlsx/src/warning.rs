use core::fmt;

use report_style::FormatClass;

use crate::sink::{ColNum, RowNum};

/// Something that degraded the output without stopping the conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionWarning {
    /// Cell text did not parse under its declared date/time class and was
    /// written as literal text.
    ParseFallback {
        row: RowNum,
        col: ColNum,
        format: FormatClass,
        text: String,
    },
    /// A MIME part's base64 body was malformed; the image is unavailable.
    DecodeFallback { content_id: String },
    /// An `<img src="cid:...">` had no matching MIME part.
    LookupMiss { content_id: String },
    /// The image bytes could not be embedded by the writer.
    UnsupportedImage { content_id: String, reason: String },
    /// Cell text exceeded the per-cell character limit and was cut.
    TruncatedText {
        row: RowNum,
        col: ColNum,
        chars: usize,
    },
    /// A row ran past the last worksheet column; the remaining cells were dropped.
    ColumnOverflow { row: RowNum, dropped: usize },
    /// Content reached past the last worksheet row and was dropped from there on.
    RowOverflow { row: RowNum },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::ParseFallback {
                row,
                col,
                format,
                text,
            } => write!(
                f,
                "row {row} col {col}: {text:?} is not a valid {} value, kept as text",
                format.class_name()
            ),
            ConversionWarning::DecodeFallback { content_id } => {
                write!(f, "image {content_id}: malformed base64 body")
            }
            ConversionWarning::LookupMiss { content_id } => {
                write!(f, "image {content_id}: no matching MIME part")
            }
            ConversionWarning::UnsupportedImage { content_id, reason } => {
                write!(f, "image {content_id}: {reason}")
            }
            ConversionWarning::TruncatedText { row, col, chars } => {
                write!(f, "row {row} col {col}: text of {chars} characters truncated")
            }
            ConversionWarning::ColumnOverflow { row, dropped } => {
                write!(f, "row {row}: {dropped} cell(s) past the last column dropped")
            }
            ConversionWarning::RowOverflow { row } => {
                write!(f, "row {row} is past the last worksheet row; remaining content dropped")
            }
        }
    }
}
