//! Style catalog for converting HTML reports into spreadsheets.
//!
//! Three tables live here:
//! - [`FormatClass`]: `xls-*` class names that hint at a cell's data type, and
//!   the number format each implies.
//! - [`RowStyleRule`]: font/fill defaults for the four row classes
//!   (`ReportHeader`, `ReportItem`, `AlternatingItem`, `ReportFooter`).
//! - [`CssOverlay`]: per-document overrides scraped from `<style>` blocks.
//!
//! The defaults are process-wide and immutable; an overlay is built fresh for
//! each document and owned by its [`StyleCatalog`].

mod catalog;
mod color;
pub mod css;
mod format;
mod style;

pub use crate::catalog::{
    horizontal_alignment, RowStyleKey, RowStyleRule, StyleCatalog, TableStyle, CELL_FONT_FAMILY,
    DEFAULT_FONT_SIZE_PT, HEADER_FONT_SIZE_PT,
};
pub use crate::color::{parse_css_color, parse_known_color, Color, CssColor};
pub use crate::css::{CssOverlay, StyleOverride};
pub use crate::format::{
    excel_format_code, resolve_format, FormatClass, CURRENCY_FORMAT, PERCENT_FORMAT, TEXT_FORMAT,
};
pub use crate::style::{
    Alignment, Border, BorderStyle, CellStyle, Fill, Font, HorizontalAlignment, VerticalAlignment,
};
