//! [`SheetSink`] backed by `rust_xlsxwriter`.

use std::collections::{HashMap, HashSet};

use bigdecimal::ToPrimitive;
use report_style::{
    excel_format_code, BorderStyle, CellStyle, Color, HorizontalAlignment, VerticalAlignment,
};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, FormatPattern, Image, Workbook, Worksheet};

use crate::serial::to_excel_serial;
use crate::sink::{ColNum, ImageScale, RowNum, SheetSink, SinkError};
use crate::value::CellValue;

/// A worksheet under construction.
///
/// Formats are cached per distinct [`CellStyle`], and the display width of
/// every non-merged cell is tracked so [`SheetSink::autofit_columns`] can size
/// columns without re-reading the sheet.
pub struct XlsxSheet {
    worksheet: Worksheet,
    formats: HashMap<CellStyle, Format>,
    widths: HashMap<ColNum, f64>,
    merged: HashSet<(RowNum, ColNum)>,
}

impl Default for XlsxSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxSheet {
    pub fn new() -> Self {
        Self {
            worksheet: Worksheet::new(),
            formats: HashMap::new(),
            widths: HashMap::new(),
            merged: HashSet::new(),
        }
    }

    /// Wrap the sheet in a single-sheet workbook.
    pub fn into_workbook(self) -> Workbook {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook
    }

    /// Serialize the single-sheet workbook to XLSX bytes.
    pub fn save_to_buffer(self) -> Result<Vec<u8>, SinkError> {
        let mut workbook = self.into_workbook();
        Ok(workbook.save_to_buffer()?)
    }

    fn format_for(&mut self, style: &CellStyle) -> Format {
        self.formats
            .entry(style.clone())
            .or_insert_with(|| build_format(style))
            .clone()
    }

    fn track_width(&mut self, row: RowNum, col: ColNum, width: f64) {
        if self.merged.contains(&(row, col)) {
            return;
        }
        let entry = self.widths.entry(col).or_insert(0.0);
        if width > *entry {
            *entry = width;
        }
    }
}

impl SheetSink for XlsxSheet {
    fn set_name(&mut self, name: &str) -> Result<(), SinkError> {
        self.worksheet.set_name(name)?;
        Ok(())
    }

    fn write_cell(
        &mut self,
        row: RowNum,
        col: ColNum,
        value: &CellValue,
        style: &CellStyle,
    ) -> Result<(), SinkError> {
        let format = self.format_for(style);
        match value {
            CellValue::Blank => {
                self.worksheet.write_blank(row, col, &format)?;
            }
            CellValue::Text(text) => {
                self.worksheet
                    .write_string_with_format(row, col, text, &format)?;
            }
            CellValue::Number(number) => {
                self.worksheet
                    .write_number_with_format(row, col, *number, &format)?;
            }
            CellValue::Currency(amount) => {
                let number = amount.to_f64().unwrap_or_default();
                self.worksheet
                    .write_number_with_format(row, col, number, &format)?;
            }
            CellValue::DateTime(datetime) => {
                self.worksheet.write_number_with_format(
                    row,
                    col,
                    to_excel_serial(*datetime),
                    &format,
                )?;
            }
        }
        self.track_width(row, col, display_width(value, style));
        Ok(())
    }

    fn merge_range(
        &mut self,
        first_row: RowNum,
        first_col: ColNum,
        last_row: RowNum,
        last_col: ColNum,
        style: &CellStyle,
    ) -> Result<(), SinkError> {
        let format = self.format_for(style);
        self.worksheet
            .merge_range(first_row, first_col, last_row, last_col, "", &format)?;
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                self.merged.insert((row, col));
            }
        }
        Ok(())
    }

    fn insert_image(
        &mut self,
        row: RowNum,
        col: ColNum,
        bytes: &[u8],
        scale: ImageScale,
    ) -> Result<(), SinkError> {
        let image =
            Image::new_from_buffer(bytes).map_err(|e| SinkError::UnsupportedImage(e.to_string()))?;
        let image = match scale {
            ImageScale::Size { width, height } => image.set_scale_to_size(width, height, false),
            ImageScale::Factor(factor) => image.set_scale_width(factor).set_scale_height(factor),
        };
        self.worksheet.insert_image(row, col, &image)?;
        Ok(())
    }

    fn autofit_columns(&mut self, max_width: f64) -> Result<(), SinkError> {
        let mut columns: Vec<(ColNum, f64)> = self.widths.iter().map(|(c, w)| (*c, *w)).collect();
        columns.sort_unstable_by_key(|(col, _)| *col);
        for (col, width) in columns {
            self.worksheet.set_column_width(col, width.min(max_width))?;
        }
        Ok(())
    }
}

fn xlsx_color(color: Color) -> rust_xlsxwriter::Color {
    rust_xlsxwriter::Color::RGB(color.rgb())
}

fn xlsx_border(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Double => FormatBorder::Double,
    }
}

fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if let Some(font) = &style.font {
        if let Some(name) = &font.name {
            format = format.set_font_name(name);
        }
        if let Some(size) = font.size_pt() {
            format = format.set_font_size(size);
        }
        if font.bold {
            format = format.set_bold();
        }
        if font.italic {
            format = format.set_italic();
        }
        if let Some(color) = font.color {
            format = format.set_font_color(xlsx_color(color));
        }
    }

    if let Some(background) = style.fill.as_ref().and_then(|f| f.background) {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(xlsx_color(background));
    }

    if let Some(border) = &style.border {
        if border.top != BorderStyle::None {
            format = format.set_border_top(xlsx_border(border.top));
        }
        if border.bottom != BorderStyle::None {
            format = format.set_border_bottom(xlsx_border(border.bottom));
        }
        if border.left != BorderStyle::None {
            format = format.set_border_left(xlsx_border(border.left));
        }
        if border.right != BorderStyle::None {
            format = format.set_border_right(xlsx_border(border.right));
        }
        if let Some(color) = border.color {
            let color = xlsx_color(color);
            format = format
                .set_border_top_color(color)
                .set_border_bottom_color(color)
                .set_border_left_color(color)
                .set_border_right_color(color);
        }
    }

    if let Some(alignment) = &style.alignment {
        format = match alignment.horizontal {
            Some(HorizontalAlignment::Left) => format.set_align(FormatAlign::Left),
            Some(HorizontalAlignment::Center) => format.set_align(FormatAlign::Center),
            Some(HorizontalAlignment::Right) => format.set_align(FormatAlign::Right),
            Some(HorizontalAlignment::General) | None => format,
        };
        format = match alignment.vertical {
            Some(VerticalAlignment::Top) => format.set_align(FormatAlign::Top),
            Some(VerticalAlignment::Center) => format.set_align(FormatAlign::VerticalCenter),
            Some(VerticalAlignment::Bottom) => format.set_align(FormatAlign::Bottom),
            None => format,
        };
        if alignment.wrap_text {
            format = format.set_text_wrap();
        }
    }

    if let Some(number_format) = &style.number_format {
        format = format.set_num_format(excel_format_code(number_format));
    }

    format
}

/// Approximate rendered width of a value in character units.
fn display_width(value: &CellValue, style: &CellStyle) -> f64 {
    let chars = match value {
        CellValue::Blank => 0,
        CellValue::Text(text) => text.lines().map(|l| l.chars().count()).max().unwrap_or(0),
        CellValue::Number(number) => number.to_string().len(),
        // `$#,##0.00`: sign, symbol, separators, two decimals.
        CellValue::Currency(amount) => {
            let digits = amount.with_scale(0).abs().to_string().len();
            digits + (digits.saturating_sub(1)) / 3 + 5
        }
        CellValue::DateTime(_) => style
            .number_format
            .as_deref()
            .map(|f| excel_format_code(f).len())
            .unwrap_or(10),
    };
    if chars == 0 {
        return 0.0;
    }
    let scale = style
        .font
        .as_ref()
        .and_then(|f| f.size_pt())
        .map(|pt| (pt / 11.0).max(0.6))
        .unwrap_or(1.0);
    chars as f64 * scale + 2.0
}
