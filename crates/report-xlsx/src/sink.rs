//! The seam between layout and the spreadsheet writer.
//!
//! Layout code only talks to [`SheetSink`]. [`crate::XlsxSheet`] writes a real
//! workbook; [`RecordingSheet`] keeps the calls in memory so tests can assert
//! on exactly what was authored where.

use report_style::CellStyle;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::value::CellValue;

/// Zero-based worksheet row.
pub type RowNum = u32;
/// Zero-based worksheet column.
pub type ColNum = u16;

/// Last usable column index of a worksheet (`XFD`).
pub const MAX_COL: ColNum = 16_383;
/// Last usable row index of a worksheet.
pub const MAX_ROW: RowNum = 1_048_575;

/// How an inserted image is sized relative to its native pixel size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ImageScale {
    /// Stretch to exactly this many pixels.
    Size { width: f64, height: f64 },
    /// Multiply both native dimensions by this factor.
    Factor(f64),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
    /// The image bytes are not in a format the writer can embed.
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),
}

pub trait SheetSink {
    fn set_name(&mut self, name: &str) -> Result<(), SinkError>;

    fn write_cell(
        &mut self,
        row: RowNum,
        col: ColNum,
        value: &CellValue,
        style: &CellStyle,
    ) -> Result<(), SinkError>;

    /// Merge a rectangular range, applying `style` to every cell in it. The
    /// value is written separately to the top-left cell.
    fn merge_range(
        &mut self,
        first_row: RowNum,
        first_col: ColNum,
        last_row: RowNum,
        last_col: ColNum,
        style: &CellStyle,
    ) -> Result<(), SinkError>;

    fn insert_image(
        &mut self,
        row: RowNum,
        col: ColNum,
        bytes: &[u8],
        scale: ImageScale,
    ) -> Result<(), SinkError>;

    /// Size every used column to its content, capped at `max_width` characters.
    fn autofit_columns(&mut self, max_width: f64) -> Result<(), SinkError>;
}

/// One authoring call captured by [`RecordingSheet`].
#[derive(Clone, Debug, PartialEq)]
pub enum SheetOp {
    SetName(String),
    Cell {
        row: RowNum,
        col: ColNum,
        value: CellValue,
        style: CellStyle,
    },
    Merge {
        first_row: RowNum,
        first_col: ColNum,
        last_row: RowNum,
        last_col: ColNum,
        style: CellStyle,
    },
    Image {
        row: RowNum,
        col: ColNum,
        len: usize,
        scale: ImageScale,
    },
    Autofit {
        max_width: f64,
    },
}

/// In-memory [`SheetSink`].
#[derive(Clone, Debug, Default)]
pub struct RecordingSheet {
    pub ops: Vec<SheetOp>,
}

impl RecordingSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value written at `(row, col)`, if any.
    pub fn value_at(&self, row: RowNum, col: ColNum) -> Option<&CellValue> {
        self.cell_at(row, col).map(|(value, _)| value)
    }

    pub fn style_at(&self, row: RowNum, col: ColNum) -> Option<&CellStyle> {
        self.cell_at(row, col).map(|(_, style)| style)
    }

    fn cell_at(&self, row: RowNum, col: ColNum) -> Option<(&CellValue, &CellStyle)> {
        self.ops.iter().rev().find_map(|op| match op {
            SheetOp::Cell {
                row: r,
                col: c,
                value,
                style,
            } if *r == row && *c == col => Some((value, style)),
            _ => None,
        })
    }

    /// Rows that received at least one cell, ascending and deduplicated.
    pub fn rows_written(&self) -> Vec<RowNum> {
        let mut rows: Vec<RowNum> = self
            .ops
            .iter()
            .filter_map(|op| match op {
                SheetOp::Cell { row, .. } => Some(*row),
                _ => None,
            })
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    pub fn images(&self) -> Vec<(RowNum, ColNum, ImageScale)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SheetOp::Image {
                    row, col, scale, ..
                } => Some((*row, *col, *scale)),
                _ => None,
            })
            .collect()
    }

    pub fn name(&self) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            SheetOp::SetName(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl SheetSink for RecordingSheet {
    fn set_name(&mut self, name: &str) -> Result<(), SinkError> {
        self.ops.push(SheetOp::SetName(name.to_owned()));
        Ok(())
    }

    fn write_cell(
        &mut self,
        row: RowNum,
        col: ColNum,
        value: &CellValue,
        style: &CellStyle,
    ) -> Result<(), SinkError> {
        self.ops.push(SheetOp::Cell {
            row,
            col,
            value: value.clone(),
            style: style.clone(),
        });
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
        self.ops.push(SheetOp::Merge {
            first_row,
            first_col,
            last_row,
            last_col,
            style: style.clone(),
        });
        Ok(())
    }

    fn insert_image(
        &mut self,
        row: RowNum,
        col: ColNum,
        bytes: &[u8],
        scale: ImageScale,
    ) -> Result<(), SinkError> {
        self.ops.push(SheetOp::Image {
            row,
            col,
            len: bytes.len(),
            scale,
        });
        Ok(())
    }

    fn autofit_columns(&mut self, max_width: f64) -> Result<(), SinkError> {
        self.ops.push(SheetOp::Autofit { max_width });
        Ok(())
    }
}
