//! Places a located report onto a worksheet.
//!
//! A single row cursor moves down the sheet: header logos, title, description,
//! a spacer, then every section in document order. Data sections occupy one
//! sheet row per table row; images reserve an estimated number of rows based
//! on their pixel height.

use report_html::{CidImageRef, ReportRow, ReportSection, ReportStructure};
use report_mime::{normalize_content_id, MimeImages};
use report_style::{Alignment, CellStyle, Color, Font, StyleCatalog, VerticalAlignment};

use crate::classify::classify_cell;
use crate::sink::{ColNum, ImageScale, RowNum, SheetSink, SinkError, MAX_COL, MAX_ROW};
use crate::value::CellValue;
use crate::warning::ConversionWarning;

/// Maximum number of characters a cell can hold.
pub const MAX_CELL_TEXT_CHARS: usize = 32_767;

/// Tunables for the placement heuristic.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Wider images are scaled down proportionally to this width.
    pub max_image_width_px: f64,
    /// Pixel height of one sheet row when estimating image row spans.
    pub pixels_per_row: f64,
    /// Assumed height of an image with no declared height.
    pub default_image_height_px: f64,
    /// Scale applied to images with unknown dimensions.
    pub default_image_scale: f64,
    /// Upper bound for auto-sized column widths, in characters.
    pub max_column_width: f64,
    pub title_font_size_pt: f64,
    pub description_font_size_pt: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_image_width_px: 750.0,
            pixels_per_row: 15.0,
            default_image_height_px: 200.0,
            default_image_scale: 0.5,
            max_column_width: 60.0,
            title_font_size_pt: 16.0,
            description_font_size_pt: 10.0,
        }
    }
}

/// How an image is scaled and how many rows it reserves (spacer included).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImagePlacement {
    pub scale: ImageScale,
    pub rows: u32,
}

/// Work out the scale and row span of an image reference.
pub fn plan_image(image: &CidImageRef, config: &LayoutConfig) -> ImagePlacement {
    let (scale, height) = match image.dimensions() {
        Some((width, height)) => {
            let (width, height) = (f64::from(width), f64::from(height));
            let ratio = if width > config.max_image_width_px {
                config.max_image_width_px / width
            } else {
                1.0
            };
            (
                ImageScale::Size {
                    width: width * ratio,
                    height: height * ratio,
                },
                height * ratio,
            )
        }
        None => (
            ImageScale::Factor(config.default_image_scale),
            image
                .height
                .map(f64::from)
                .unwrap_or(config.default_image_height_px),
        ),
    };

    let span = (height / config.pixels_per_row)
        .ceil()
        .clamp(1.0, f64::from(MAX_ROW)) as u32;
    ImagePlacement {
        scale,
        rows: span + 1,
    }
}

/// What [`write_report`] produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutSummary {
    /// Final cursor position: the number of sheet rows the layout occupies.
    pub rows_used: RowNum,
    pub images_placed: usize,
    pub warnings: Vec<ConversionWarning>,
}

/// Write `report` onto `sink`.
///
/// Only sink failures are errors; everything recoverable ends up in
/// [`LayoutSummary::warnings`].
pub fn write_report<S: SheetSink>(
    sink: &mut S,
    report: &ReportStructure,
    images: &MimeImages,
    catalog: &StyleCatalog,
    config: &LayoutConfig,
) -> Result<LayoutSummary, SinkError> {
    let mut layout = Layout {
        sink,
        images,
        catalog,
        config,
        cursor: 0,
        overflowed: false,
        summary: LayoutSummary::default(),
    };
    layout.header(report)?;
    layout.sections(&report.sections)?;
    layout.sink.autofit_columns(config.max_column_width)?;

    layout.summary.rows_used = layout.cursor.min(MAX_ROW + 1);
    Ok(layout.summary)
}

struct Layout<'a, S> {
    sink: &'a mut S,
    images: &'a MimeImages,
    catalog: &'a StyleCatalog,
    config: &'a LayoutConfig,
    cursor: RowNum,
    /// Set once content has been dropped past the last row.
    overflowed: bool,
    summary: LayoutSummary,
}

impl<'a, S: SheetSink> Layout<'a, S> {
    fn header(&mut self, report: &ReportStructure) -> Result<(), SinkError> {
        let mut wrote_header = false;

        for image in &report.header_images {
            wrote_header |= self.place_image(image)?;
        }
        if !report.title.is_empty() {
            let style = heading_style(Font {
                bold: true,
                ..Font::with_size_pt(self.config.title_font_size_pt)
            });
            self.heading_row(&report.title, &style)?;
            wrote_header = true;
        }
        if !report.description.is_empty() {
            let style = heading_style(Font {
                color: Some(Color::gray()),
                ..Font::with_size_pt(self.config.description_font_size_pt)
            });
            self.heading_row(&report.description, &style)?;
            wrote_header = true;
        }

        if wrote_header {
            self.advance(1);
        }
        Ok(())
    }

    fn heading_row(&mut self, text: &str, style: &CellStyle) -> Result<(), SinkError> {
        if self.fits(self.cursor) {
            let value = self.text_value(self.cursor, 0, text);
            self.sink.write_cell(self.cursor, 0, &value, style)?;
        }
        self.advance(1);
        Ok(())
    }

    fn sections(&mut self, sections: &[ReportSection]) -> Result<(), SinkError> {
        let mut wrote_section = false;

        for section in sections {
            match section {
                ReportSection::Chart { name, images } => {
                    let available: Vec<&CidImageRef> =
                        images.iter().filter(|i| self.resolve(i).is_some()).collect();
                    self.record_misses(images);
                    if available.is_empty() {
                        log::debug!("chart section {name:?} has no usable images");
                        continue;
                    }
                    if wrote_section {
                        self.advance(1);
                    }
                    for image in available {
                        self.place_image(image)?;
                    }
                }
                ReportSection::Data { name, rows } => {
                    if wrote_section {
                        self.advance(1);
                    }
                    log::debug!("data section {name:?}: {} rows at row {}", rows.len(), self.cursor);
                    for (i, row) in rows.iter().enumerate() {
                        let sheet_row = self.cursor.saturating_add(i as RowNum);
                        if !self.fits(sheet_row) {
                            break;
                        }
                        self.data_row(sheet_row, row)?;
                    }
                    self.advance((rows.len() as RowNum).saturating_add(1));
                }
            }
            wrote_section = true;
        }
        Ok(())
    }

    fn data_row(&mut self, sheet_row: RowNum, row: &ReportRow) -> Result<(), SinkError> {
        let mut col: u32 = 0;

        for (index, cell) in row.cells.iter().enumerate() {
            let last_col = col.saturating_add(cell.colspan.max(1) - 1);
            if last_col > u32::from(MAX_COL) {
                let dropped = row.cells.len() - index;
                log::warn!("row {sheet_row}: {dropped} cell(s) past the last column dropped");
                self.summary
                    .warnings
                    .push(ConversionWarning::ColumnOverflow {
                        row: sheet_row,
                        dropped,
                    });
                break;
            }
            let (first, last) = (col as ColNum, last_col as ColNum);

            let typed = classify_cell(&cell.text, &cell.class, &cell.div_classes);
            if let Some(format) = typed.parse_fallback {
                log::warn!(
                    "row {sheet_row} col {first}: {:?} is not a valid {} value",
                    cell.text,
                    format.class_name()
                );
                self.summary
                    .warnings
                    .push(ConversionWarning::ParseFallback {
                        row: sheet_row,
                        col: first,
                        format,
                        text: cell.text.clone(),
                    });
            }

            let style = self
                .catalog
                .cell_style(&row.class, &cell.class, cell.align.as_deref())
                .with_number_format(typed.number_format);
            let value = match typed.value {
                CellValue::Text(text) => self.text_value(sheet_row, first, &text),
                other => other,
            };

            if last > first {
                self.sink
                    .merge_range(sheet_row, first, sheet_row, last, &style)?;
            }
            self.sink.write_cell(sheet_row, first, &value, &style)?;

            col = last_col + 1;
        }
        Ok(())
    }

    /// A text value cut to the per-cell limit.
    fn text_value(&mut self, row: RowNum, col: ColNum, text: &str) -> CellValue {
        let chars = text.chars().count();
        if chars <= MAX_CELL_TEXT_CHARS {
            return CellValue::Text(text.to_owned());
        }
        log::warn!("row {row} col {col}: text of {chars} characters truncated");
        self.summary
            .warnings
            .push(ConversionWarning::TruncatedText { row, col, chars });
        CellValue::Text(text.chars().take(MAX_CELL_TEXT_CHARS).collect())
    }

    fn resolve(&self, image: &CidImageRef) -> Option<&'a [u8]> {
        let images: &'a MimeImages = self.images;
        images.get(&image.content_id)
    }

    /// Record a lookup miss for every unresolvable image that did not already
    /// fail to decode.
    fn record_misses(&mut self, images: &[CidImageRef]) {
        for image in images {
            if self.resolve(image).is_none() {
                self.lookup_miss(image);
            }
        }
    }

    fn lookup_miss(&mut self, image: &CidImageRef) {
        let content_id = normalize_content_id(&image.content_id);
        if self.images.skipped().contains(&content_id) {
            return;
        }
        log::warn!("image {content_id}: no matching MIME part");
        self.summary
            .warnings
            .push(ConversionWarning::LookupMiss { content_id });
    }

    /// Insert one image at the cursor and advance past it. Returns whether the
    /// image was placed.
    fn place_image(&mut self, image: &CidImageRef) -> Result<bool, SinkError> {
        let Some(bytes) = self.resolve(image) else {
            self.lookup_miss(image);
            return Ok(false);
        };
        if !self.fits(self.cursor) {
            return Ok(false);
        }
        let placement = plan_image(image, self.config);

        match self.sink.insert_image(self.cursor, 0, bytes, placement.scale) {
            Ok(()) => {}
            Err(SinkError::UnsupportedImage(reason)) => {
                let content_id = normalize_content_id(&image.content_id);
                log::warn!("image {content_id}: {reason}");
                self.summary
                    .warnings
                    .push(ConversionWarning::UnsupportedImage { content_id, reason });
                return Ok(false);
            }
            Err(err) => return Err(err),
        }

        self.summary.images_placed += 1;
        self.advance(placement.rows);
        Ok(true)
    }

    fn advance(&mut self, rows: RowNum) {
        self.cursor = self.cursor.saturating_add(rows);
    }

    /// Whether `row` is on the sheet. The first miss records a warning; the
    /// rest of the content is dropped quietly.
    fn fits(&mut self, row: RowNum) -> bool {
        if row <= MAX_ROW {
            return true;
        }
        if !self.overflowed {
            self.overflowed = true;
            log::warn!("row {row} is past the last worksheet row; remaining content dropped");
            self.summary
                .warnings
                .push(ConversionWarning::RowOverflow { row });
        }
        false
    }
}

fn heading_style(font: Font) -> CellStyle {
    CellStyle {
        font: Some(font),
        alignment: Some(Alignment {
            vertical: Some(VerticalAlignment::Top),
            ..Alignment::default()
        }),
        ..CellStyle::default()
    }
}
