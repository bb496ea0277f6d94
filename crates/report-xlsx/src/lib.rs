//! Convert generated HTML reports (`.xls`/`.mht` files holding HTML plus MIME
//! image parts) into XLSX workbooks.
//!
//! The pipeline for one document:
//! 1. decode the raw bytes and parse the HTML part ([`report_html`]);
//! 2. locate title, description, logos and sections;
//! 3. decode the embedded images ([`report_mime`]);
//! 4. classify and style every cell ([`classify`], [`report_style`]);
//! 5. lay everything out on one worksheet through a [`SheetSink`].
//!
//! Only structural problems (no data table, no rows) and I/O or writer
//! failures are errors. Everything else is reported as a
//! [`ConversionWarning`] and the conversion carries on.

pub mod classify;
mod layout;
mod output;
mod serial;
mod sheet_name;
mod sink;
mod value;
mod warning;
mod xlsx;

use std::io;
use std::path::{Path, PathBuf};

use report_html::{decode_document, locate, parse_document, LocateError};
use report_mime::extract_images;
use report_style::{CssOverlay, StyleCatalog};
use thiserror::Error;

pub use crate::classify::{classify, classify_cell, resolve_cell_format};
pub use crate::layout::{
    plan_image, write_report, ImagePlacement, LayoutConfig, LayoutSummary, MAX_CELL_TEXT_CHARS,
};
pub use crate::output::atomic_write_bytes;
pub use crate::serial::{from_ole_serial, to_excel_serial, to_ole_serial};
pub use crate::sheet_name::{sanitize_sheet_name, DEFAULT_SHEET_NAME, MAX_SHEET_NAME_LEN};
pub use crate::sink::{
    ColNum, ImageScale, RecordingSheet, RowNum, SheetOp, SheetSink, SinkError, MAX_COL, MAX_ROW,
};
pub use crate::value::{CellValue, TypedCell};
pub use crate::warning::ConversionWarning;
pub use crate::xlsx::XlsxSheet;

/// Which style sources apply to data cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StyleMode {
    /// Built-in row styles overridden by the document's `<style>` rules; every
    /// data cell also gets a thin outline in the table border color.
    #[default]
    Css,
    /// Built-in row styles only.
    Fixed,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvertOptions {
    pub layout: LayoutConfig,
    pub style_mode: StyleMode,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Structure(#[from] LocateError),
    #[error("io error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Xlsx(#[from] SinkError),
}

/// Outcome of one successful conversion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversionReport {
    pub sheet_name: String,
    /// Sheet rows occupied by the layout, spacer rows included.
    pub rows_written: u32,
    pub images_placed: usize,
    pub warnings: Vec<ConversionWarning>,
}

/// Convert one raw document onto `sink`.
pub fn convert_into<S: SheetSink>(
    raw: &[u8],
    sink: &mut S,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    let text = decode_document(raw);
    let document = parse_document(&text);
    let structure = locate(&document)?;
    log::debug!(
        "located {} section(s), {} header image(s)",
        structure.sections.len(),
        structure.header_images.len()
    );

    let images = extract_images(raw);
    let mut warnings: Vec<ConversionWarning> = images
        .skipped()
        .iter()
        .map(|content_id| ConversionWarning::DecodeFallback {
            content_id: content_id.clone(),
        })
        .collect();

    let catalog = match options.style_mode {
        StyleMode::Css => StyleCatalog::with_overlay(CssOverlay::from_style_blocks(
            structure.style_blocks.iter().map(String::as_str),
        )),
        StyleMode::Fixed => StyleCatalog::fixed(),
    };

    let sheet_name = sanitize_sheet_name(&structure.title);
    sink.set_name(&sheet_name)?;

    let summary = write_report(sink, &structure, &images, &catalog, &options.layout)?;
    warnings.extend(summary.warnings);

    Ok(ConversionReport {
        sheet_name,
        rows_written: summary.rows_used,
        images_placed: summary.images_placed,
        warnings,
    })
}

/// Convert one raw document into XLSX bytes.
pub fn convert_bytes(
    raw: &[u8],
    options: &ConvertOptions,
) -> Result<(Vec<u8>, ConversionReport), ConvertError> {
    let mut sheet = XlsxSheet::new();
    let report = convert_into(raw, &mut sheet, options)?;
    let bytes = sheet.save_to_buffer()?;
    Ok((bytes, report))
}

/// Convert the file at `input` and write the workbook to `output`.
///
/// The output is written atomically; on any error no file is left at
/// `output` (an existing one is kept as it was).
pub fn convert_path(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    let raw = std::fs::read(input).map_err(|source| ConvertError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let (bytes, report) = convert_bytes(&raw, options)?;
    atomic_write_bytes(output, &bytes).map_err(|source| ConvertError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    log::info!(
        "{} -> {} ({} warning(s))",
        input.display(),
        output.display(),
        report.warnings.len()
    );
    Ok(report)
}
