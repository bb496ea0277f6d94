use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pretty_assertions::assert_eq;
use report_style::{BorderStyle, Color, HorizontalAlignment, VerticalAlignment};
use report_xlsx::{
    convert_into, CellValue, ConversionWarning, ConvertError, ConvertOptions, ImageScale,
    RecordingSheet, SheetOp, StyleMode,
};

const SALES_Q1: &str = r#"<html><head><title>x</title></head><body>
<table><tr><td class="ReportTitle">Sales Q1</td></tr></table>
<div class="Description">Region: West</div>
<div report="Detail">
<table class="ReportTable">
  <tr class="ReportHeader"><th>Name</th><th>Units</th><th>Revenue</th></tr>
  <tr class="ReportItem"><td>Widgets</td><td>12</td><td>$1,234.56</td></tr>
</table>
</div>
</body></html>"#;

fn mime_part(content_id: &str, bytes: &[u8]) -> String {
    format!(
        "------=_NextPart_000\r\nContent-ID: <{content_id}>\r\nContent-Type: image/png\r\n\
         Content-Transfer-Encoding: base64\r\n\r\n{}\r\n\r\n",
        STANDARD.encode(bytes)
    )
}

fn convert(raw: &str, options: &ConvertOptions) -> (RecordingSheet, report_xlsx::ConversionReport) {
    let mut sheet = RecordingSheet::new();
    let report = convert_into(raw.as_bytes(), &mut sheet, options).unwrap();
    (sheet, report)
}

#[test]
fn title_description_spacer_then_data() {
    let (sheet, report) = convert(SALES_Q1, &ConvertOptions::default());

    assert_eq!(sheet.name(), Some("Sales Q1"));
    assert_eq!(report.sheet_name, "Sales Q1");
    assert_eq!(sheet.rows_written(), vec![0, 1, 3, 4]);
    assert_eq!(
        sheet.value_at(0, 0),
        Some(&CellValue::Text("Sales Q1".into()))
    );
    assert_eq!(
        sheet.value_at(1, 0),
        Some(&CellValue::Text("Region: West".into()))
    );
    assert_eq!(sheet.value_at(3, 0), Some(&CellValue::Text("Name".into())));
    assert_eq!(sheet.value_at(4, 1), Some(&CellValue::Number(12.0)));
    assert!(matches!(sheet.value_at(4, 2), Some(CellValue::Currency(_))));
    assert_eq!(report.rows_written, 6);
    assert!(report.warnings.is_empty());

    let title = sheet.style_at(0, 0).unwrap().font.as_ref().unwrap();
    assert!(title.bold);
    assert_eq!(title.size_pt(), Some(16.0));
    let description = sheet.style_at(1, 0).unwrap().font.as_ref().unwrap();
    assert_eq!(description.color, Some(Color::gray()));
    assert_eq!(description.size_pt(), Some(10.0));

    assert!(matches!(sheet.ops.last(), Some(SheetOp::Autofit { max_width }) if *max_width == 60.0));
}

#[test]
fn header_rows_are_styled_and_outlined() {
    let (sheet, _) = convert(SALES_Q1, &ConvertOptions::default());

    let header = sheet.style_at(3, 0).unwrap();
    let font = header.font.as_ref().unwrap();
    assert!(font.bold);
    assert_eq!(font.color, Some(Color::white()));
    assert_eq!(font.name.as_deref(), Some("Arial"));
    let border = header.border.as_ref().unwrap();
    assert_eq!(border.left, BorderStyle::Thin);
    assert_eq!(border.color, Some(Color::black()));

    let revenue = sheet.style_at(4, 2).unwrap();
    assert_eq!(revenue.number_format.as_deref(), Some("$#,##0.00"));
    let alignment = revenue.alignment.as_ref().unwrap();
    assert_eq!(alignment.horizontal, Some(HorizontalAlignment::Left));
    assert_eq!(alignment.vertical, Some(VerticalAlignment::Top));
}

#[test]
fn fixed_mode_has_no_outline() {
    let options = ConvertOptions {
        style_mode: StyleMode::Fixed,
        ..ConvertOptions::default()
    };
    let (sheet, _) = convert(SALES_Q1, &options);
    let item = sheet.style_at(4, 0).unwrap();
    assert_eq!(item.border, None);
    assert_eq!(item.font.as_ref().unwrap().name, None);
}

#[test]
fn css_overrides_row_colors_and_border() {
    let raw = SALES_Q1.replace(
        "<title>x</title>",
        "<style>.ReportHeader { color: yellow; background-color: #102030 } \
         .ReportTable { border: 1px solid red }</style>",
    );
    let (sheet, _) = convert(&raw, &ConvertOptions::default());

    let header = sheet.style_at(3, 1).unwrap();
    assert_eq!(
        header.font.as_ref().unwrap().color,
        Some(Color::from_rgb(0xFFFF00))
    );
    assert_eq!(
        header.fill.as_ref().unwrap().background,
        Some(Color::from_rgb(0x102030))
    );
    assert_eq!(
        header.border.as_ref().unwrap().color,
        Some(Color::from_rgb(0xFF0000))
    );
}

#[test]
fn unmatched_row_class_gets_only_defaults() {
    let raw = SALES_Q1.replace(r#"class="ReportItem""#, r#"class="Something""#);
    let options = ConvertOptions {
        style_mode: StyleMode::Fixed,
        ..ConvertOptions::default()
    };
    let (sheet, _) = convert(&raw, &options);

    let style = sheet.style_at(4, 0).unwrap();
    let font = style.font.as_ref().unwrap();
    assert_eq!(font.size_pt(), Some(8.0));
    assert_eq!(font.color, None);
    assert!(!font.bold);
    assert_eq!(style.fill, None);
    assert_eq!(style.border, None);
    assert_eq!(
        style.alignment.as_ref().unwrap().vertical,
        Some(VerticalAlignment::Top)
    );
}

#[test]
fn colspan_merges_and_shifts_columns() {
    let raw = r#"<html><body><table class="ReportTable">
      <tr class="ReportFooter"><td colspan="2" align="right">Total</td><td>$9.00</td></tr>
    </table></body></html>"#;
    let (sheet, _) = convert(raw, &ConvertOptions::default());

    let merge = sheet
        .ops
        .iter()
        .find_map(|op| match op {
            SheetOp::Merge {
                first_row,
                first_col,
                last_row,
                last_col,
                style,
            } => Some((*first_row, *first_col, *last_row, *last_col, style.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!((merge.0, merge.1, merge.2, merge.3), (0, 0, 0, 1));
    assert_eq!(merge.4.border.as_ref().unwrap().top, BorderStyle::Double);
    assert_eq!(
        merge.4.alignment.as_ref().unwrap().horizontal,
        Some(HorizontalAlignment::Right)
    );

    // No title or description: data starts at the top and the sheet gets the default name.
    assert_eq!(sheet.value_at(0, 0), Some(&CellValue::Text("Total".into())));
    assert!(matches!(sheet.value_at(0, 2), Some(CellValue::Currency(_))));
    assert_eq!(sheet.name(), Some("Report"));
}

#[test]
fn sections_are_separated_by_a_spacer() {
    let raw = r#"<html><body>
      <div report="First"><table class="ReportTable"><tr><td>a</td></tr></table></div>
      <div report="Second"><table class="ReportTable"><tr><td>b</td></tr></table></div>
    </body></html>"#;
    let (sheet, report) = convert(raw, &ConvertOptions::default());

    // First section: row 0, then its trailing spacer (1) and the leading spacer (2).
    assert_eq!(sheet.rows_written(), vec![0, 3]);
    assert_eq!(report.rows_written, 5);
}

#[test]
fn images_reserve_rows_and_are_scaled() {
    let raw = format!(
        r#"<html><body>
        <table><tr>
          <td><img src="cid:logo@01" width="1500" height="300"></td>
          <td class="ReportTitle">Charts</td>
        </tr></table>
        <div report="Chart1"><img src="cid:chart@01"></div>
        <div report="Detail"><table class="ReportTable"><tr><td>x</td></tr></table></div>
        </body></html>
{}{}------=_NextPart_000--
"#,
        mime_part("logo@01", b"logo-bytes"),
        mime_part("chart@01", b"chart-bytes"),
    );
    let (sheet, report) = convert(&raw, &ConvertOptions::default());

    assert_eq!(
        sheet.images(),
        vec![
            (
                0,
                0,
                ImageScale::Size {
                    width: 750.0,
                    height: 150.0
                }
            ),
            // logo: 10 rows + 1; title at 11; spacer at 12.
            (13, 0, ImageScale::Factor(0.5)),
        ]
    );
    assert_eq!(sheet.value_at(11, 0), Some(&CellValue::Text("Charts".into())));
    // chart: ceil(200 / 15) = 14 rows + 1, then the leading spacer.
    assert_eq!(sheet.value_at(29, 0), Some(&CellValue::Text("x".into())));
    assert_eq!(report.images_placed, 2);
    assert!(report.warnings.is_empty());
}

#[test]
fn nested_sections_write_their_table_once() {
    let raw = r#"<html><body>
      <div report="Detail"><table report="Inner" class="ReportTable"><tr><td>a</td></tr></table></div>
    </body></html>"#;
    let (sheet, report) = convert(raw, &ConvertOptions::default());

    assert_eq!(sheet.rows_written(), vec![0]);
    assert_eq!(report.rows_written, 2);
}

#[test]
fn blank_headings_take_no_rows() {
    let raw = SALES_Q1
        .replace(">Sales Q1<", ">&nbsp;<")
        .replace(">Region: West<", "> &nbsp; <");
    let (sheet, report) = convert(&raw, &ConvertOptions::default());

    assert_eq!(report.sheet_name, "Report");
    assert_eq!(sheet.rows_written(), vec![0, 1]);
    assert_eq!(sheet.value_at(0, 0), Some(&CellValue::Text("Name".into())));
}

#[test]
fn content_past_the_last_row_is_dropped_with_a_warning() {
    let raw = format!(
        "{}\r\n{}------=_NextPart_000--\r\n",
        SALES_Q1.replace(
            r#"<td class="ReportTitle">"#,
            r#"<td><img src="cid:tall@01" width="10" height="20000000"></td><td class="ReportTitle">"#,
        ),
        mime_part("tall@01", b"tall"),
    );
    let (sheet, report) = convert(&raw, &ConvertOptions::default());

    assert_eq!(sheet.images().len(), 1);
    assert!(sheet.rows_written().is_empty());
    assert_eq!(report.rows_written, 1_048_576);
    assert_eq!(
        report.warnings,
        vec![ConversionWarning::RowOverflow { row: 1_048_576 }]
    );
}

#[test]
fn malformed_image_is_omitted_not_fatal() {
    let raw = format!(
        "{}\r\n------=_NextPart_000\r\nContent-ID: <bad@01>\r\n\
         Content-Transfer-Encoding: base64\r\n\r\n!!!not base64***\r\n\r\n{}",
        SALES_Q1.replace(
            r#"<div report="Detail">"#,
            r#"<div report="Chart1"><img src="cid:bad@01"><img src="cid:missing@01"></div><div report="Detail">"#,
        ),
        mime_part("unused@01", b"x"),
    );
    let (sheet, report) = convert(&raw, &ConvertOptions::default());

    assert!(sheet.images().is_empty());
    // The chart had nothing to place, so the data still starts right after the header.
    assert_eq!(sheet.value_at(3, 0), Some(&CellValue::Text("Name".into())));
    assert_eq!(
        report.warnings,
        vec![
            ConversionWarning::DecodeFallback {
                content_id: "bad@01".into()
            },
            ConversionWarning::LookupMiss {
                content_id: "missing@01".into()
            },
        ]
    );
}

#[test]
fn unparseable_dates_are_reported() {
    let raw = SALES_Q1.replace("<td>12</td>", r#"<td class="xls-date">soon</td>"#);
    let (sheet, report) = convert(&raw, &ConvertOptions::default());

    assert_eq!(sheet.value_at(4, 1), Some(&CellValue::Text("soon".into())));
    assert_eq!(
        sheet.style_at(4, 1).unwrap().number_format.as_deref(),
        Some("@")
    );
    assert!(matches!(
        report.warnings.as_slice(),
        [ConversionWarning::ParseFallback { row: 4, col: 1, .. }]
    ));
}

#[test]
fn oversized_text_is_truncated() {
    let long = "y".repeat(40_000);
    let raw = SALES_Q1.replace("Widgets", &long);
    let (sheet, report) = convert(&raw, &ConvertOptions::default());

    let Some(CellValue::Text(text)) = sheet.value_at(4, 0) else {
        panic!("expected text");
    };
    assert_eq!(text.len(), 32_767);
    assert!(matches!(
        report.warnings.as_slice(),
        [ConversionWarning::TruncatedText { chars: 40_000, .. }]
    ));
}

#[test]
fn documents_without_tables_fail_structurally() {
    let mut sheet = RecordingSheet::new();
    let err = convert_into(
        b"<html><body><p>empty</p></body></html>",
        &mut sheet,
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::Structure(_)));
    assert!(sheet.ops.is_empty());
}
