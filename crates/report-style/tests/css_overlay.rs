use pretty_assertions::assert_eq;
use report_style::css::parse_rules;
use report_style::{Color, CssOverlay, RowStyleKey, StyleOverride};

#[test]
fn rules_for_row_classes_are_collected() {
    let overlay = CssOverlay::from_style_blocks([r#"
        /* generated */
        .ReportHeader td { color: #FFF; background-color: #336699; font-weight: bold; font-size: 10pt }
        .ReportItem { font-style: italic; }
    "#]);

    assert_eq!(
        overlay.row(RowStyleKey::ReportHeader),
        &StyleOverride {
            color: Some(Color::white()),
            background: Some(Color::from_rgb(0x336699)),
            bold: Some(true),
            italic: None,
            font_size_pt: Some(10.0),
        }
    );
    assert_eq!(overlay.row(RowStyleKey::ReportItem).italic, Some(true));
    assert!(overlay.row(RowStyleKey::ReportFooter).is_empty());
}

#[test]
fn last_matching_declaration_wins_across_blocks() {
    let overlay = CssOverlay::from_style_blocks([
        ".ReportItem { color: red }",
        ".ReportItem { color: blue }",
    ]);
    assert_eq!(
        overlay.row(RowStyleKey::ReportItem).color,
        Some(Color::from_rgb(0x0000FF))
    );
}

#[test]
fn inherit_and_transparent_keep_previous_value() {
    let overlay = CssOverlay::from_style_blocks([
        ".AlternatingItem { background-color: silver; color: green }",
        ".AlternatingItem { background-color: transparent; color: inherit; font-size: initial }",
    ]);
    let row = overlay.row(RowStyleKey::AlternatingItem);
    assert_eq!(row.background, Some(Color::from_rgb(0xC0C0C0)));
    assert_eq!(row.color, Some(Color::from_rgb(0x008000)));
    assert_eq!(row.font_size_pt, None);
}

#[test]
fn unknown_color_names_fall_back_to_black() {
    let overlay = CssOverlay::from_style_blocks([".ReportFooter { color: papayawhip }"]);
    assert_eq!(overlay.row(RowStyleKey::ReportFooter).color, Some(Color::black()));
}

#[test]
fn grouped_selectors_apply_to_each_class() {
    let overlay = CssOverlay::from_style_blocks([".ReportHeader, .ReportFooter { color: yellow }"]);
    let yellow = Some(Color::from_rgb(0xFFFF00));
    assert_eq!(overlay.row(RowStyleKey::ReportHeader).color, yellow);
    assert_eq!(overlay.row(RowStyleKey::ReportFooter).color, yellow);
    assert_eq!(overlay.row(RowStyleKey::ReportItem).color, None);
}

#[test]
fn table_border_beats_generic_cell_border() {
    let overlay = CssOverlay::from_style_blocks([
        "td { border: 1px solid #C0C0C0 }",
        ".ReportTable { border: 1px solid red }",
        "td { border-color: blue }",
    ]);
    assert_eq!(overlay.border_color(), Some(Color::from_rgb(0xFF0000)));

    let cells_only = CssOverlay::from_style_blocks(["td, th { border: thin solid gray }"]);
    assert_eq!(cells_only.border_color(), Some(Color::gray()));
}

#[test]
fn empty_overlay_when_nothing_matches() {
    let overlay = CssOverlay::from_style_blocks(["body { color: red } .Other { color: blue }"]);
    assert!(overlay.is_empty());
    assert!(CssOverlay::from_style_blocks([]).is_empty());
}

#[test]
fn declarations_are_lowercased_and_important_stripped() {
    let rules = parse_rules("<!-- .X { COLOR: Red !important; } -->");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].declarations, vec![("color".to_string(), "Red".to_string())]);
}
