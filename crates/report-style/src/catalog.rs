use crate::css::CssOverlay;
use crate::style::{
    pt_to_100pt, Alignment, Border, BorderStyle, CellStyle, Fill, Font, HorizontalAlignment,
    VerticalAlignment,
};
use crate::Color;

pub const DEFAULT_FONT_SIZE_PT: f64 = 8.0;
pub const HEADER_FONT_SIZE_PT: f64 = 9.0;
/// Font family applied to every data cell when a CSS overlay is in effect.
pub const CELL_FONT_FAMILY: &str = "Arial";

/// Section classes the report generator puts on data rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RowStyleKey {
    ReportHeader,
    ReportItem,
    AlternatingItem,
    ReportFooter,
}

impl RowStyleKey {
    /// Catalog order; matching takes the first key found.
    pub const ALL: [RowStyleKey; 4] = [
        RowStyleKey::ReportHeader,
        RowStyleKey::ReportItem,
        RowStyleKey::AlternatingItem,
        RowStyleKey::ReportFooter,
    ];

    pub const fn class_name(self) -> &'static str {
        match self {
            RowStyleKey::ReportHeader => "ReportHeader",
            RowStyleKey::ReportItem => "ReportItem",
            RowStyleKey::AlternatingItem => "AlternatingItem",
            RowStyleKey::ReportFooter => "ReportFooter",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            RowStyleKey::ReportHeader => 0,
            RowStyleKey::ReportItem => 1,
            RowStyleKey::AlternatingItem => 2,
            RowStyleKey::ReportFooter => 3,
        }
    }

    /// First key (in catalog order) whose name is contained in `class_attr`.
    pub fn matching(class_attr: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| class_attr.contains(key.class_name()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowStyleRule {
    pub font_color: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub font_size_pt: f64,
}

impl RowStyleRule {
    /// Hard-coded default for a row class.
    pub fn default_for(key: RowStyleKey) -> Self {
        match key {
            RowStyleKey::ReportHeader => Self {
                font_color: Some(Color::white()),
                background: Some(Color::from_rgb(0x003366)),
                bold: true,
                italic: false,
                font_size_pt: HEADER_FONT_SIZE_PT,
            },
            RowStyleKey::ReportItem => Self {
                font_color: Some(Color::black()),
                background: Some(Color::white()),
                bold: false,
                italic: false,
                font_size_pt: DEFAULT_FONT_SIZE_PT,
            },
            RowStyleKey::AlternatingItem => Self {
                font_color: Some(Color::black()),
                background: Some(Color::from_rgb(0xDCDCDC)),
                bold: false,
                italic: false,
                font_size_pt: DEFAULT_FONT_SIZE_PT,
            },
            RowStyleKey::ReportFooter => Self {
                font_color: Some(Color::black()),
                background: None,
                bold: true,
                italic: false,
                font_size_pt: DEFAULT_FONT_SIZE_PT,
            },
        }
    }

    fn overridden_by(mut self, css: &crate::css::StyleOverride) -> Self {
        if let Some(c) = css.color {
            self.font_color = Some(c);
        }
        if let Some(c) = css.background {
            self.background = Some(c);
        }
        if let Some(b) = css.bold {
            self.bold = b;
        }
        if let Some(i) = css.italic {
            self.italic = i;
        }
        if let Some(size) = css.font_size_pt {
            self.font_size_pt = size;
        }
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TableStyle {
    pub border_color: Color,
}

/// The per-document style catalog: hard-coded defaults, optionally
/// overridden by a CSS overlay.
///
/// Without an overlay this is the fixed-style converter. With one, author
/// rules override the defaults and every data cell also gets a thin outline
/// in the table border color plus [`CELL_FONT_FAMILY`].
#[derive(Clone, Debug, Default)]
pub struct StyleCatalog {
    overlay: Option<CssOverlay>,
}

impl StyleCatalog {
    pub fn fixed() -> Self {
        Self { overlay: None }
    }

    pub fn with_overlay(overlay: CssOverlay) -> Self {
        Self {
            overlay: Some(overlay),
        }
    }

    pub fn overlay(&self) -> Option<&CssOverlay> {
        self.overlay.as_ref()
    }

    /// Resolve the row style for a class attribute, or `None` when it names
    /// none of the recognized row classes.
    pub fn row_style(&self, class_attr: &str) -> Option<(RowStyleKey, RowStyleRule)> {
        let key = RowStyleKey::matching(class_attr)?;
        let rule = RowStyleRule::default_for(key);
        let rule = match &self.overlay {
            Some(overlay) => rule.overridden_by(overlay.row(key)),
            None => rule,
        };
        Some((key, rule))
    }

    pub fn table_style(&self) -> TableStyle {
        TableStyle {
            border_color: self
                .overlay
                .as_ref()
                .and_then(CssOverlay::border_color)
                .unwrap_or_else(Color::black),
        }
    }

    /// Full style for a data cell.
    ///
    /// The cell's own class is tried first and the row class second. `align`
    /// is the cell's `align` attribute.
    pub fn cell_style(&self, row_class: &str, cell_class: &str, align: Option<&str>) -> CellStyle {
        let resolved = self
            .row_style(cell_class)
            .or_else(|| self.row_style(row_class));

        let mut font = Font::with_size_pt(DEFAULT_FONT_SIZE_PT);
        let mut fill = None;
        let mut border = None;

        if let Some((key, rule)) = &resolved {
            font.color = rule.font_color;
            font.bold = rule.bold;
            font.italic = rule.italic;
            font.size_100pt = Some(pt_to_100pt(rule.font_size_pt));
            fill = rule.background.map(|c| Fill {
                background: Some(c),
            });
            if *key == RowStyleKey::ReportFooter {
                border = Some(Border {
                    top: BorderStyle::Double,
                    ..Border::default()
                });
            }
        }

        if self.overlay.is_some() {
            let color = self.table_style().border_color;
            let mut outline = Border::outline(BorderStyle::Thin, Some(color));
            if let Some(Border {
                top: BorderStyle::Double,
                ..
            }) = border
            {
                outline.top = BorderStyle::Double;
            }
            border = Some(outline);
            font.name = Some(CELL_FONT_FAMILY.to_owned());
        }

        CellStyle {
            font: Some(font),
            fill,
            border,
            alignment: Some(Alignment {
                horizontal: Some(horizontal_alignment(align)),
                vertical: Some(VerticalAlignment::Top),
                wrap_text: false,
            }),
            number_format: None,
        }
    }
}

/// Map an HTML `align` attribute onto a horizontal alignment.
pub fn horizontal_alignment(align: Option<&str>) -> HorizontalAlignment {
    match align.map(|a| a.trim().to_ascii_lowercase()).as_deref() {
        Some("center") | Some("middle") => HorizontalAlignment::Center,
        Some("right") => HorizontalAlignment::Right,
        _ => HorizontalAlignment::Left,
    }
}
