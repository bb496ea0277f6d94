use crate::Color;

/// Font formatting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Font {
    pub name: Option<String>,
    /// Font size in 1/100 points (e.g. 800 = 8pt).
    pub size_100pt: Option<u16>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Color>,
}

impl Font {
    pub fn with_size_pt(size_pt: f64) -> Self {
        Self {
            size_100pt: Some(pt_to_100pt(size_pt)),
            ..Self::default()
        }
    }

    pub fn size_pt(&self) -> Option<f64> {
        self.size_100pt.map(|s| f64::from(s) / 100.0)
    }
}

pub(crate) fn pt_to_100pt(size_pt: f64) -> u16 {
    (size_pt * 100.0).round().clamp(100.0, 40_900.0) as u16
}

/// Fill (background) formatting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Fill {
    pub background: Option<Color>,
}

/// Border line style.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Double,
}

/// Border formatting (subset).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Border {
    pub top: BorderStyle,
    pub bottom: BorderStyle,
    pub left: BorderStyle,
    pub right: BorderStyle,
    pub color: Option<Color>,
}

impl Border {
    /// The same line style on all four edges.
    pub fn outline(style: BorderStyle, color: Option<Color>) -> Self {
        Self {
            top: style,
            bottom: style,
            left: style,
            right: style,
            color,
        }
    }
}

/// Horizontal alignment options (subset).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    General,
    Left,
    Center,
    Right,
}

/// Vertical alignment options (subset).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
}

/// Alignment formatting (subset).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: Option<HorizontalAlignment>,
    pub vertical: Option<VerticalAlignment>,
    pub wrap_text: bool,
}

/// Complete cell style as handed to the sheet writer.
///
/// `number_format` holds the catalog format string (e.g. `Short Date` or
/// `$#,##0.00`); writers translate it with [`crate::excel_format_code`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    pub font: Option<Font>,
    pub fill: Option<Fill>,
    pub border: Option<Border>,
    pub alignment: Option<Alignment>,
    pub number_format: Option<String>,
}

impl CellStyle {
    /// A copy of this style with `number_format` replaced.
    pub fn with_number_format(&self, number_format: Option<&str>) -> Self {
        Self {
            number_format: number_format.map(str::to_owned),
            ..self.clone()
        }
    }
}
