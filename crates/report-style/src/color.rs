use core::fmt;

/// An ARGB color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub argb: u32,
}

impl Color {
    pub const fn new_argb(argb: u32) -> Self {
        Self { argb }
    }

    /// Opaque color from a `0xRRGGBB` value.
    pub const fn from_rgb(rgb: u32) -> Self {
        Self {
            argb: 0xFF00_0000 | (rgb & 0x00FF_FFFF),
        }
    }

    pub const fn black() -> Self {
        Self { argb: 0xFF000000 }
    }

    pub const fn white() -> Self {
        Self { argb: 0xFFFFFFFF }
    }

    pub const fn gray() -> Self {
        Self { argb: 0xFF808080 }
    }

    /// The color without its alpha channel.
    pub const fn rgb(self) -> u32 {
        self.argb & 0x00FF_FFFF
    }

    fn to_hex(self) -> String {
        format!("#{:08X}", self.argb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A CSS color value after parsing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CssColor {
    Color(Color),
    /// `transparent`, `inherit` and friends: the value carries no color of its own.
    NoColor,
}

impl CssColor {
    pub fn color(self) -> Option<Color> {
        match self {
            CssColor::Color(c) => Some(c),
            CssColor::NoColor => None,
        }
    }
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("blue", 0x0000FF),
    ("green", 0x008000),
    ("yellow", 0xFFFF00),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("silver", 0xC0C0C0),
    ("gainsboro", 0xDCDCDC),
];

const NO_COLOR_KEYWORDS: &[&str] = &["transparent", "inherit", "initial", "unset", "none"];

/// Parse a CSS color value.
///
/// Hex (`#rgb`, `#rrggbb`, `#aarrggbb`), `rgb()`/`rgba()` and a small table of
/// named colors are understood. Anything else that is not a "no color" keyword
/// falls back to black.
pub fn parse_css_color(value: &str) -> CssColor {
    let value = strip_important(value);
    if is_no_color_keyword(value) {
        return CssColor::NoColor;
    }
    CssColor::Color(parse_known_color(value).unwrap_or_else(Color::black))
}

/// Strict variant of [`parse_css_color`] used when scanning shorthand values
/// (`border: 1px solid red`), where most tokens are not colors at all.
pub fn parse_known_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = value.to_ascii_lowercase();
    if lower.starts_with("rgb(") || lower.starts_with("rgba(") {
        return parse_rgb_function(&lower);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgb)| Color::from_rgb(*rgb))
}

pub(crate) fn is_no_color_keyword(value: &str) -> bool {
    NO_COLOR_KEYWORDS
        .iter()
        .any(|k| value.trim().eq_ignore_ascii_case(k))
}

pub(crate) fn strip_important(value: &str) -> &str {
    let value = value.trim();
    match value.to_ascii_lowercase().find("!important") {
        Some(idx) => value[..idx].trim_end(),
        None => value,
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut rgb = 0u32;
            for b in hex.bytes() {
                let nibble = (b as char).to_digit(16)?;
                rgb = (rgb << 8) | (nibble << 4) | nibble;
            }
            Some(Color::from_rgb(rgb))
        }
        6 => u32::from_str_radix(hex, 16).ok().map(Color::from_rgb),
        8 => u32::from_str_radix(hex, 16).ok().map(Color::new_argb),
        _ => None,
    }
}

fn parse_rgb_function(lower: &str) -> Option<Color> {
    let open = lower.find('(')?;
    let close = lower.rfind(')')?;
    let args: Vec<&str> = lower[open + 1..close].split(',').map(str::trim).collect();
    if args.len() < 3 {
        return None;
    }
    let mut rgb = 0u32;
    for arg in &args[..3] {
        let channel = match arg.strip_suffix('%') {
            Some(pct) => (pct.parse::<f64>().ok()?.clamp(0.0, 100.0) * 2.55).round() as u32,
            None => arg.parse::<f64>().ok()?.clamp(0.0, 255.0).round() as u32,
        };
        rgb = (rgb << 8) | channel;
    }
    Some(Color::from_rgb(rgb))
}
