//! Approximate `<style>` block scanning.
//!
//! This is not a CSS engine. A rule applies to a row class when the class
//! name appears as a token anywhere in its selector, and for each property
//! the last non-trivial value across all matching rules wins.

use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::RowStyleKey;
use crate::color::{is_no_color_keyword, parse_css_color, parse_known_color, strip_important};
use crate::Color;

/// Class name marking the data table itself.
pub const TABLE_CLASS: &str = "ReportTable";

/// A single `selector { declarations }` rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    /// `(property, value)` pairs in source order; property names are lowercased.
    pub declarations: Vec<(String, String)>,
}

/// Split CSS text into rules. Comments are dropped and at-rule wrappers such
/// as `@media print { ... }` are flattened into their inner rules.
pub fn parse_rules(css: &str) -> Vec<CssRule> {
    static COMMENT_RE: OnceLock<Regex> = OnceLock::new();
    static RULE_RE: OnceLock<Regex> = OnceLock::new();
    let comment_re = COMMENT_RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
    let rule_re = RULE_RE.get_or_init(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").expect("valid regex"));

    let css = comment_re.replace_all(css, " ");
    let css = css.replace("<!--", " ").replace("-->", " ");

    rule_re
        .captures_iter(&css)
        .filter_map(|cap| {
            let selector = cap.get(1)?.as_str().trim();
            if selector.is_empty() || selector.starts_with('@') {
                return None;
            }
            let declarations = parse_declarations(cap.get(2)?.as_str());
            Some(CssRule {
                selector: selector.to_owned(),
                declarations,
            })
        })
        .collect()
}

fn parse_declarations(body: &str) -> Vec<(String, String)> {
    body.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = strip_important(value).to_owned();
            if name.is_empty() {
                return None;
            }
            Some((name, value))
        })
        .collect()
}

/// Whether `token` appears in `selector` delimited by non-identifier characters.
pub fn selector_has_token(selector: &str, token: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    selector.match_indices(token).any(|(idx, _)| {
        let before = selector[..idx].chars().next_back();
        let after = selector[idx + token.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Author overrides for one row class. `None` means "use the catalog default".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleOverride {
    pub color: Option<Color>,
    pub background: Option<Color>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub font_size_pt: Option<f64>,
}

impl StyleOverride {
    pub fn is_empty(&self) -> bool {
        *self == StyleOverride::default()
    }

    fn apply(&mut self, property: &str, value: &str) {
        match property {
            "color" => {
                if let Some(c) = explicit_color(value) {
                    self.color = Some(c);
                }
            }
            "background-color" => {
                if let Some(c) = explicit_color(value) {
                    self.background = Some(c);
                }
            }
            "background" => {
                if let Some(c) = shorthand_color(value) {
                    self.background = Some(c);
                }
            }
            "font-weight" => {
                if let Some(bold) = parse_font_weight(value) {
                    self.bold = Some(bold);
                }
            }
            "font-style" => {
                if let Some(italic) = parse_font_style(value) {
                    self.italic = Some(italic);
                }
            }
            "font-size" => {
                if let Some(size) = parse_font_size_pt(value) {
                    self.font_size_pt = Some(size);
                }
            }
            _ => {}
        }
    }
}

/// Per-document overrides collected from every `<style>` block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CssOverlay {
    rows: [StyleOverride; 4],
    table_border: Option<Color>,
    cell_border: Option<Color>,
}

impl CssOverlay {
    /// Build the overlay from the text of each `<style>` block, in document order.
    pub fn from_style_blocks<'a>(blocks: impl IntoIterator<Item = &'a str>) -> Self {
        let mut overlay = CssOverlay::default();
        for block in blocks {
            for rule in parse_rules(block) {
                overlay.apply_rule(&rule);
            }
        }
        log::debug!("css overlay: {overlay:?}");
        overlay
    }

    fn apply_rule(&mut self, rule: &CssRule) {
        let row_keys: Vec<RowStyleKey> = RowStyleKey::ALL
            .into_iter()
            .filter(|key| selector_has_token(&rule.selector, key.class_name()))
            .collect();
        let is_table = selector_has_token(&rule.selector, TABLE_CLASS);
        let is_generic_cell = row_keys.is_empty()
            && !is_table
            && (selector_has_token(&rule.selector, "td") || selector_has_token(&rule.selector, "th"));

        for (property, value) in &rule.declarations {
            for key in &row_keys {
                self.rows[key.index()].apply(property, value);
            }
            if !(is_table || is_generic_cell) {
                continue;
            }
            let border = match property.as_str() {
                "border" | "border-top" | "border-bottom" | "border-left" | "border-right" => {
                    shorthand_color(value)
                }
                "border-color" => value.split_whitespace().next().and_then(explicit_color),
                _ => None,
            };
            if let Some(color) = border {
                if is_table {
                    self.table_border = Some(color);
                } else {
                    self.cell_border = Some(color);
                }
            }
        }
    }

    pub fn row(&self, key: RowStyleKey) -> &StyleOverride {
        &self.rows[key.index()]
    }

    /// Border color declared for `ReportTable`, else for generic cells.
    pub fn border_color(&self) -> Option<Color> {
        self.table_border.or(self.cell_border)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(StyleOverride::is_empty) && self.border_color().is_none()
    }
}

fn explicit_color(value: &str) -> Option<Color> {
    if value.trim().is_empty() {
        return None;
    }
    parse_css_color(value).color()
}

fn shorthand_color(value: &str) -> Option<Color> {
    if is_no_color_keyword(value) {
        return None;
    }
    // `rgb(1, 2, 3)` contains spaces; rejoin it before tokenizing.
    let compact = value.replace(", ", ",");
    compact.split_whitespace().find_map(parse_known_color)
}

fn parse_font_weight(value: &str) -> Option<bool> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "bold" | "bolder" => Some(true),
        "normal" | "lighter" => Some(false),
        other => other.parse::<u16>().ok().map(|w| w >= 600),
    }
}

fn parse_font_style(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "italic" | "oblique" => Some(true),
        "normal" => Some(false),
        _ => None,
    }
}

fn parse_font_size_pt(value: &str) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let (number, factor) = if let Some(n) = value.strip_suffix("pt") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("px") {
        (n, 0.75)
    } else {
        (value.as_str(), 1.0)
    };
    let size = number.trim().parse::<f64>().ok()? * factor;
    (size.is_finite() && size > 0.0).then_some(size)
}
