//! Report structure location for generated HTML reports.
//!
//! The report generator marks up its output with a small, fixed vocabulary:
//! - `class="ReportTitle"` / `class="Description"` on the heading nodes,
//! - a `report="..."` attribute on each report section (`Chart*` sections
//!   hold `<img src="cid:...">` charts, the others hold a `ReportTable`),
//! - row and cell classes consumed by the style catalog.
//!
//! [`locate`] turns a parsed document into a [`ReportStructure`] without
//! interpreting any cell values.

mod image_ref;
mod text;

use std::collections::HashSet;
use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

pub use crate::image_ref::CidImageRef;
pub use crate::text::{decode_document, html_part, inner_text};

pub const TITLE_CLASS: &str = "ReportTitle";
pub const DESCRIPTION_CLASS: &str = "Description";
pub const TABLE_CLASS: &str = "ReportTable";
/// Attribute naming a report section.
pub const SECTION_ATTR: &str = "report";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("no `{TABLE_CLASS}` data table found")]
    NoDataTable,
    #[error("data tables contain no rows")]
    NoRows,
}

/// One `<td>`/`<th>` of a data row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportCell {
    /// Rendered cell text (see [`inner_text`]).
    pub text: String,
    /// The cell's own `class` attribute.
    pub class: String,
    /// `class` attributes of descendant `<div>`s, in document order.
    pub div_classes: Vec<String>,
    /// Number of output columns the cell spans (at least 1).
    pub colspan: u32,
    /// Horizontal alignment hint (`align` attribute or `text-align` style).
    pub align: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub class: String,
    pub cells: Vec<ReportCell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportSection {
    Chart {
        name: String,
        images: Vec<CidImageRef>,
    },
    Data {
        name: String,
        rows: Vec<ReportRow>,
    },
}

impl ReportSection {
    pub fn name(&self) -> &str {
        match self {
            ReportSection::Chart { name, .. } | ReportSection::Data { name, .. } => name,
        }
    }
}

/// Everything the layout engine needs from one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportStructure {
    /// Report title; empty when the document has none.
    pub title: String,
    /// Report description; empty when the document has none.
    pub description: String,
    /// Images inside the table that holds the title (logos).
    pub header_images: Vec<CidImageRef>,
    /// Sections with content, in document order.
    pub sections: Vec<ReportSection>,
    /// Text of every `<style>` block, in document order.
    pub style_blocks: Vec<String>,
}

/// Parse the HTML part of a decoded report (anything after `</html>` is the
/// MIME section and is not markup).
pub fn parse_document(text: &str) -> Html {
    Html::parse_document(html_part(text))
}

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("valid selector"))
}

fn title_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(&SEL, r#"[class*="ReportTitle"]"#)
}

fn description_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(&SEL, r#"[class*="Description"]"#)
}

fn section_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(&SEL, "[report]")
}

fn report_table_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(&SEL, r#"table[class*="ReportTable"]"#)
}

fn img_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(&SEL, "img[src]")
}

fn style_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(&SEL, "style")
}

fn div_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(&SEL, "div[class]")
}

/// Locate title, description, logos, sections and style blocks.
///
/// Fails with [`LocateError::NoDataTable`] when the document has neither a
/// `ReportTable` nor a chart section, and with [`LocateError::NoRows`] when
/// it has tables but none of them has a row.
pub fn locate(document: &Html) -> Result<ReportStructure, LocateError> {
    let title_node = document.select(title_sel()).next();
    let title = title_node.map(heading_text).unwrap_or_default();
    let description = document
        .select(description_sel())
        .next()
        .map(heading_text)
        .unwrap_or_default();

    let header_images = title_node
        .and_then(|node| enclosing(node, "table"))
        .map(cid_images)
        .unwrap_or_default();

    let style_blocks = document
        .select(style_sel())
        .map(|style| style.text().collect::<String>())
        .filter(|css| !css.trim().is_empty())
        .collect();

    let mut tables_found = 0usize;
    let mut chart_sections = 0usize;
    let mut sections = Vec::new();

    let marked: Vec<ElementRef<'_>> = document.select(section_sel()).collect();
    if marked.is_empty() {
        log::debug!("no `report` sections; falling back to every `{TABLE_CLASS}`");
        for (idx, table) in document
            .select(report_table_sel())
            .filter(|t| !has_report_table_ancestor(*t))
            .enumerate()
        {
            tables_found += 1;
            push_data_section(&mut sections, format!("{TABLE_CLASS}{}", idx + 1), table);
        }
    }

    let mut consumed_tables = HashSet::new();
    for section in marked {
        let name = section_name(section);
        if has_chart_section_ancestor(section) {
            log::debug!("section `{name}` is nested in a chart section; skipping");
            continue;
        }

        if is_chart_section(&name) {
            chart_sections += 1;
            let images = cid_images(section);
            if images.is_empty() {
                log::debug!("chart section `{name}` has no cid images; skipping");
                continue;
            }
            sections.push(ReportSection::Chart { name, images });
            continue;
        }

        let Some(table) = section_table(section) else {
            log::debug!("data section `{name}` has no `{TABLE_CLASS}`; skipping");
            continue;
        };
        if !consumed_tables.insert(table.id()) {
            log::debug!("data section `{name}` shares its table with an outer section; skipping");
            continue;
        }
        tables_found += 1;
        push_data_section(&mut sections, name, table);
    }

    if tables_found == 0 && chart_sections == 0 {
        return Err(LocateError::NoDataTable);
    }
    if sections.is_empty() && chart_sections == 0 {
        return Err(LocateError::NoRows);
    }

    Ok(ReportStructure {
        title,
        description,
        header_images,
        sections,
        style_blocks,
    })
}

/// Heading text, empty when it renders as nothing but whitespace.
fn heading_text(node: ElementRef<'_>) -> String {
    let text = inner_text(node);
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("&nbsp;") {
        String::new()
    } else {
        trimmed.to_owned()
    }
}

fn section_name(section: ElementRef<'_>) -> String {
    section
        .value()
        .attr(SECTION_ATTR)
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Chart sections collect every image below them, so nothing nested inside
/// one is read again.
fn has_chart_section_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().attr(SECTION_ATTR).is_some())
        .any(|el| is_chart_section(&section_name(el)))
}

fn is_chart_section(name: &str) -> bool {
    name.get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("chart"))
}

fn push_data_section(sections: &mut Vec<ReportSection>, name: String, table: ElementRef<'_>) {
    let rows = table_rows(table);
    if rows.is_empty() {
        log::debug!("data section `{name}` has no rows; skipping");
        return;
    }
    sections.push(ReportSection::Data { name, rows });
}

/// The section element itself when it is the `ReportTable`, else its first
/// descendant `ReportTable`.
fn section_table(section: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if is_report_table(section) {
        return Some(section);
    }
    section.select(report_table_sel()).next()
}

fn is_report_table(element: ElementRef<'_>) -> bool {
    element.value().name().eq_ignore_ascii_case("table")
        && element
            .value()
            .attr("class")
            .is_some_and(|c| c.contains(TABLE_CLASS))
}

fn has_report_table_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(is_report_table)
}

fn enclosing<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name().eq_ignore_ascii_case(tag))
}

fn cid_images(scope: ElementRef<'_>) -> Vec<CidImageRef> {
    scope
        .select(img_sel())
        .filter_map(CidImageRef::from_img)
        .collect()
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Rows belonging to `table` itself; rows of nested tables are not included.
fn table_rows(table: ElementRef<'_>) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(read_row(child)),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child_elements(child)
                    .filter(|el| el.value().name() == "tr")
                    .map(read_row),
            ),
            _ => {}
        }
    }
    rows
}

fn read_row(tr: ElementRef<'_>) -> ReportRow {
    let cells = child_elements(tr)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(read_cell)
        .collect();
    ReportRow {
        class: tr.value().attr("class").unwrap_or_default().to_owned(),
        cells,
    }
}

fn read_cell(td: ElementRef<'_>) -> ReportCell {
    let divs: Vec<ElementRef<'_>> = td.select(div_sel()).collect();
    let div_classes = divs
        .iter()
        .filter_map(|div| div.value().attr("class"))
        .map(str::to_owned)
        .collect();

    let colspan = td
        .value()
        .attr("colspan")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v.clamp(1, i64::from(u32::MAX)) as u32)
        .unwrap_or(1);

    let align = td
        .value()
        .attr("align")
        .map(str::to_owned)
        .or_else(|| text_align(td))
        .or_else(|| {
            divs.iter()
                .find_map(|div| div.value().attr("align").map(str::to_owned).or_else(|| text_align(*div)))
        });

    ReportCell {
        text: inner_text(td),
        class: td.value().attr("class").unwrap_or_default().to_owned(),
        div_classes,
        colspan,
        align,
    }
}

fn text_align(element: ElementRef<'_>) -> Option<String> {
    let style = element.value().attr("style")?;
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("text-align")
            .then(|| value.trim().to_owned())
    })
}
