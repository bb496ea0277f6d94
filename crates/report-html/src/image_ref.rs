use std::sync::OnceLock;

use regex::Regex;
use scraper::ElementRef;

/// An `<img src="cid:...">` reference found in the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CidImageRef {
    /// The reference as written, without the `cid:` prefix.
    pub content_id: String,
    /// Declared width in pixels, from the `width` attribute or inline style.
    pub width: Option<u32>,
    /// Declared height in pixels, from the `height` attribute or inline style.
    pub height: Option<u32>,
}

impl CidImageRef {
    /// Build a reference from an `<img>` element, or `None` when its `src` is
    /// not a content-id reference.
    pub fn from_img(img: ElementRef<'_>) -> Option<Self> {
        let src = img.value().attr("src")?.trim();
        let prefix = src.get(..4)?;
        if !prefix.eq_ignore_ascii_case("cid:") {
            return None;
        }
        let content_id = src[4..].trim();
        if content_id.is_empty() {
            return None;
        }

        let style = img.value().attr("style").unwrap_or("");
        let width = img
            .value()
            .attr("width")
            .and_then(parse_pixels)
            .or_else(|| style_pixels(style, "width"));
        let height = img
            .value()
            .attr("height")
            .and_then(parse_pixels)
            .or_else(|| style_pixels(style, "height"));

        Some(Self {
            content_id: content_id.to_owned(),
            width,
            height,
        })
    }

    /// Both dimensions, when both were declared.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }
}

/// `120`, `120px` or `120.6px` → pixels. Relative units are not dimensions.
fn parse_pixels(value: &str) -> Option<u32> {
    let value = value.trim();
    let number = value
        .strip_suffix("px")
        .or_else(|| value.strip_suffix("PX"))
        .unwrap_or(value)
        .trim();
    let px = number.parse::<f64>().ok()?;
    (px.is_finite() && px > 0.0).then(|| px.round() as u32)
}

fn style_pixels(style: &str, property: &str) -> Option<u32> {
    static DECL_RE: OnceLock<Regex> = OnceLock::new();
    let re = DECL_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|;)\s*(width|height)\s*:\s*([^;]+)").expect("valid regex")
    });
    re.captures_iter(style)
        .filter(|cap| cap[1].eq_ignore_ascii_case(property))
        .filter_map(|cap| parse_pixels(&cap[2]))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn img_ref(html: &str) -> Option<CidImageRef> {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("img").unwrap();
        CidImageRef::from_img(doc.select(&sel).next().unwrap())
    }

    #[test]
    fn attributes_give_dimensions() {
        let r = img_ref(r#"<img src="cid:logo.png" width="120" height="40px">"#).unwrap();
        assert_eq!(r.content_id, "logo.png");
        assert_eq!(r.dimensions(), Some((120, 40)));
    }

    #[test]
    fn inline_style_gives_dimensions() {
        let r = img_ref(r#"<img src="CID:chart" style="border:0; width: 800px; height:400px">"#)
            .unwrap();
        assert_eq!(r.dimensions(), Some((800, 400)));
    }

    #[test]
    fn percentages_are_unknown() {
        let r = img_ref(r#"<img src="cid:c" width="50%">"#).unwrap();
        assert_eq!(r.width, None);
        assert_eq!(r.dimensions(), None);
    }

    #[test]
    fn non_cid_sources_are_not_references() {
        assert_eq!(img_ref(r#"<img src="logo.png">"#), None);
        assert_eq!(img_ref(r#"<img src="cid:">"#), None);
    }
}
