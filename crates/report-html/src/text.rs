use std::sync::OnceLock;

use encoding_rs::{Encoding, WINDOWS_1252};
use regex::bytes::Regex as BytesRegex;
use scraper::{ElementRef, Node};

/// Decode raw report bytes to text.
///
/// Order of preference: byte-order mark, valid UTF-8, the `charset` declared
/// in a `<meta>` tag, and finally windows-1252 (what legacy report tools
/// produce when they declare nothing).
pub fn decode_document(raw: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(raw) {
        let (text, _) = encoding.decode_without_bom_handling(&raw[bom_len..]);
        return text.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(raw) {
        return text.to_owned();
    }

    let encoding = declared_charset(raw).unwrap_or(WINDOWS_1252);
    log::debug!("decoding report as {}", encoding.name());
    let (text, _, had_errors) = encoding.decode(raw);
    if had_errors {
        log::warn!(
            "report is not valid {}; undecodable bytes were replaced",
            encoding.name()
        );
    }
    text.into_owned()
}

fn declared_charset(raw: &[u8]) -> Option<&'static Encoding> {
    static CHARSET_RE: OnceLock<BytesRegex> = OnceLock::new();
    let re = CHARSET_RE.get_or_init(|| {
        BytesRegex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?([A-Za-z0-9_:\-]+)"#)
            .expect("valid regex")
    });
    let cap = re.captures(raw)?;
    let encoding = Encoding::for_label(cap.get(1)?.as_bytes())?;
    // A UTF-8 declaration on bytes that already failed UTF-8 validation is a lie.
    (encoding != encoding_rs::UTF_8).then_some(encoding)
}

/// The HTML part of a document: everything up to and including the first
/// closing `</html>` tag.
pub fn html_part(text: &str) -> &str {
    static CLOSE_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = CLOSE_RE.get_or_init(|| regex::Regex::new(r"(?i)</html\s*>").expect("valid regex"));
    match re.find(text) {
        Some(m) => &text[..m.end()],
        None => text,
    }
}

/// Rendered text of an element: entities decoded, runs of ASCII whitespace
/// collapsed, `<br>` kept as a line break, outer whitespace trimmed.
///
/// Non-breaking spaces survive untouched.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                for ch in text.chars() {
                    if ch.is_ascii_whitespace() {
                        pending_space = true;
                        continue;
                    }
                    if pending_space && !out.is_empty() && !out.ends_with('\n') {
                        out.push(' ');
                    }
                    pending_space = false;
                    out.push(ch);
                }
            }
            Node::Element(el) if el.name().eq_ignore_ascii_case("br") => {
                out.push('\n');
                pending_space = false;
            }
            _ => {}
        }
    }
    out.trim_matches(|c: char| c.is_ascii_whitespace()).to_owned()
}
