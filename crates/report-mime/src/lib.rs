//! Embedded image extraction for browser-saved HTML reports.
//!
//! Reports saved as `.mht`/`.xls` carry their HTML followed, after the closing
//! `</html>` tag, by MIME parts such as:
//!
//! ```text
//! Content-ID: <logo.png@01D9>
//! Content-Type: image/png
//! Content-Transfer-Encoding: BASE64
//!
//! iVBORw0KGgo...
//! ```
//!
//! [`extract_images`] decodes every such part into a [`MimeImages`] map keyed by
//! content-id. A part whose body is not valid base64 is dropped and recorded in
//! [`MimeImages::skipped`]; it never fails the extraction.

use std::collections::HashMap;
use std::sync::OnceLock;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

/// Images decoded from a document's MIME section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MimeImages {
    images: HashMap<String, Vec<u8>>,
    skipped: Vec<String>,
}

impl MimeImages {
    /// Look up an image by content-id.
    ///
    /// The lookup is case-insensitive and accepts the raw `src` value of an
    /// `<img>` tag (`cid:` prefix and angle brackets are ignored).
    pub fn get(&self, content_id: &str) -> Option<&[u8]> {
        self.images
            .get(&normalize_content_id(content_id))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Normalized content-ids of parts whose body failed to decode.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Normalized content-ids of the decoded images, sorted.
    pub fn content_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.images.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Canonical form of a content-id: no `cid:` prefix, no angle brackets, lowercase.
pub fn normalize_content_id(content_id: &str) -> String {
    let mut id = content_id.trim();
    if id.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("cid:")) {
        id = id[4..].trim_start();
    }
    let id = id.strip_prefix('<').unwrap_or(id);
    let id = id.strip_suffix('>').unwrap_or(id);
    id.trim().to_lowercase()
}

/// Split off the MIME section of a raw document: everything after the first
/// (case-insensitive) `</html>` tag.
pub fn mime_section(raw: &[u8]) -> Option<&[u8]> {
    static CLOSE_RE: OnceLock<BytesRegex> = OnceLock::new();
    let re = CLOSE_RE.get_or_init(|| BytesRegex::new(r"(?i)</html\s*>").expect("valid regex"));
    re.find(raw).map(|m| &raw[m.end()..])
}

/// Decode every base64 image part trailing the document.
pub fn extract_images(raw: &[u8]) -> MimeImages {
    let mut out = MimeImages::default();
    let Some(section) = mime_section(raw) else {
        log::debug!("no closing </html> tag; document has no MIME section");
        return out;
    };
    let section = String::from_utf8_lossy(section);

    let markers: Vec<(usize, usize, String)> = content_id_re()
        .captures_iter(&section)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let id = normalize_content_id(cap.get(1)?.as_str());
            Some((whole.start(), whole.end(), id))
        })
        .collect();

    for (idx, (_, header_end, content_id)) in markers.iter().enumerate() {
        let part_end = markers
            .get(idx + 1)
            .map(|(start, _, _)| *start)
            .unwrap_or(section.len());
        let part = &section[*header_end..part_end];

        let Some(body) = base64_body(part) else {
            log::debug!("MIME part `{content_id}` is not base64-encoded; ignoring");
            continue;
        };

        match decode_base64(&body) {
            Some(bytes) if !bytes.is_empty() => {
                if out.images.contains_key(content_id) {
                    log::debug!("duplicate MIME content-id `{content_id}`; keeping the first part");
                    continue;
                }
                out.images.insert(content_id.clone(), bytes);
            }
            _ => {
                log::warn!("MIME part `{content_id}` has a malformed base64 body; image omitted");
                out.skipped.push(content_id.clone());
            }
        }
    }

    out
}

fn content_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Content-ID:[ \t]*(<[^>\r\n]*>|[^\s]+)").expect("valid regex"))
}

/// Body of a part: after its `Content-Transfer-Encoding: BASE64` header and
/// the blank line ending the headers, up to any trailing multipart boundary.
/// All whitespace is removed.
fn base64_body(part: &str) -> Option<String> {
    static CTE_RE: OnceLock<Regex> = OnceLock::new();
    static BLANK_RE: OnceLock<Regex> = OnceLock::new();
    let cte_re = CTE_RE.get_or_init(|| {
        Regex::new(r"(?i)Content-Transfer-Encoding:[ \t]*base64").expect("valid regex")
    });
    let blank_re = BLANK_RE.get_or_init(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("valid regex"));

    let cte = cte_re.find(part)?;
    let rest = &part[cte.end()..];
    let body = match blank_re.find(rest) {
        Some(blank) => &rest[blank.end()..],
        None => return None,
    };

    let mut out = String::with_capacity(body.len());
    for line in body.lines() {
        if line.trim_start().starts_with("--") {
            break;
        }
        out.extend(line.chars().filter(|c| !c.is_whitespace()));
    }
    Some(out)
}

fn decode_base64(body: &str) -> Option<Vec<u8>> {
    const LENIENT: GeneralPurpose = GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
    );
    STANDARD
        .decode(body)
        .or_else(|_| LENIENT.decode(body))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_prefix_brackets_and_case() {
        assert_eq!(normalize_content_id("cid:Image001.PNG@01D9"), "image001.png@01d9");
        assert_eq!(normalize_content_id("CID:<Logo>"), "logo");
        assert_eq!(normalize_content_id(" <chart1> "), "chart1");
    }

    #[test]
    fn body_stops_at_boundary() {
        let part = "\r\nContent-Transfer-Encoding: base64\r\n\r\nQUJD\r\nREVG\r\n\r\n------=_NextPart_000\r\n";
        assert_eq!(base64_body(part).as_deref(), Some("QUJDREVG"));
    }

    #[test]
    fn missing_transfer_encoding_is_not_a_body() {
        assert_eq!(base64_body("\nContent-Type: image/png\n\nQUJD\n"), None);
    }
}
