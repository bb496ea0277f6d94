use pretty_assertions::assert_eq;
use report_mime::{extract_images, mime_section};

const PNG_1X1_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mP8/x8AAwMB/6XgdAAAAABJRU5ErkJggg==";

fn part(content_id: &str, body: &str) -> String {
    format!(
        "------=_NextPart_01D9\r\n\
         Content-ID: <{content_id}>\r\n\
         Content-Type: image/png\r\n\
         Content-Transfer-Encoding: BASE64\r\n\
         \r\n\
         {body}\r\n\r\n"
    )
}

fn document(parts: &[String]) -> Vec<u8> {
    let mut doc = String::from("<html><body><img src=\"cid:logo.png@01D9\"></body></HTML>\r\n");
    for p in parts {
        doc.push_str(p);
    }
    doc.push_str("------=_NextPart_01D9--\r\n");
    doc.into_bytes()
}

fn wrapped(b64: &str) -> String {
    b64.as_bytes()
        .chunks(20)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join("\r\n")
}

#[test]
fn decodes_parts_keyed_by_content_id() {
    let raw = document(&[
        part("logo.png@01D9", &wrapped(PNG_1X1_B64)),
        part("Chart1.PNG@01D9", "QUJDRA=="),
    ]);

    let images = extract_images(&raw);
    assert_eq!(images.len(), 2);
    assert_eq!(&images.get("cid:logo.png@01D9").unwrap()[..4], b"\x89PNG");
    assert_eq!(images.get("CID:chart1.png@01d9"), Some(&b"ABCD"[..]));
    assert!(images.skipped().is_empty());
}

#[test]
fn malformed_body_is_skipped_without_affecting_other_parts() {
    let raw = document(&[
        part("bad@01D9", "!!!not*base64$$$"),
        part("good@01D9", "QUJDRA=="),
    ]);

    let images = extract_images(&raw);
    assert_eq!(images.content_ids(), vec!["good@01d9"]);
    assert_eq!(images.skipped(), &["bad@01d9".to_string()]);
    assert_eq!(images.get("bad@01D9"), None);
}

#[test]
fn no_closing_tag_means_no_images() {
    let raw = format!("<html><body></body>\r\n{}", part("x", "QUJDRA=="));
    assert!(mime_section(raw.as_bytes()).is_none());
    assert!(extract_images(raw.as_bytes()).is_empty());
}

#[test]
fn content_before_closing_tag_is_ignored() {
    let body = part("inline", "QUJDRA==");
    let raw = format!("<html>{body}</html>");
    assert!(extract_images(raw.as_bytes()).is_empty());
}

#[test]
fn missing_padding_is_tolerated() {
    let raw = document(&[part("nopad", "QUJDRA")]);
    assert_eq!(extract_images(&raw).get("nopad"), Some(&b"ABCD"[..]));
}
