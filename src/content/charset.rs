//! Character-set detection for fetched pages.
//!
//! Order: byte-order mark, `Content-Type` charset, `<meta>` declaration near
//! the top of the document, then a statistical guess over the bytes.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

/// How far into the document a `<meta charset>` is looked for.
const META_PRESCAN_BYTES: usize = 4096;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_.:\-]+)"#)
        .expect("static regex compile")
});

/// Decode an HTML response body to text.
#[must_use]
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> (String, &'static Encoding) {
    let encoding = detect_encoding(bytes, content_type);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = used.name(), "Replaced malformed byte sequences while decoding");
    }
    (text.into_owned(), used)
}

#[must_use]
pub fn detect_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        return encoding;
    }
    if let Some(encoding) = charset_from_meta(bytes) {
        return encoding;
    }
    sniff(bytes)
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches(|c| c == '"' || c == '\'').as_bytes())
    })
}

fn charset_from_meta(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_PRESCAN_BYTES)];
    let label = META_CHARSET_RE.captures(head)?.get(1)?;
    // A document can't really be UTF-16 if its meta tag was readable as ASCII.
    Encoding::for_label(label.as_bytes()).map(Encoding::output_encoding)
}

fn sniff(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}
