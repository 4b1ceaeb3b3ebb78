//! HTML escaping and URL helpers.

use std::borrow::Cow;

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Percent-encode one URL path segment.
///
/// Unreserved characters pass through; everything else, including `/`, is
/// encoded byte by byte.
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    let unreserved = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~');
    if segment.bytes().all(unreserved) {
        return Cow::Borrowed(segment);
    }
    let mut out = String::with_capacity(segment.len() * 3);
    for b in segment.bytes() {
        if unreserved(b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    Cow::Owned(out)
}

/// `/dashboard/{path}`
pub fn dashboard_url(path: &str) -> String {
    format!("/dashboard/{}", encode_segment(path))
}

/// `/toggle/{path}/{entity_id}`
pub fn toggle_url(path: &str, entity_id: &str) -> String {
    format!(
        "/toggle/{}/{}",
        encode_segment(path),
        encode_segment(entity_id)
    )
}
