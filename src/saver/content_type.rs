//! Content-type validation for downloaded bytes
//!
//! The destination extension comes from the validated content type, never
//! from the URL: URLs frequently lack or misstate an extension. Servers
//! that answer with an opaque type get a second chance through magic-byte
//! sniffing.

/// Allow-listed image types and the extension each maps to.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("image/svg+xml", "svg"),
];

/// Strip parameters and normalize case: `image/JPEG; charset=x` becomes
/// `image/jpeg`.
pub(crate) fn sanitize(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Extension for an allow-listed content type, `None` when the type is
/// not an image format we accept.
pub(crate) fn extension_for(content_type: &str) -> Option<&'static str> {
    let normalized = sanitize(content_type);
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == normalized)
        .map(|(_, ext)| *ext)
}

/// Whether a declared type says nothing about the format.
pub(crate) fn is_opaque(declared: Option<&str>) -> bool {
    match declared {
        None => true,
        Some(raw) => {
            let normalized = sanitize(raw);
            normalized.is_empty()
                || normalized == "application/octet-stream"
                || normalized == "binary/octet-stream"
        }
    }
}

/// Infer a content type from the first bytes of the body.
pub(crate) fn sniff(bytes: &[u8]) -> Option<&'static str> {
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(PNG_MAGIC) {
        return Some("image/png");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"BM") {
        return Some("image/bmp");
    }
    if bytes.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return Some("image/x-icon");
    }
    sniff_svg(bytes)
}

/// SVG has no magic number; look for the root element within a bounded
/// prefix of the body.
fn sniff_svg(bytes: &[u8]) -> Option<&'static str> {
    let prefix = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(prefix);
    let trimmed = text.trim_start();
    if trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg")) {
        return Some("image/svg+xml");
    }
    None
}

/// Decide the effective content type: the declared header wins unless it
/// is opaque, in which case the body is sniffed.
pub(crate) fn resolve(declared: Option<&str>, bytes: &[u8]) -> Option<String> {
    if is_opaque(declared) {
        sniff(bytes).map(ToString::to_string)
    } else {
        declared.map(sanitize)
    }
}
