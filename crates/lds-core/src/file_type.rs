//! Content-type detection and image classification for uploaded files.
//!
//! Classification order:
//! 1. Magic byte detection (`infer`) is authoritative for binary formats
//! 2. Extension mapping for text formats that carry no magic bytes
//! 3. The client's declared type, downgraded to `application/octet-stream`
//!    when it claims a binary format the bytes do not match
//!
//! A file is an image (and gets a thumbnail) when the detected type is one of
//! the raster formats the thumbnail generator can decode.

/// Raster MIME types the thumbnail generator decodes.
pub const THUMBNAILABLE_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// Fallback type for binary payloads with no recognizable signature.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detect actual content type from file magic bytes.
///
/// Returns the detected MIME type if magic bytes match a known format,
/// falling back to extension-based detection, then to the claimed type.
pub fn detect_content_type(filename: &str, data: &[u8], claimed: Option<&str>) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if let Some(ext) = extension(filename) {
        if let Some(mime) = mime_from_extension(ext) {
            return mime.to_string();
        }
    }

    match claimed.map(normalize_mime) {
        Some(mime) if !mime.is_empty() && !claimed_is_binary(&mime) => mime,
        _ => OCTET_STREAM.to_string(),
    }
}

/// Returns true if the MIME type is a raster format we can thumbnail.
pub fn is_thumbnailable_mime(mime: &str) -> bool {
    let mime = normalize_mime(mime);
    THUMBNAILABLE_MIME_TYPES.contains(&mime.as_str())
}

/// Sanitize filename for safe display and storage in metadata.
pub fn sanitize_filename(filename: &str) -> String {
    // Remove path components
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return crate::defaults::UNNAMED_FILE.to_string();
    }

    // Truncate if too long (preserve extension)
    if sanitized.len() > 255 {
        let cut = floor_char_boundary(sanitized, 255);
        if let Some(dot_pos) = sanitized.rfind('.') {
            let ext = &sanitized[dot_pos..];
            if ext.len() < 32 {
                let keep = floor_char_boundary(sanitized, 255 - ext.len());
                return format!("{}{}", &sanitized[..keep], ext);
            }
        }
        return sanitized[..cut].to_string();
    }

    sanitized.to_string()
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn extension(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Strip parameters (`; charset=...`) and lowercase.
fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Binary media types always carry magic bytes; a claim infer cannot confirm
/// is not trusted.
fn claimed_is_binary(claimed: &str) -> bool {
    (claimed.starts_with("image/") && claimed != "image/svg+xml")
        || claimed.starts_with("audio/")
        || claimed.starts_with("video/")
        || matches!(
            claimed,
            "application/pdf" | "application/zip" | "application/gzip" | "application/x-tar"
        )
}

/// Map text-only extensions (formats without magic bytes) to MIME types.
fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "txt" | "log" | "ini" | "cfg" | "conf" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "tsv" => Some("text/tab-separated-values"),
        "html" | "htm" => Some("text/html"),
        "xml" => Some("application/xml"),
        "json" => Some("application/json"),
        "yaml" | "yml" => Some("application/yaml"),
        "md" | "markdown" => Some("text/markdown"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: [u8; 10] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    fn is_image(filename: &str, data: &[u8], claimed: Option<&str>) -> bool {
        is_thumbnailable_mime(&detect_content_type(filename, data, claimed))
    }

    #[test]
    fn test_detect_png_magic_bytes() {
        let result = detect_content_type("fake.txt", &PNG_MAGIC, Some("text/plain"));
        assert_eq!(result, "image/png");
    }

    #[test]
    fn test_detect_jpeg_magic_bytes() {
        let result = detect_content_type("photo.jpg", &JPEG_MAGIC, Some(OCTET_STREAM));
        assert_eq!(result, "image/jpeg");
    }

    #[test]
    fn test_text_extension_fallback() {
        assert_eq!(
            detect_content_type("notes.md", b"# hello", None),
            "text/markdown"
        );
    }

    #[test]
    fn test_claimed_text_type_is_trusted() {
        assert_eq!(
            detect_content_type("data", b"a,b,c", Some("text/csv; charset=utf-8")),
            "text/csv"
        );
    }

    #[test]
    fn test_claimed_image_without_magic_is_downgraded() {
        assert_eq!(
            detect_content_type("fake.png", b"not really a png", Some("image/png")),
            OCTET_STREAM
        );
    }

    #[test]
    fn test_missing_claim_defaults_to_octet_stream() {
        assert_eq!(detect_content_type("blob", &[0u8, 1, 2, 3], None), OCTET_STREAM);
    }

    #[test]
    fn test_is_image_png() {
        assert!(is_image("a.png", &PNG_MAGIC, Some("image/png")));
        assert!(is_image("no-extension", &PNG_MAGIC, None));
    }

    #[test]
    fn test_is_image_rejects_text_and_svg() {
        assert!(!is_image("readme.txt", b"hello", Some("text/plain")));
        assert!(!is_image("logo.svg", b"<svg></svg>", Some("image/svg+xml")));
    }

    #[test]
    fn test_is_image_rejects_mislabelled_bytes() {
        assert!(!is_image("photo.jpg", b"plain text body", Some("image/jpeg")));
    }

    #[test]
    fn test_is_thumbnailable_mime_ignores_case_and_params() {
        assert!(is_thumbnailable_mime("IMAGE/PNG"));
        assert!(is_thumbnailable_mime("image/jpeg; q=0.9"));
        assert!(!is_thumbnailable_mime("image/svg+xml"));
    }

    #[test]
    fn test_sanitize_strips_path() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\a\\pic.png"), "pic.png");
    }

    #[test]
    fn test_sanitize_replaces_reserved_chars() {
        assert_eq!(sanitize_filename("a<b>c?.txt"), "a_b_c_.txt");
    }

    #[test]
    fn test_sanitize_empty_name() {
        assert_eq!(sanitize_filename("   "), "unnamed_file");
        assert_eq!(sanitize_filename("dir/"), "unnamed_file");
    }

    #[test]
    fn test_sanitize_truncates_preserving_extension() {
        let long = format!("{}.png", "x".repeat(300));
        let result = sanitize_filename(&long);
        assert_eq!(result.len(), 255);
        assert!(result.ends_with(".png"));
    }
}
