use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::ImageError;

/// Read `path` and encode it as a `data:` URL.
pub fn encode_file(path: &Path) -> Result<String, ImageError> {
    let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "encoding image");
    Ok(encode_bytes(&bytes, path.extension().and_then(|e| e.to_str())))
}

/// Encode raw bytes as a `data:` URL.
pub fn encode_bytes(bytes: &[u8], extension: Option<&str>) -> String {
    format!(
        "data:{};base64,{}",
        mime_type(bytes, extension),
        STANDARD.encode(bytes)
    )
}

/// Detect the MIME type from the content, then the extension.
pub fn mime_type(bytes: &[u8], extension: Option<&str>) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    match extension.map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_mime_from_content_wins_over_extension() {
        assert_eq!(mime_type(PNG_MAGIC, Some("jpg")), "image/png");
    }

    #[test]
    fn test_mime_falls_back_to_extension() {
        assert_eq!(mime_type(b"<svg/>", Some("SVG")), "image/svg+xml");
        assert_eq!(mime_type(b"??", None), "application/octet-stream");
    }

    #[test]
    fn test_encode_bytes_builds_data_url() {
        assert_eq!(encode_bytes(b"hi", Some("txt")), "data:application/octet-stream;base64,aGk=");
    }

    #[test]
    fn test_encode_file_reads_from_disk() {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .expect("temp file");
        file.write_all(PNG_MAGIC).expect("write");
        let url = encode_file(file.path()).expect("encode");
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"), "{url}");
    }

    #[test]
    fn test_encode_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = encode_file(&dir.path().join("missing.png")).expect_err("missing file");
        assert!(matches!(err, ImageError::Io { .. }));
        assert!(err.to_string().contains("missing.png"));
    }
}
