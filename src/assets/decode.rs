use std::path::Path;

use crate::foundation::{
    core::PixelBuffer,
    error::{FramefitError, FramefitResult},
};

/// MIME types accepted for frames and product photos.
pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// An uploaded file as handed over by the host: name, declared MIME type, raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, sniffing its MIME type from content.
    pub fn read(path: &Path) -> FramefitResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("read '{}': {e}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = sniff_mime(&bytes, &name);
        Ok(Self { name, mime, bytes })
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

pub fn validate_mime(mime: &str) -> FramefitResult<()> {
    if ACCEPTED_MIME_TYPES.contains(&mime) {
        return Ok(());
    }
    Err(FramefitError::validation(format!(
        "unsupported file type '{mime}': upload a JPG, PNG, GIF or WEBP image"
    )))
}

/// Best-effort MIME detection for hosts that do not declare one.
///
/// Magic bytes win; the file extension is only consulted when content sniffing finds nothing.
pub fn sniff_mime(bytes: &[u8], name: &str) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Decode encoded image bytes (JPEG, PNG, GIF, WEBP) into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> FramefitResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FramefitError::decode(format!("decode image from memory: {e}")))?;
    PixelBuffer::from_rgba_image(dyn_img.to_rgba8())
}

/// Validate, then decode. Rejected files never reach the decoder.
pub fn ingest(file: &SourceFile) -> FramefitResult<PixelBuffer> {
    validate_mime(&file.mime)?;
    decode_image(&file.bytes)
        .map_err(|e| FramefitError::decode(format!("'{}': {}", file.name, strip_prefix(&e))))
}

fn strip_prefix(err: &FramefitError) -> String {
    match err {
        FramefitError::Decode(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_image_png_keeps_straight_alpha() {
        let buf = png_bytes(1, 1, [100, 50, 200, 128]);
        let px = decode_image(&buf).unwrap();
        assert_eq!(px.width(), 1);
        assert_eq!(px.height(), 1);
        assert_eq!(px.as_raw(), &[100, 50, 200, 128]);
    }

    #[test]
    fn formats_decode_to_the_same_grid_shape() {
        let rgb = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            3,
            2,
            image::Rgb([10, 20, 30]),
        ));
        let rgba = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            3,
            2,
            image::Rgba([10, 20, 30, 255]),
        ));
        for (img, format) in [
            (rgb, image::ImageFormat::Jpeg),
            (rgba.clone(), image::ImageFormat::Gif),
            // The bundled WebP encoder is lossless only.
            (rgba, image::ImageFormat::WebP),
        ] {
            let mut buf = Vec::new();
            img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
            let px = decode_image(&buf).unwrap();
            assert_eq!((px.width(), px.height()), (3, 2));
            assert_eq!(px.as_raw().len(), 3 * 2 * 4);
            assert_eq!(px.pixel(0, 0).unwrap()[3], 255);
        }
    }

    #[test]
    fn corrupt_bytes_are_a_decode_error() {
        let err = decode_image(b"\x89PNG\r\n\x1a\nnot really").unwrap_err();
        assert!(matches!(err, FramefitError::Decode(_)));
    }

    #[test]
    fn mime_allow_list_is_exact() {
        for ok in ACCEPTED_MIME_TYPES {
            validate_mime(ok).unwrap();
        }
        for bad in ["text/plain", "image/svg+xml", "image/bmp", "IMAGE/PNG", ""] {
            assert!(matches!(
                validate_mime(bad),
                Err(FramefitError::Validation(_))
            ));
        }
    }

    #[test]
    fn ingest_rejects_before_decoding() {
        // Valid PNG bytes with a text MIME type must still be rejected.
        let file = SourceFile::new("notes.txt", "text/plain", png_bytes(1, 1, [0, 0, 0, 255]));
        assert!(matches!(ingest(&file), Err(FramefitError::Validation(_))));

        let file = SourceFile::new("broken.png", "image/png", b"garbage".to_vec());
        let err = ingest(&file).unwrap_err();
        assert!(matches!(err, FramefitError::Decode(_)));
        assert!(err.to_string().contains("broken.png"));
    }

    #[test]
    fn sniff_prefers_content_over_extension() {
        assert_eq!(sniff_mime(&png_bytes(1, 1, [0; 4]), "photo.jpg"), "image/png");
        assert_eq!(sniff_mime(b"hello", "readme.txt"), "text/plain");
        assert_eq!(sniff_mime(b"hello", "photo.JPEG"), "image/jpeg");
        assert_eq!(sniff_mime(b"hello", "blob"), "application/octet-stream");
    }
}
