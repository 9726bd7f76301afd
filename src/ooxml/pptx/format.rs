//! Image formats carried by picture shapes.

use crate::ooxml::opc::constants::content_type as ct;

/// Image format types a picture part may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Emf,
    Wmf,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => ct::PNG,
            Self::Jpeg => ct::JPEG,
            Self::Gif => ct::GIF,
            Self::Bmp => ct::BMP,
            Self::Tiff => ct::TIFF,
            Self::Emf => ct::X_EMF,
            Self::Wmf => ct::X_WMF,
        }
    }

    /// Get the file extension for this image format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Emf => "emf",
            Self::Wmf => "wmf",
        }
    }

    /// Detect image format from bytes (magic number detection).
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF: 47 49 46 38 (GIF8)
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        // BMP: 42 4D (BM)
        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        // TIFF: 49 49 2A 00 (little-endian) or 4D 4D 00 2A (big-endian)
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        // EMF: EMR_HEADER record type 1, " EMF" signature at offset 40
        if bytes.starts_with(&[0x01, 0x00, 0x00, 0x00]) && bytes.get(40..44) == Some(b" EMF") {
            return Some(Self::Emf);
        }

        // WMF: placeable metafile key D7 CD C6 9A
        if bytes.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) {
            return Some(Self::Wmf);
        }

        None
    }

    /// Map a content type back to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            ct::PNG => Some(Self::Png),
            ct::JPEG => Some(Self::Jpeg),
            ct::GIF => Some(Self::Gif),
            ct::BMP => Some(Self::Bmp),
            ct::TIFF => Some(Self::Tiff),
            ct::X_EMF => Some(Self::Emf),
            ct::X_WMF => Some(Self::Wmf),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_bytes() {
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect_from_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect_from_bytes(b"abc"), None);
        assert_eq!(ImageFormat::detect_from_bytes(b"plain text"), None);
    }

    #[test]
    fn test_mime_roundtrip() {
        for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Emf] {
            assert_eq!(ImageFormat::from_mime_type(format.mime_type()), Some(format));
        }
    }
}
