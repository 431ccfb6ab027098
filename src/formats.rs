//! Image format table and media type handling
//!
//! Maps declared media types and file extensions onto the formats this crate
//! can re-encode, and records how each encoder treats the quality factor.

use crate::constants::{FALLBACK_MEDIA_TYPE, IMAGE_MEDIA_PREFIX};
use std::fmt;
use std::path::Path;

/// Formats with an encoder available for same-format re-encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
}

/// How an encoder reacts to the quality factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualitySupport {
    /// Quality is the lossy fidelity/size tradeoff
    Lossy,
    /// Output is lossless; quality only selects optimizer effort
    OptimizerEffort,
    /// The encoder has no quality parameter and uses its defaults
    Ignored,
}

impl ImageKind {
    pub fn all() -> [ImageKind; 6] {
        [
            ImageKind::Jpeg,
            ImageKind::Png,
            ImageKind::WebP,
            ImageKind::Gif,
            ImageKind::Bmp,
            ImageKind::Tiff,
        ]
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::WebP),
            "gif" => Some(ImageKind::Gif),
            "bmp" => Some(ImageKind::Bmp),
            "tif" | "tiff" => Some(ImageKind::Tiff),
            _ => None,
        }
    }

    /// Parses a declared media type, ignoring case and any `;` parameters.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::WebP),
            "image/gif" => Some(ImageKind::Gif),
            "image/bmp" | "image/x-ms-bmp" => Some(ImageKind::Bmp),
            "image/tiff" => Some(ImageKind::Tiff),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::WebP => "webp",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::Tiff => "tiff",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::WebP => "image/webp",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Tiff => "image/tiff",
        }
    }

    pub fn quality_support(&self) -> QualitySupport {
        match self {
            ImageKind::Jpeg => QualitySupport::Lossy,
            ImageKind::Png => QualitySupport::OptimizerEffort,
            // image's WebP encoder is lossless only
            ImageKind::WebP | ImageKind::Gif | ImageKind::Bmp | ImageKind::Tiff => {
                QualitySupport::Ignored
            }
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::WebP => "WebP",
            ImageKind::Gif => "GIF",
            ImageKind::Bmp => "BMP",
            ImageKind::Tiff => "TIFF",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for QualitySupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            QualitySupport::Lossy => "lossy, quality sets fidelity",
            QualitySupport::OptimizerEffort => "lossless, quality sets optimizer effort",
            QualitySupport::Ignored => "quality ignored, encoder defaults apply",
        };
        f.write_str(text)
    }
}

pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with(IMAGE_MEDIA_PREFIX)
}

/// Declares a media type for a file from its extension, the way a file
/// picker labels a selected file before anything is read.
pub fn media_type_for_path(path: &Path) -> String {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MEDIA_TYPE.to_string();
    };

    if let Some(kind) = ImageKind::from_extension(ext) {
        return kind.media_type().to_string();
    }

    match ext.to_lowercase().as_str() {
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "heic" => "image/heic",
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => FALLBACK_MEDIA_TYPE,
    }
    .to_string()
}
