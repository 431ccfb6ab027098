use crate::codec::{self, ImageCodec};
use crate::constants::INFO_PREFIX;
use crate::error::{CompressionError, Result};
use crate::formats::{is_image_media_type, ImageKind};
use crate::session::{DecodedImage, SourceFile};
use crate::utils::{format_dimensions, format_file_size};
use std::path::Path;
use std::sync::Arc;

/// Summary of a file as the session would load it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub image: DecodedImage,
    pub kind: Option<ImageKind>,
}

pub async fn get_image_info(input_path: &Path) -> Result<ImageInfo> {
    let file = SourceFile::open(input_path).await?;
    if !is_image_media_type(&file.media_type) {
        return Err(CompressionError::UnsupportedType(file.media_type));
    }

    let image = codec::probe(Arc::new(ImageCodec), Arc::clone(&file.bytes)).await?;
    Ok(ImageInfo {
        kind: ImageKind::from_media_type(&file.media_type),
        size: file.len(),
        name: file.name,
        media_type: file.media_type,
        image,
    })
}

pub fn print_image_info(info: &ImageInfo) {
    crate::info!("{} Basic Information:", INFO_PREFIX);
    crate::info!("  📁 File: {}", info.name);
    crate::info!("  🎭 Media type: {}", info.media_type);
    crate::info!(
        "  📏 Dimensions: {}",
        format_dimensions(info.image.width, info.image.height)
    );
    crate::info!(
        "  📦 File size: {} ({} bytes)",
        format_file_size(info.size),
        info.size
    );

    let total_pixels = info.image.width as u64 * info.image.height as u64;
    crate::verbose!("Total pixels: {}", total_pixels);
    if info.image.height > 0 {
        let aspect_ratio = info.image.width as f64 / info.image.height as f64;
        crate::verbose!("Aspect ratio: {:.2}:1", aspect_ratio);
    }

    crate::info!("\n💡 Re-encoding:");
    match info.kind {
        Some(kind) => {
            crate::info!("  🎯 {} encoder: {}", kind, kind.quality_support());
            if info.size > 5 * 1024 * 1024 {
                crate::info!("  🎯 Large file (>5MB): try quality 60-80");
            } else if info.size > 1024 * 1024 {
                crate::info!("  🎯 Medium file (1-5MB): try quality 70-85");
            } else {
                crate::info!("  🎯 Small file (<1MB): try quality 85-95");
            }
        }
        None => crate::info!("  ⚠️  No encoder for {}; re-encoding will fail", info.media_type),
    }
}
