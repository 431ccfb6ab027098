use crate::constants::{
    DEFAULT_QUALITY, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_IMAGE_DIMENSION,
    MAX_QUALITY, MIN_QUALITY, OXIPNG_PRESET, ZOPFLI_ITERATIONS,
};
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use crate::session::DecodedImage;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, Frame, GenericImageView, ImageReader};
use oxipng::{Deflaters, Options};
use std::fmt;
use std::io::Cursor;
use std::num::NonZeroU8;
use std::sync::Arc;
use std::time::Instant;

/// Re-encode quality, 1 (smallest) to 100 (best)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&value) {
            return Err(CompressionError::InvalidQuality(value));
        }
        Ok(Self(value))
    }

    /// Validates an optional command-line value, falling back to the default.
    pub fn resolve(value: Option<u8>) -> Result<Self> {
        Self::new(value.unwrap_or(DEFAULT_QUALITY))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

impl TryFrom<u8> for Quality {
    type Error = CompressionError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Output of one re-encode. Cloning shares the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResult {
    pub bytes: Arc<[u8]>,
    pub media_type: String,
    pub quality: Quality,
}

impl EncodedResult {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Raster decode/encode primitives behind the re-encode pipeline.
///
/// Both calls are blocking; [`reencode`] and [`probe`] move them onto the
/// blocking pool.
pub trait Codec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    fn encode(&self, image: &DynamicImage, kind: ImageKind, quality: Quality) -> Result<Vec<u8>>;
}

/// Codec backed by the `image` crate encoders, with PNG output passed
/// through oxipng.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CompressionError::Decode(e.to_string()))?;
        let img = reader
            .decode()
            .map_err(|e| CompressionError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(CompressionError::InvalidDimensions(
                width,
                height,
                MAX_IMAGE_DIMENSION,
            ));
        }

        Ok(img)
    }

    fn encode(&self, image: &DynamicImage, kind: ImageKind, quality: Quality) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match kind {
            ImageKind::Jpeg => {
                // JPEG has no alpha channel
                let flattened;
                let source = match image.color() {
                    ColorType::L8 | ColorType::Rgb8 => image,
                    _ => {
                        flattened = DynamicImage::ImageRgb8(image.to_rgb8());
                        &flattened
                    }
                };
                source
                    .write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality.value()))
                    .map_err(encode_error)?;
            }
            ImageKind::Png => {
                let widened;
                let source = match image.color() {
                    ColorType::Rgb32F | ColorType::Rgba32F => {
                        widened = DynamicImage::ImageRgba16(image.to_rgba16());
                        &widened
                    }
                    _ => image,
                };
                let encoder = PngEncoder::new_with_quality(
                    &mut out,
                    CompressionType::Fast,
                    FilterType::Adaptive,
                );
                source.write_with_encoder(encoder).map_err(encode_error)?;
                out = optimize_png(&out, quality)?;
            }
            ImageKind::WebP => {
                to_8bit(image)
                    .write_with_encoder(WebPEncoder::new_lossless(&mut out))
                    .map_err(encode_error)?;
            }
            ImageKind::Gif => {
                // The trailer is written when the encoder drops.
                let mut encoder = GifEncoder::new(&mut out);
                encoder
                    .encode_frame(Frame::new(image.to_rgba8()))
                    .map_err(encode_error)?;
            }
            ImageKind::Bmp => {
                to_8bit(image)
                    .write_with_encoder(BmpEncoder::new(&mut out))
                    .map_err(encode_error)?;
            }
            ImageKind::Tiff => {
                let mut cursor = Cursor::new(Vec::new());
                to_8bit(image)
                    .write_with_encoder(TiffEncoder::new(&mut cursor))
                    .map_err(encode_error)?;
                out = cursor.into_inner();
            }
        }
        Ok(out)
    }
}

fn encode_error(err: image::ImageError) -> CompressionError {
    CompressionError::Encode(err.to_string())
}

fn to_8bit(image: &DynamicImage) -> DynamicImage {
    if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}

/// Lossless PNG optimization; quality picks how hard the deflater works.
fn optimize_png(png: &[u8], quality: Quality) -> Result<Vec<u8>> {
    let mut options = Options::from_preset(OXIPNG_PRESET);
    options.force = true;
    options.deflate = png_deflater(quality);

    oxipng::optimize_from_memory(png, &options)
        .map_err(|e| CompressionError::Encode(format!("PNG optimization failed: {}", e)))
}

fn png_deflater(quality: Quality) -> Deflaters {
    let high = Deflaters::Libdeflater {
        compression: LIBDEFLATER_HIGH_LEVEL,
    };
    if quality.value() >= 90 {
        match NonZeroU8::new(ZOPFLI_ITERATIONS) {
            Some(iterations) => Deflaters::Zopfli { iterations },
            None => high,
        }
    } else if quality.value() >= 70 {
        high
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    }
}

/// Decode `bytes` and re-encode them in the declared media type.
///
/// Decode failures win over a missing encoder so that garbage bytes always
/// surface as [`CompressionError::Decode`].
pub fn reencode_blocking(
    codec: &dyn Codec,
    bytes: &[u8],
    media_type: &str,
    quality: Quality,
) -> Result<EncodedResult> {
    let started = Instant::now();
    let image = codec.decode(bytes)?;
    let kind = ImageKind::from_media_type(media_type)
        .ok_or_else(|| CompressionError::Encode(format!("no encoder for {}", media_type)))?;
    let encoded = codec.encode(&image, kind, quality)?;

    tracing::debug!(
        media_type,
        quality = quality.value(),
        input_bytes = bytes.len(),
        output_bytes = encoded.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "re-encoded image"
    );

    Ok(EncodedResult {
        bytes: encoded.into(),
        media_type: media_type.to_string(),
        quality,
    })
}

/// Re-encode on the blocking pool.
pub async fn reencode(
    codec: Arc<dyn Codec>,
    bytes: Arc<[u8]>,
    media_type: String,
    quality: Quality,
) -> Result<EncodedResult> {
    tokio::task::spawn_blocking(move || {
        reencode_blocking(codec.as_ref(), &bytes, &media_type, quality)
    })
    .await
    .map_err(|e| CompressionError::Encode(format!("encoder task failed: {}", e)))?
}

/// Decode once to learn the pixel dimensions.
pub async fn probe(codec: Arc<dyn Codec>, bytes: Arc<[u8]>) -> Result<DecodedImage> {
    tokio::task::spawn_blocking(move || {
        let image = codec.decode(&bytes)?;
        Ok(DecodedImage {
            width: image.width(),
            height: image.height(),
        })
    })
    .await
    .map_err(|e| CompressionError::Decode(format!("decoder task failed: {}", e)))?
}
