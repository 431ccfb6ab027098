#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_preview::codec::{Codec, Quality};
use img_preview::error::{CompressionError, Result};
use img_preview::formats::ImageKind;
use img_preview::{Screen, View};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Deterministic pattern with enough detail that JPEG quality matters.
pub fn pattern_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let n = x.wrapping_mul(2654435761).wrapping_add(y.wrapping_mul(40503)) >> 7;
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            (n & 0xFF) as u8,
        ])
    }))
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&pattern_image(width, height), ImageFormat::Jpeg)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&pattern_image(width, height), ImageFormat::Png)
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Screen that keeps every rendered view and every reported error.
#[derive(Debug, Default)]
pub struct RecordingScreen {
    pub renders: Vec<View>,
    pub errors: Vec<String>,
}

impl Screen for RecordingScreen {
    fn render(&mut self, view: &View) {
        self.renders.push(view.clone());
    }

    fn notify_error(&mut self, error: &CompressionError) {
        self.errors.push(error.to_string());
    }
}

/// Codec with predictable output: any bytes decode to a fixed size image,
/// and every encode yields `output_len` copies of the quality value.
/// Lower qualities take longer, so completions arrive out of order.
#[derive(Debug)]
pub struct ScriptedCodec {
    pub width: u32,
    pub height: u32,
    pub output_len: usize,
    pub delay_per_step: Duration,
    pub fail_encode: AtomicBool,
}

impl ScriptedCodec {
    pub fn new(width: u32, height: u32, output_len: usize) -> Self {
        Self {
            width,
            height,
            output_len,
            delay_per_step: Duration::ZERO,
            fail_encode: AtomicBool::new(false),
        }
    }

    pub fn with_delay(mut self, delay_per_step: Duration) -> Self {
        self.delay_per_step = delay_per_step;
        self
    }

    pub fn set_fail_encode(&self, fail: bool) {
        self.fail_encode.store(fail, Ordering::SeqCst);
    }
}

impl Codec for ScriptedCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(CompressionError::Decode("empty input".to_string()));
        }
        Ok(DynamicImage::new_rgb8(self.width, self.height))
    }

    fn encode(&self, _image: &DynamicImage, _kind: ImageKind, quality: Quality) -> Result<Vec<u8>> {
        if self.fail_encode.load(Ordering::SeqCst) {
            return Err(CompressionError::Encode("scripted failure".to_string()));
        }
        let steps = (100 - quality.value()) as u32;
        std::thread::sleep(self.delay_per_step * steps);
        Ok(vec![quality.value(); self.output_len])
    }
}
