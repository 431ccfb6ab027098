pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Maximum accepted source file size in bytes (100MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16384;

pub const IMAGE_MEDIA_PREFIX: &str = "image/";
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";
pub const COMPRESSED_NAME_PREFIX: &str = "compressed_";

pub const OXIPNG_PRESET: u8 = 4;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;

pub const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const DIMENSIONS_PREFIX: &str = "📏 Dimensions:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
pub const QUALITY_PREFIX: &str = "🎚️  Quality:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const INFO_PREFIX: &str = "📋";
