//! Size formatting and derived display values
//!
//! Pure helpers shared by the controller, the terminal front-end and the
//! `info` command.

use crate::constants::{COMPRESSED_NAME_PREFIX, SIZE_UNITS};

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Size scaled to the largest unit not exceeding it, with two decimals
///   (e.g. "0 Bytes", "512.00 Bytes", "1.50 KB", "1.00 GB")
pub fn format_file_size(bytes: u64) -> String {
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < SIZE_UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    format!("{:.2} {}", size, SIZE_UNITS[unit_index])
}

/// Calculate compression ratio as a percentage, rounded to one decimal
///
/// # Arguments
/// * `original_size` - Original file size in bytes
/// * `compressed_size` - Compressed file size in bytes
///
/// # Returns
/// * Percentage saved; negative when re-encoding made the file larger
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = (1.0 - compressed_size as f64 / original_size as f64) * 100.0;
    (ratio * 10.0).round() / 10.0
}

pub fn format_ratio(ratio: f64) -> String {
    format!("{:.1}%", ratio)
}

pub fn format_dimensions(width: u32, height: u32) -> String {
    format!("{} x {}", width, height)
}

pub fn format_quality(quality: u8) -> String {
    format!("{}%", quality)
}

/// File name offered for the re-encoded download.
pub fn compressed_file_name(original_name: &str) -> String {
    format!("{}{}", COMPRESSED_NAME_PREFIX, original_name)
}
