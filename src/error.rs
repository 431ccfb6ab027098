use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Unsupported file type: {0}. Please choose an image file")]
    UnsupportedType(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to re-encode image: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Nothing to download yet: no successful re-encode exists")]
    NothingToDownload,
}

impl CompressionError {
    /// The three failure kinds an interactive user is told about directly.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CompressionError::UnsupportedType(_)
                | CompressionError::Decode(_)
                | CompressionError::Encode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
