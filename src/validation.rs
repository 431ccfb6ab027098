use crate::constants::MAX_FILE_SIZE;
use crate::error::{CompressionError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Validate an input file before its bytes are read
///
/// Checks that the path exists, is a regular file and stays within
/// `MAX_FILE_SIZE`. Returns the file length.
pub fn validate_input_path(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }

    let metadata =
        fs::metadata(path).map_err(|_| CompressionError::FileNotFound(path.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(CompressionError::FileTooLarge(metadata.len(), MAX_FILE_SIZE));
    }

    Ok(metadata.len())
}

/// Make sure the download directory exists and return the target path
/// for `file_name` inside it.
pub fn prepare_output_path(dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))?;

    // Only the final component of the derived name is used.
    let file_name = Path::new(file_name)
        .file_name()
        .ok_or_else(|| CompressionError::DirectoryCreationFailed(dir.join(file_name)))?;

    Ok(dir.join(file_name))
}
