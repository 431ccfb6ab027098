use crate::codec::{self, Codec};
use crate::error::{CompressionError, Result};
use crate::formats::{is_image_media_type, media_type_for_path};
use crate::validation::validate_input_path;
use std::path::Path;
use std::sync::Arc;

/// One user-selected file, held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub bytes: Arc<[u8]>,
    pub media_type: String,
    pub name: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
            name: name.into(),
        }
    }

    /// Reads a file from disk. The media type is declared from the
    /// extension, not sniffed from the content.
    pub async fn open(path: &Path) -> Result<Self> {
        validate_input_path(path)?;
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CompressionError::FileNotFound(path.to_path_buf()))?;

        Ok(Self::new(name, media_type_for_path(path), bytes))
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
}

/// The source and its decoded reference, always replaced together.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub source: SourceFile,
    pub image: DecodedImage,
}

#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<Loaded>,
    generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and decode `file`, then make it the active source.
    ///
    /// On any failure the previously loaded file stays active.
    pub async fn load(&mut self, file: SourceFile, codec: Arc<dyn Codec>) -> Result<DecodedImage> {
        if !is_image_media_type(&file.media_type) {
            tracing::debug!(name = %file.name, media_type = %file.media_type, "rejected non-image file");
            return Err(CompressionError::UnsupportedType(file.media_type));
        }

        let image = codec::probe(codec, Arc::clone(&file.bytes)).await?;

        self.current = Some(Loaded {
            source: file,
            image,
        });
        self.generation += 1;

        tracing::debug!(
            generation = self.generation,
            width = image.width,
            height = image.height,
            "loaded source image"
        );
        Ok(image)
    }

    pub fn current(&self) -> Option<&Loaded> {
        self.current.as_ref()
    }

    /// Counts successful loads; identifies which source a re-encode was
    /// started for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }
}
