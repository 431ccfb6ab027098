pub mod logger;

pub mod cli;
pub mod codec;
pub mod constants;
pub mod controller;
pub mod error;
pub mod formats;
pub mod info;
pub mod interactive;
pub mod session;
pub mod utils;
pub mod validation;

pub use codec::{probe, reencode, Codec, EncodedResult, ImageCodec, Quality};
pub use controller::{
    Completion, Completions, Controller, Download, Event, Handled, Metrics, Phase, Screen, View,
};
pub use error::{CompressionError, Result};
pub use session::{DecodedImage, SessionState, SourceFile};
pub use utils::{calculate_compression_ratio, compressed_file_name, format_file_size};
