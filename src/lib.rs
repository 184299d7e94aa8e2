//! Media Converter - A Rust CLI tool for downloading media from streaming platforms
//!
//! This library converts YouTube videos and SoundCloud tracks into MP3 or MP4 files
//! by delegating the actual fetch and transcode to yt-dlp, and reports the outcome
//! as a single JSON record for a calling process to parse.

pub mod cli;
pub mod config;
pub mod convert;
pub mod engine;
pub mod output;
pub mod policy;
pub mod sources;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use convert::{ConversionPipeline, ConversionRequest, ConversionResult};
pub use engine::{EngineOutcome, ExtractionEngine};
pub use policy::{ExtractionConfig, MediaFormat};
pub use sources::SourceKind;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the converter
#[derive(thiserror::Error, Debug)]
pub enum ConverterError {
    #[error("Unsupported URL source")]
    UnsupportedSource,

    #[error("Unsupported format {format} for source {source_kind}")]
    UnsupportedFormat {
        format: String,
        source_kind: sources::SourceKind,
    },

    #[error("{0}")]
    Engine(String),

    #[error("Converted file not found: {}", .0.display())]
    MissingArtifact(std::path::PathBuf),

    #[error("{0} is not available. Please install it: https://github.com/yt-dlp/yt-dlp")]
    EngineUnavailable(String),
}
