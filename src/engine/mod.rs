use async_trait::async_trait;
use std::path::PathBuf;

pub mod ytdlp;

use crate::policy::ExtractionConfig;
use crate::ConverterError;

pub use ytdlp::YtDlpEngine;

/// What the engine reports back after a successful fetch
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    /// Human-readable media title
    pub title: String,

    /// Path the engine predicts for the artifact, before any audio
    /// post-processing rewrites the container
    pub predicted_path: PathBuf,
}

/// Trait for the external fetch-and-transcode collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Fetch and process a URL in one call, returning the reported metadata
    async fn fetch(
        &self,
        url: &str,
        extraction: &ExtractionConfig,
    ) -> Result<EngineOutcome, ConverterError>;

    /// Check whether the engine can be invoked at all
    async fn check_availability(&self) -> bool;

    /// Get the name of this engine
    fn name(&self) -> &'static str;
}

/// Derive the artifact's bare filename from the engine outcome.
///
/// When audio extraction ran, the engine predicted the pre-transcode
/// container, so the extension is replaced with the post-processing codec.
/// Directory components are stripped for reporting.
pub fn artifact_basename(
    outcome: &EngineOutcome,
    extraction: &ExtractionConfig,
) -> Result<String, ConverterError> {
    let mut path = outcome.predicted_path.clone();

    if let Some(audio) = &extraction.postprocess {
        path.set_extension(&audio.codec);
    }

    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ConverterError::Engine("Engine reported an output path without a file name".to_string())
        })
}
