use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::{self, ExtractionEngine};
use crate::policy;
use crate::sources;
use crate::utils;
use crate::{ConverterError, Result};

/// One conversion job as supplied by the caller
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// URL of the media to convert
    pub url: String,

    /// Requested output format token (mp3 or mp4)
    pub format: String,

    /// Caller-supplied correlation token, embedded in the output filename
    pub conversion_id: String,
}

impl ConversionRequest {
    pub fn new(url: String, format: String, conversion_id: String) -> Self {
        Self {
            url,
            format,
            conversion_id,
        }
    }
}

/// Final outcome reported to the caller.
///
/// Exactly one of the two shapes holds: success with a non-empty filename,
/// or failure with a non-empty error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionResult {
    pub success: bool,
    pub title: String,
    pub filename: String,
    pub error: String,
}

impl ConversionResult {
    pub fn ok(title: String, filename: String) -> Self {
        Self {
            success: true,
            title,
            filename,
            error: String::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            title: String::new(),
            filename: String::new(),
            error: error.into(),
        }
    }
}

/// Main conversion pipeline: classify, resolve policy, fetch, verify
pub struct ConversionPipeline {
    config: Config,
    engine: Box<dyn ExtractionEngine>,
}

impl ConversionPipeline {
    /// Create a new pipeline and bootstrap the downloads directory
    pub fn new(config: Config, engine: Box<dyn ExtractionEngine>) -> Result<Self> {
        utils::ensure_downloads_dir(&config.downloads.dir)?;

        Ok(Self { config, engine })
    }

    /// Run one conversion. Every failure category is folded into a
    /// `ConversionResult` so the caller always receives the same JSON shape.
    pub async fn run(&self, request: &ConversionRequest) -> ConversionResult {
        match self.try_run(request).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!("Conversion {} failed: {}", request.conversion_id, err);
                ConversionResult::failure(err.to_string())
            }
        }
    }

    async fn try_run(&self, request: &ConversionRequest) -> std::result::Result<ConversionResult, ConverterError> {
        let source = sources::classify(&request.url).ok_or(ConverterError::UnsupportedSource)?;
        tracing::info!("Detected source {} for {}", source, request.url);

        let extraction = policy::resolve(
            source,
            &request.format,
            &request.conversion_id,
            &self.config,
        )?;

        let outcome = self.engine.fetch(&request.url, &extraction).await?;
        let filename = engine::artifact_basename(&outcome, &extraction)?;

        self.verify(&filename)?;

        tracing::info!("Converted {} to {}", request.url, filename);
        Ok(ConversionResult::ok(outcome.title, filename))
    }

    /// Confirm the artifact actually landed on disk. Guards against the
    /// engine reporting success while its post-processing step silently
    /// failed to produce output.
    fn verify(&self, filename: &str) -> std::result::Result<(), ConverterError> {
        let path = self.config.downloads.dir.join(filename);

        if path.is_file() {
            Ok(())
        } else {
            Err(ConverterError::MissingArtifact(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineOutcome, MockExtractionEngine};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn test_config(downloads_dir: &Path) -> Config {
        let mut config = Config::default();
        config.downloads.dir = downloads_dir.to_path_buf();
        config
    }

    fn request(url: &str, format: &str, id: &str) -> ConversionRequest {
        ConversionRequest::new(url.to_string(), format.to_string(), id.to_string())
    }

    fn assert_result_invariant(result: &ConversionResult) {
        if result.success {
            assert!(!result.filename.is_empty());
            assert!(result.error.is_empty());
        } else {
            assert!(!result.error.is_empty());
            assert!(result.filename.is_empty());
            assert!(result.title.is_empty());
        }
    }

    #[tokio::test]
    async fn test_successful_mp3_conversion() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("downloads");

        let mut engine = MockExtractionEngine::new();
        engine.expect_fetch().returning(|_, _| {
            Ok(EngineOutcome {
                title: "Example Song".to_string(),
                predicted_path: PathBuf::from("downloads/job1-Example Song.webm"),
            })
        });

        let pipeline =
            ConversionPipeline::new(test_config(&downloads), Box::new(engine)).unwrap();
        fs_err::write(downloads.join("job1-Example Song.mp3"), b"audio").unwrap();

        let result = pipeline
            .run(&request("https://www.youtube.com/watch?v=abc123", "mp3", "job1"))
            .await;

        assert_eq!(
            result,
            ConversionResult {
                success: true,
                title: "Example Song".to_string(),
                filename: "job1-Example Song.mp3".to_string(),
                error: String::new(),
            }
        );
        assert_result_invariant(&result);
    }

    #[tokio::test]
    async fn test_unsupported_format_skips_engine() {
        let temp = TempDir::new().unwrap();

        let mut engine = MockExtractionEngine::new();
        engine.expect_fetch().times(0);

        let pipeline =
            ConversionPipeline::new(test_config(temp.path()), Box::new(engine)).unwrap();

        let result = pipeline
            .run(&request("https://soundcloud.com/artist/track", "mp4", "job2"))
            .await;

        assert_eq!(result.error, "Unsupported format mp4 for source soundcloud");
        assert_result_invariant(&result);
    }

    #[tokio::test]
    async fn test_unrecognized_source_skips_engine() {
        let temp = TempDir::new().unwrap();

        let mut engine = MockExtractionEngine::new();
        engine.expect_fetch().times(0);

        let pipeline =
            ConversionPipeline::new(test_config(temp.path()), Box::new(engine)).unwrap();

        let result = pipeline
            .run(&request("https://example.com/file.mp3", "mp3", "job3"))
            .await;

        assert_eq!(result.error, "Unsupported URL source");
        assert_result_invariant(&result);
    }

    #[tokio::test]
    async fn test_missing_artifact_downgrades_to_failure() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("downloads");

        let mut engine = MockExtractionEngine::new();
        engine.expect_fetch().returning(|_, _| {
            Ok(EngineOutcome {
                title: "Example Song".to_string(),
                predicted_path: PathBuf::from("downloads/job4-Example Song.webm"),
            })
        });

        let pipeline =
            ConversionPipeline::new(test_config(&downloads), Box::new(engine)).unwrap();

        let result = pipeline
            .run(&request("https://youtu.be/abc123", "mp3", "job4"))
            .await;

        assert!(!result.success);
        let expected_path = downloads.join("job4-Example Song.mp3");
        assert!(result.error.contains(&expected_path.to_string_lossy().into_owned()));
        assert_result_invariant(&result);
    }

    #[tokio::test]
    async fn test_engine_error_passes_through_verbatim() {
        let temp = TempDir::new().unwrap();

        let mut engine = MockExtractionEngine::new();
        engine.expect_fetch().returning(|_, _| {
            Err(ConverterError::Engine(
                "ERROR: [youtube] abc123: Video unavailable".to_string(),
            ))
        });

        let pipeline =
            ConversionPipeline::new(test_config(temp.path()), Box::new(engine)).unwrap();

        let result = pipeline
            .run(&request("https://youtu.be/abc123", "mp3", "job5"))
            .await;

        assert_eq!(result.error, "ERROR: [youtube] abc123: Video unavailable");
        assert_result_invariant(&result);
    }

    #[tokio::test]
    async fn test_pipeline_bootstrap_creates_downloads_dir() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("nested").join("downloads");

        let engine = MockExtractionEngine::new();
        ConversionPipeline::new(test_config(&downloads), Box::new(engine)).unwrap();

        assert!(downloads.is_dir());

        // Creating it again is harmless
        let engine = MockExtractionEngine::new();
        ConversionPipeline::new(test_config(&downloads), Box::new(engine)).unwrap();
    }

    #[tokio::test]
    async fn test_mp4_conversion_keeps_container() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().to_path_buf();

        let mut engine = MockExtractionEngine::new();
        engine.expect_fetch().returning(|_, _| {
            Ok(EngineOutcome {
                title: "Example Video".to_string(),
                predicted_path: PathBuf::from("downloads/job6-Example Video.mp4"),
            })
        });

        let pipeline =
            ConversionPipeline::new(test_config(&downloads), Box::new(engine)).unwrap();
        fs_err::write(downloads.join("job6-Example Video.mp4"), b"video").unwrap();

        let result = pipeline
            .run(&request("https://www.youtube.com/watch?v=abc", "mp4", "job6"))
            .await;

        assert!(result.success);
        assert_eq!(result.filename, "job6-Example Video.mp4");
    }
}
