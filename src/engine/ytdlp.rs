use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use super::{EngineOutcome, ExtractionEngine};
use crate::config::EngineConfig;
use crate::policy::ExtractionConfig;
use crate::utils;
use crate::ConverterError;

/// Extraction engine backed by the yt-dlp binary
pub struct YtDlpEngine {
    binary: String,
}

impl YtDlpEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            binary: config.binary.clone(),
        }
    }

    /// Build the full argument list for one invocation.
    ///
    /// `--print-json` makes yt-dlp download and emit the metadata of the
    /// fetched media as a single JSON line, so one call covers both the
    /// metadata extraction and the actual download/transcode.
    fn build_args(url: &str, extraction: &ExtractionConfig) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--print-json".to_string(),
            "--no-playlist".to_string(),
            "--format".to_string(),
            extraction.format_selector.clone(),
            "--output".to_string(),
            extraction.output_template.to_string_lossy().into_owned(),
            "--user-agent".to_string(),
            extraction.user_agent.clone(),
            "--referer".to_string(),
            extraction.referer.clone(),
        ];

        if let Some(audio) = &extraction.postprocess {
            args.push("--extract-audio".to_string());
            args.push("--audio-format".to_string());
            args.push(audio.codec.clone());
            args.push("--audio-quality".to_string());
            args.push(audio.quality.clone());
        }

        if let Some(browser) = &extraction.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        if extraction.force_ipv4 {
            args.push("--force-ipv4".to_string());
        }

        if extraction.suppress_warnings {
            args.push("--no-warnings".to_string());
        }

        args.push(url.to_string());
        args
    }

    /// Parse the metadata line out of the engine's stdout.
    ///
    /// yt-dlp may interleave progress noise even in quiet modes, so the
    /// last JSON-looking line wins rather than requiring clean output.
    fn parse_outcome(stdout: &str) -> Result<EngineOutcome, ConverterError> {
        let line = stdout
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with('{') && line.ends_with('}'))
            .next_back()
            .ok_or_else(|| {
                ConverterError::Engine("Engine produced no JSON metadata".to_string())
            })?;

        let info: Value = serde_json::from_str(line).map_err(|e| {
            ConverterError::Engine(format!("Failed to parse engine metadata: {e}"))
        })?;

        let title = info["title"].as_str().unwrap_or("Unknown Title").to_string();

        let predicted = info["_filename"]
            .as_str()
            .or_else(|| info["filename"].as_str())
            .ok_or_else(|| {
                ConverterError::Engine("Engine metadata did not include a filename".to_string())
            })?;

        Ok(EngineOutcome {
            title,
            predicted_path: PathBuf::from(predicted),
        })
    }
}

#[async_trait]
impl ExtractionEngine for YtDlpEngine {
    async fn fetch(
        &self,
        url: &str,
        extraction: &ExtractionConfig,
    ) -> Result<EngineOutcome, ConverterError> {
        let args = Self::build_args(url, extraction);
        tracing::debug!("Invoking {} for {}", self.binary, url);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ConverterError::Engine(format!("Failed to launch {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.binary, output.status)
            } else {
                stderr
            };
            return Err(ConverterError::Engine(message));
        }

        Self::parse_outcome(&String::from_utf8_lossy(&output.stdout))
    }

    async fn check_availability(&self) -> bool {
        utils::check_command_available(&self.binary).await
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
