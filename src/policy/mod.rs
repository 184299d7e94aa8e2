use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;
use crate::sources::SourceKind;
use crate::ConverterError;

/// Stream selector for audio-only downloads
const AUDIO_SELECTOR: &str = "bestaudio/best";

/// Stream selector for MP4 video, falling back to the best overall stream
const VIDEO_MP4_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Output formats the converter can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp3,
    Mp4,
}

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
        }
    }

    /// Parse a caller-supplied format token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "mp3" => Some(MediaFormat::Mp3),
            "mp4" => Some(MediaFormat::Mp4),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio post-processing directive for the extraction engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    /// Target codec (also becomes the artifact extension)
    pub codec: String,

    /// Encoder quality, "0" is the highest available
    pub quality: String,
}

impl AudioExtraction {
    pub fn mp3() -> Self {
        Self {
            codec: "mp3".to_string(),
            quality: "0".to_string(),
        }
    }
}

/// Fully resolved instructions for one engine invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Stream format selector
    pub format_selector: String,

    /// Audio extraction step, absent when the container is kept as-is
    pub postprocess: Option<AudioExtraction>,

    /// Output path template, parameterized by the engine-reported title
    pub output_template: PathBuf,

    /// Directory the artifact must appear in
    pub downloads_dir: PathBuf,

    /// User-Agent header
    pub user_agent: String,

    /// Referer header, the homepage of the detected source
    pub referer: String,

    /// Restrict the engine to IPv4 egress
    pub force_ipv4: bool,

    /// Suppress engine warning output
    pub suppress_warnings: bool,

    /// Reuse cookies from a locally installed browser
    pub cookies_from_browser: Option<String>,
}

/// Resolve a (source, format) request into engine instructions.
///
/// The accepted combinations come from `config.policy`, so tightening or
/// widening format support is a configuration change, not a code change.
pub fn resolve(
    source: SourceKind,
    format_token: &str,
    conversion_id: &str,
    config: &Config,
) -> Result<ExtractionConfig, ConverterError> {
    let unsupported = || ConverterError::UnsupportedFormat {
        format: format_token.to_string(),
        source_kind: source,
    };

    let format = MediaFormat::from_token(format_token).ok_or_else(unsupported)?;

    if !config.policy.allows(source, format) {
        return Err(unsupported());
    }

    let (format_selector, postprocess) = match format {
        MediaFormat::Mp3 => (AUDIO_SELECTOR, Some(AudioExtraction::mp3())),
        MediaFormat::Mp4 => (VIDEO_MP4_SELECTOR, None),
    };

    let output_template = config
        .downloads
        .dir
        .join(format!("{conversion_id}-%(title)s.%(ext)s"));

    Ok(ExtractionConfig {
        format_selector: format_selector.to_string(),
        postprocess,
        output_template,
        downloads_dir: config.downloads.dir.clone(),
        user_agent: config.engine.user_agent.clone(),
        referer: source.homepage().to_string(),
        force_ipv4: config.engine.force_ipv4,
        suppress_warnings: config.engine.suppress_warnings,
        cookies_from_browser: config.engine.cookies_from_browser.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp3_resolves_for_both_sources() {
        let config = Config::default();

        for source in [SourceKind::Youtube, SourceKind::Soundcloud] {
            let extraction = resolve(source, "mp3", "job1", &config).unwrap();
            assert_eq!(extraction.format_selector, AUDIO_SELECTOR);
            assert_eq!(extraction.postprocess, Some(AudioExtraction::mp3()));
            assert_eq!(extraction.referer, source.homepage());
        }
    }

    #[test]
    fn test_mp4_resolves_for_youtube_only() {
        let config = Config::default();

        let extraction = resolve(SourceKind::Youtube, "mp4", "job1", &config).unwrap();
        assert_eq!(extraction.format_selector, VIDEO_MP4_SELECTOR);
        assert!(extraction.postprocess.is_none());

        let err = resolve(SourceKind::Soundcloud, "mp4", "job2", &config).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported format mp4 for source soundcloud");
    }

    #[test]
    fn test_unknown_token_is_unsupported() {
        let config = Config::default();
        let err = resolve(SourceKind::Youtube, "flac", "job1", &config).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported format flac for source youtube");
    }

    #[test]
    fn test_output_template_embeds_conversion_id() {
        let config = Config::default();
        let extraction = resolve(SourceKind::Youtube, "mp3", "job-42", &config).unwrap();
        let template = extraction.output_template.to_string_lossy().into_owned();
        assert!(template.contains("job-42-"));
        assert!(template.ends_with("%(title)s.%(ext)s"));
        assert!(template.starts_with("downloads"));
    }

    #[test]
    fn test_distinct_ids_produce_distinct_templates() {
        let config = Config::default();
        let a = resolve(SourceKind::Youtube, "mp3", "job1", &config).unwrap();
        let b = resolve(SourceKind::Youtube, "mp3", "job2", &config).unwrap();
        assert_ne!(a.output_template, b.output_template);
    }

    #[test]
    fn test_policy_matrix_is_configurable() {
        let mut config = Config::default();
        config.policy.allowed.retain(|rule| rule.format == MediaFormat::Mp3);

        let err = resolve(SourceKind::Youtube, "mp4", "job1", &config).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported format mp4 for source youtube");
    }

    #[test]
    fn test_engine_settings_flow_through() {
        let mut config = Config::default();
        config.engine.cookies_from_browser = Some("firefox".to_string());
        config.engine.force_ipv4 = false;

        let extraction = resolve(SourceKind::Soundcloud, "mp3", "job1", &config).unwrap();
        assert_eq!(extraction.cookies_from_browser.as_deref(), Some("firefox"));
        assert!(!extraction.force_ipv4);
        assert_eq!(extraction.user_agent, crate::config::DEFAULT_USER_AGENT);
    }
}
