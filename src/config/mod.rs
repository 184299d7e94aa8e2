use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::policy::MediaFormat;
use crate::sources::SourceKind;

/// Default desktop User-Agent presented to the platforms
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Downloads directory settings
    pub downloads: DownloadsConfig,

    /// Extraction engine settings
    pub engine: EngineConfig,

    /// Which (source, format) pairs are accepted
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadsConfig {
    /// Directory where converted files are written
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name or path of the yt-dlp compatible binary
    pub binary: String,

    /// User-Agent header passed to the engine
    pub user_agent: String,

    /// Restrict the engine to IPv4 egress
    pub force_ipv4: bool,

    /// Suppress engine warning output
    pub suppress_warnings: bool,

    /// Reuse cookies from a locally installed browser (e.g. "chrome")
    pub cookies_from_browser: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Accepted (source, format) combinations
    pub allowed: Vec<FormatRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRule {
    pub source: SourceKind,
    pub format: MediaFormat,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("downloads"),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            force_ipv4: true,
            suppress_warnings: true,
            cookies_from_browser: None,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed: vec![
                FormatRule {
                    source: SourceKind::Youtube,
                    format: MediaFormat::Mp3,
                },
                FormatRule {
                    source: SourceKind::Youtube,
                    format: MediaFormat::Mp4,
                },
                FormatRule {
                    source: SourceKind::Soundcloud,
                    format: MediaFormat::Mp3,
                },
            ],
        }
    }
}

impl PolicyConfig {
    /// Check whether a (source, format) pair is accepted
    pub fn allows(&self, source: SourceKind, format: MediaFormat) -> bool {
        self.allowed
            .iter()
            .any(|rule| rule.source == source && rule.format == format)
    }
}

impl Config {
    /// Load configuration from file, falling back to compiled-in defaults.
    ///
    /// The configuration is never written back; this tool runs as a
    /// subprocess and must not leave state behind.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(config_path) if config_path.exists() => {
                let content = fs_err::read_to_string(&config_path)
                    .context("Failed to read config file")?;

                let config: Config = serde_yaml::from_str(&content)
                    .context("Failed to parse config file")?;

                config.validate()?;
                tracing::debug!("Loaded configuration from {}", config_path.display());
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Get configuration file path
    fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("media-converter").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.engine.binary.trim().is_empty() {
            anyhow::bail!("Engine binary must be configured");
        }

        if self.downloads.dir.as_os_str().is_empty() {
            anyhow::bail!("Downloads directory must be configured");
        }

        Ok(())
    }
}
