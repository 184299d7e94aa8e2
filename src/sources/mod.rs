use serde::{Deserialize, Serialize};
use url::Url;

/// Platforms the converter knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Youtube,
    Soundcloud,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Youtube => "youtube",
            SourceKind::Soundcloud => "soundcloud",
        }
    }

    /// Canonical homepage of the platform, sent as the Referer header
    pub fn homepage(&self) -> &'static str {
        match self {
            SourceKind::Youtube => "https://www.youtube.com/",
            SourceKind::Soundcloud => "https://soundcloud.com/",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a URL by its host. Returns `None` for anything that is neither
/// YouTube nor SoundCloud, including URLs that fail to parse.
///
/// The YouTube check runs first; hosts are matched by substring so regional
/// and mobile subdomains (m.youtube.com, on.soundcloud.com, ...) match too.
pub fn classify(url: &str) -> Option<SourceKind> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    if host.contains("youtube.com") || host.contains("youtu.be") {
        Some(SourceKind::Youtube)
    } else if host.contains("soundcloud.com") {
        Some(SourceKind::Soundcloud)
    } else {
        None
    }
}
