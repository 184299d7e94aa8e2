use clap::Parser;

#[derive(Parser)]
#[command(
    name = "converter",
    about = "Convert media from YouTube or SoundCloud and report the result as JSON",
    version,
    long_about = "Downloads a YouTube video or SoundCloud track with yt-dlp, transcodes it \
to the requested format, and prints a single JSON result line on stdout for a calling \
process to parse. Diagnostics go to stderr."
)]
pub struct Cli {
    /// URL of the YouTube video or SoundCloud track
    #[arg(value_name = "URL")]
    pub url: String,

    /// Output format (mp3 or mp4)
    #[arg(value_name = "FORMAT")]
    pub format: String,

    /// Unique ID for this conversion, used to namespace the output filename
    #[arg(value_name = "CONVERSION_ID")]
    pub conversion_id: String,
}
