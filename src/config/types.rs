use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use trackforge_av::StillVideoSettings;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scratch: ScratchConfig,

    #[serde(default)]
    pub confirmation: ConfirmationConfig,

    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub video: VideoPlatformConfig,

    #[serde(default)]
    pub audio: AudioPlatformConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    /// Ingestion endpoint of the originating site. Submission is skipped when absent.
    #[serde(default)]
    pub site: Option<SiteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScratchConfig {
    /// Directory downloaded and encoded files are written to
    #[serde(default = "default_scratch_dir")]
    pub dir: PathBuf,
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("trackforge")
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            dir: default_scratch_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmationConfig {
    /// How long the requester has to confirm (default: 60)
    #[serde(default = "default_confirmation_timeout")]
    pub timeout_secs: u64,
}

fn default_confirmation_timeout() -> u64 {
    60
}

impl ConfirmationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_confirmation_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncoderConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Encoding preset (default: "medium")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Output frame rate for the looped cover (default: 2)
    #[serde(default = "default_framerate")]
    pub framerate: u32,

    /// Audio bitrate (default: "192k")
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_framerate() -> u32 {
    2
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

impl EncoderConfig {
    pub fn settings(&self) -> StillVideoSettings {
        StillVideoSettings {
            preset: self.preset.clone(),
            framerate: self.framerate,
            audio_bitrate: self.audio_bitrate.clone(),
            ..Default::default()
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            preset: default_preset(),
            framerate: default_framerate(),
            audio_bitrate: default_audio_bitrate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Timeout for downloads, uploads and submissions (default: 600)
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_http_timeout() -> u64 {
    600
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoPlatformConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_video_name")]
    pub name: String,

    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub access_token: String,

    /// Public watch URL; `{id}` is replaced with the uploaded video id
    #[serde(default = "default_watch_url_template")]
    pub watch_url_template: String,

    /// Visibility of the uploaded video (default: "public")
    #[serde(default = "default_privacy")]
    pub privacy: String,
}

fn default_video_name() -> String {
    "video".to_string()
}

fn default_watch_url_template() -> String {
    "https://www.youtube.com/watch?v={id}".to_string()
}

fn default_privacy() -> String {
    "public".to_string()
}

impl Default for VideoPlatformConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: default_video_name(),
            api_url: String::new(),
            access_token: String::new(),
            watch_url_template: default_watch_url_template(),
            privacy: default_privacy(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioPlatformConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_audio_name")]
    pub name: String,

    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub access_token: String,
}

fn default_audio_name() -> String {
    "audio".to_string()
}

impl Default for AudioPlatformConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: default_audio_name(),
            api_url: String::new(),
            access_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Webhook of the internal feed channel; notifications are skipped when unset
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub url: String,

    /// Shared secret for HMAC-SHA256 request signing
    pub secret: String,
}
