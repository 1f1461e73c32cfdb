//! Video production step of the pipeline.

use crate::config::EncoderConfig;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use trackforge_av::{encode_still_video, get_tool_path, StillVideoSettings};

/// Produces an upload-ready video from a cover image and an audio track.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Write the combined video to `output`.
    async fn combine(&self, image: &Path, audio: &Path, output: &Path) -> trackforge_av::Result<()>;
}

/// [`Transcoder`] backed by an ffmpeg process.
pub struct FfmpegTranscoder {
    ffmpeg_path: Option<PathBuf>,
    settings: StillVideoSettings,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: Option<PathBuf>, settings: StillVideoSettings) -> Self {
        Self {
            ffmpeg_path,
            settings,
        }
    }

    pub fn from_config(config: &EncoderConfig) -> Self {
        Self::new(config.ffmpeg_path.clone(), config.settings())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn combine(&self, image: &Path, audio: &Path, output: &Path) -> trackforge_av::Result<()> {
        let ffmpeg = get_tool_path("ffmpeg", self.ffmpeg_path.as_deref())?;
        encode_still_video(&ffmpeg, image, audio, output, &self.settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_configured_encoder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cover.png");
        let audio = dir.path().join("song.mp3");
        std::fs::write(&image, b"png").unwrap();
        std::fs::write(&audio, b"mp3").unwrap();

        let transcoder = FfmpegTranscoder::new(
            Some(dir.path().join("no-such-ffmpeg")),
            StillVideoSettings::default(),
        );

        // Falls back to PATH; either ffmpeg is missing or it rejects the fake inputs
        let result = transcoder
            .combine(&image, &audio, &dir.path().join("out.mp4"))
            .await;
        assert!(result.is_err());
    }
}
