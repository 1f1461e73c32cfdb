//! Still-image video encoding.
//!
//! Combines a single cover image with an audio track into an MP4 that video
//! platforms accept: the image is looped as the only video frame source and
//! the audio becomes the soundtrack.

use crate::{Error, Result};
use std::path::Path;
use tokio::process::Command;

/// Encoder settings for still-image uploads.
#[derive(Debug, Clone)]
pub struct StillVideoSettings {
    /// Video encoder (default: libx264).
    pub video_codec: String,
    /// H.264 profile (default: high).
    pub profile: String,
    /// Pixel format (default: yuv420p, required by most players).
    pub pixel_format: String,
    /// Encoder preset (default: medium).
    pub preset: String,
    /// Output frame rate (default: 2).
    pub framerate: u32,
    /// Audio encoder (default: aac).
    pub audio_codec: String,
    /// Audio bitrate (default: 192k).
    pub audio_bitrate: String,
    /// Move the moov atom to the front for progressive playback (default: true).
    pub faststart: bool,
}

impl Default for StillVideoSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            profile: "high".to_string(),
            pixel_format: "yuv420p".to_string(),
            preset: "medium".to_string(),
            framerate: 2,
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            faststart: true,
        }
    }
}

/// Build the ffmpeg argument list for a still-image encode.
pub fn still_video_args(
    image: &Path,
    audio: &Path,
    output: &Path,
    settings: &StillVideoSettings,
) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        // Image input, repeated for the whole audio duration
        "-loop".to_string(),
        "1".to_string(),
        "-framerate".to_string(),
        settings.framerate.to_string(),
        "-i".to_string(),
        image.to_string_lossy().to_string(),
        "-i".to_string(),
        audio.to_string_lossy().to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
    ];

    // libx264 with yuv420p rejects odd dimensions
    args.extend([
        "-vf".to_string(),
        "scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string(),
    ]);

    args.extend([
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-preset".to_string(),
        settings.preset.clone(),
        "-profile:v".to_string(),
        settings.profile.clone(),
        "-pix_fmt".to_string(),
        settings.pixel_format.clone(),
    ]);

    if settings.video_codec == "libx264" {
        args.extend(["-tune".to_string(), "stillimage".to_string()]);
    }

    args.extend([
        "-c:a".to_string(),
        settings.audio_codec.clone(),
        "-b:a".to_string(),
        settings.audio_bitrate.clone(),
        "-shortest".to_string(),
    ]);

    if settings.faststart {
        args.extend(["-movflags".to_string(), "+faststart".to_string()]);
    }

    args.extend(["-y".to_string(), output.to_string_lossy().to_string()]);

    args
}

/// Run ffmpeg to combine `image` and `audio` into `output`.
///
/// # Errors
///
/// Returns [`Error::FileNotFound`] if an input is missing, [`Error::Io`] if
/// the process cannot be spawned, and [`Error::ToolFailed`] carrying the
/// encoder's stderr if it exits unsuccessfully.
pub async fn encode_still_video(
    ffmpeg: &Path,
    image: &Path,
    audio: &Path,
    output: &Path,
    settings: &StillVideoSettings,
) -> Result<()> {
    for input in [image, audio] {
        if !input.exists() {
            return Err(Error::file_not_found(input));
        }
    }

    let args = still_video_args(image, audio, output, settings);

    #[cfg(feature = "tracing")]
    tracing::debug!("FFmpeg args: {:?}", args);

    let output_result = Command::new(ffmpeg)
        .args(&args)
        .kill_on_drop(true)
        .output()
        .await?;

    if !output_result.status.success() {
        let stderr = String::from_utf8_lossy(&output_result.stderr);
        let message = match stderr.trim() {
            "" => format!("exited with {}", output_result.status),
            diagnostic => format!("exited with {}: {}", output_result.status, diagnostic),
        };
        return Err(Error::tool_failed("ffmpeg", message));
    }

    Ok(())
}
