//! Publishing backends.
//!
//! Every backend implements [`PublishTarget`]. A target switched off in
//! configuration is a [`DisabledTarget`], which resolves to
//! [`PLACEHOLDER_URL`] so reporting always sees one URL per platform.

mod audio;
mod video;

pub use audio::AudioPlatformClient;
pub use video::VideoPlatformClient;

use crate::config::Config;
use crate::error::PublishError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// URL reported for a target that is not enabled.
pub const PLACEHOLDER_URL: &str = "https://example.invalid/unpublished";

/// Everything a target may need to publish one song.
#[derive(Debug, Clone, Copy)]
pub struct Release<'a> {
    pub title: &'a str,
    /// Description with the trailing tag line already appended.
    pub description: &'a str,
    pub tags: &'a [String],
    pub audio: &'a Path,
    pub image: &'a Path,
    /// Present only when transcoding ran.
    pub video: Option<&'a Path>,
}

/// A platform that accepts uploads.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    /// Name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Upload the release and return its public URL.
    async fn publish(&self, release: &Release<'_>) -> Result<String, PublishError>;
}

/// Stand-in for a target switched off in configuration.
pub struct DisabledTarget {
    name: String,
}

impl DisabledTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl PublishTarget for DisabledTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, _release: &Release<'_>) -> Result<String, PublishError> {
        Ok(PLACEHOLDER_URL.to_string())
    }
}

/// Resolved URL of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub target: String,
    pub url: String,
}

impl PublishResult {
    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_URL
    }
}

/// Create the video target described by `config`.
pub fn video_target(config: &Config) -> Arc<dyn PublishTarget> {
    if config.video.enabled {
        Arc::new(VideoPlatformClient::new(&config.video, config.http.timeout()))
    } else {
        Arc::new(DisabledTarget::new(config.video.name.clone()))
    }
}

/// Create the audio target described by `config`.
pub fn audio_target(config: &Config) -> Arc<dyn PublishTarget> {
    if config.audio.enabled {
        Arc::new(AudioPlatformClient::new(&config.audio, config.http.timeout()))
    } else {
        Arc::new(DisabledTarget::new(config.audio.name.clone()))
    }
}

/// Read an error response body for inclusion in a report.
async fn rejection(response: reqwest::Response) -> PublishError {
    let status = response.status().as_u16();
    let payload = response.text().await.unwrap_or_default();
    PublishError::Rejected { status, payload }
}
