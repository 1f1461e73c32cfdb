//! Submission of finished releases to the originating site.

mod signature;

pub use signature::{generate_secret, sign_submission, verify_signature, SignedFields};

use crate::config::SiteConfig;
use crate::error::SubmissionError;
use crate::http::{build_client, bytes_part};
use reqwest::multipart::Form;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Header carrying the Unix timestamp included in the signature.
pub const TIMESTAMP_HEADER: &str = "X-Trackforge-Timestamp";
/// Header carrying the `sha256=<hex>` signature.
pub const SIGNATURE_HEADER: &str = "X-Trackforge-Signature";

/// What the site records for one release.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    pub title: &'a str,
    pub video_url: &'a str,
    pub audio_url: &'a str,
    /// Raw tag string as the requester typed it.
    pub tags: Option<&'a str>,
    pub audio: &'a Path,
    pub image: &'a Path,
}

/// Signed multipart client for the site's ingestion endpoint.
pub struct SiteClient {
    client: Client,
    url: String,
    secret: String,
}

impl SiteClient {
    pub fn new(config: &SiteConfig, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            url: config.url.clone(),
            secret: config.secret.clone(),
        }
    }

    /// Upload the release with both source files.
    pub async fn submit(&self, submission: &Submission<'_>) -> Result<(), SubmissionError> {
        let audio = read(submission.audio).await?;
        let image = read(submission.image).await?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_submission(
            &self.secret,
            &SignedFields {
                timestamp: &timestamp,
                title: submission.title,
                video_url: submission.video_url,
                audio_url: submission.audio_url,
                tags: submission.tags.unwrap_or_default(),
                audio: &audio,
                image: &image,
            },
        )?;

        let mut form = Form::new()
            .text("title", submission.title.to_string())
            .text("video_url", submission.video_url.to_string())
            .text("audio_url", submission.audio_url.to_string())
            .part("audio", bytes_part(audio, submission.audio, "audio")?)
            .part("image", bytes_part(image, submission.image, "image")?);
        if let Some(tags) = submission.tags {
            form = form.text("tags", tags.to_string());
        }

        let response = self
            .client
            .post(&self.url)
            .header(TIMESTAMP_HEADER, &timestamp)
            .header(SIGNATURE_HEADER, signature)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Rejected { status, body });
        }

        tracing::info!("Submitted '{}' to site", submission.title);
        Ok(())
    }
}

async fn read(path: &Path) -> Result<Vec<u8>, SubmissionError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| SubmissionError::Read {
            path: path.to_path_buf(),
            source,
        })
}
