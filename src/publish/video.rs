use crate::config::VideoPlatformConfig;
use crate::error::PublishError;
use crate::http::{build_client, file_part};
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{rejection, PublishTarget, Release};

/// Status the platform reports for a completed upload.
const UPLOADED: &str = "uploaded";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
    status: String,
}

/// Uploads the transcoded video to a video platform.
pub struct VideoPlatformClient {
    client: Client,
    name: String,
    api_url: String,
    access_token: String,
    watch_url_template: String,
    privacy: String,
}

impl VideoPlatformClient {
    pub fn new(config: &VideoPlatformConfig, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            name: config.name.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            watch_url_template: config.watch_url_template.clone(),
            privacy: config.privacy.clone(),
        }
    }

    /// Public watch URL for an uploaded video id.
    pub fn watch_url(&self, id: &str) -> String {
        self.watch_url_template.replace("{id}", id)
    }
}

#[async_trait]
impl PublishTarget for VideoPlatformClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, release: &Release<'_>) -> Result<String, PublishError> {
        let video = release.video.ok_or(PublishError::MissingArtifact("video"))?;

        let file = file_part(video, "video")
            .await
            .map_err(|source| PublishError::Read {
                path: video.to_path_buf(),
                source,
            })?;

        let form = Form::new()
            .text("title", release.title.to_string())
            .text("description", release.description.to_string())
            .text("tags", release.tags.join(", "))
            .text("privacy", self.privacy.clone())
            .part("file", file);

        let response = self
            .client
            .post(format!("{}/videos", self.api_url))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let status = response.status().as_u16();
        let body = response.text().await?;
        let upload: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| PublishError::InvalidResponse(format!("{}: {}", e, body)))?;

        if upload.status != UPLOADED {
            return Err(PublishError::Rejected {
                status,
                payload: body,
            });
        }

        let url = self.watch_url(&upload.id);
        tracing::info!("Uploaded video to {}: {}", self.name, url);
        Ok(url)
    }
}
