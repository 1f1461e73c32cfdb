use crate::config::AudioPlatformConfig;
use crate::error::PublishError;
use crate::http::{build_client, file_part};
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::{rejection, PublishTarget, Release};

#[derive(Debug, Deserialize)]
struct TrackResponse {
    permalink_url: String,
}

/// Uploads the original audio and cover art to an audio platform.
pub struct AudioPlatformClient {
    client: Client,
    name: String,
    api_url: String,
    access_token: String,
}

impl AudioPlatformClient {
    pub fn new(config: &AudioPlatformConfig, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            name: config.name.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }
}

async fn read_part(path: &Path, stem: &str) -> Result<reqwest::multipart::Part, PublishError> {
    file_part(path, stem)
        .await
        .map_err(|source| PublishError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl PublishTarget for AudioPlatformClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, release: &Release<'_>) -> Result<String, PublishError> {
        let form = Form::new()
            .text("title", release.title.to_string())
            .text("description", release.description.to_string())
            .text("tags", release.tags.join(", "))
            .part("asset_data", read_part(release.audio, "audio").await?)
            .part("artwork_data", read_part(release.image, "artwork").await?);

        let response = self
            .client
            .post(format!("{}/tracks", self.api_url))
            .header("Authorization", format!("OAuth {}", self.access_token))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body = response.text().await?;
        let track: TrackResponse = serde_json::from_str(&body)
            .map_err(|e| PublishError::InvalidResponse(format!("{}: {}", e, body)))?;

        tracing::info!("Uploaded track to {}: {}", self.name, track.permalink_url);
        Ok(track.permalink_url)
    }
}
