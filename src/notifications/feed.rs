use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::http::build_client;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct FeedMessage<'a> {
    content: &'a str,
}

/// Posts plain-text messages to a feed channel webhook.
pub struct FeedClient {
    client: Client,
    webhook_url: String,
}

impl FeedClient {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: build_client(CONNECTION_TIMEOUT),
            webhook_url: webhook_url.into(),
        }
    }

    /// Post a single message.
    pub async fn post(&self, content: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&FeedMessage { content })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Feed webhook failed ({}): {}", status, body);
        }

        Ok(())
    }
}
