pub mod feed;

pub use feed::FeedClient;

use crate::config::Config;
use crate::request::Requester;

/// Announces finished uploads on the feed channel.
pub struct NotificationManager {
    feed: Option<FeedClient>,
}

impl NotificationManager {
    pub fn new(config: &Config) -> Self {
        Self {
            feed: config.feed.webhook_url.as_deref().map(FeedClient::new),
        }
    }

    /// Announce a published song.
    /// This method is fire-and-forget - errors are logged but not propagated.
    /// Returns whether the announcement was delivered.
    pub async fn notify_published(
        &self,
        requester: &Requester,
        title: &str,
        video_url: &str,
        audio_url: &str,
    ) -> bool {
        let Some(feed) = &self.feed else {
            tracing::debug!("No feed webhook configured, skipping notification");
            return false;
        };

        let content = published_message(requester, title, video_url, audio_url);
        match feed.post(&content).await {
            Ok(()) => {
                tracing::info!("Feed notified about '{}'", title);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to notify feed about '{}': {}", title, e);
                false
            }
        }
    }

    /// Check if a feed webhook is configured
    pub fn has_targets(&self) -> bool {
        self.feed.is_some()
    }
}

fn published_message(requester: &Requester, title: &str, video_url: &str, audio_url: &str) -> String {
    format!(
        "{} published \"{}\"\nVideo: {}\nAudio: {}",
        requester, title, video_url, audio_url
    )
}
