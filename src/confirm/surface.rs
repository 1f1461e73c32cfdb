use crate::format::tag_list;
use crate::request::{Requester, UploadRequest};
use async_trait::async_trait;
use std::time::Duration;

use super::ConfirmationSession;

/// A user action on a rendered prompt (button press, reaction, reply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub user_id: String,
    pub token: String,
}

/// Reference to a prompt the chat layer is displaying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptHandle {
    pub id: String,
}

/// Metadata summary the requester is asked to confirm.
#[derive(Debug, Clone)]
pub struct ConfirmationPrompt {
    pub requester: Requester,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub audio_filename: String,
    pub image_filename: String,
    pub confirm_token: String,
    pub decline_token: String,
    pub expires_in: Duration,
}

impl ConfirmationPrompt {
    pub fn new(request: &UploadRequest, session: &ConfirmationSession) -> Self {
        Self {
            requester: request.requester().clone(),
            title: request.title().to_string(),
            description: request.description().to_string(),
            tags: request.tags().to_vec(),
            audio_filename: request.audio().filename().to_string(),
            image_filename: request.image().filename().to_string(),
            confirm_token: session.confirm_token().to_string(),
            decline_token: session.decline_token().to_string(),
            expires_in: session.expires_in(),
        }
    }

    /// Plain-text rendering for surfaces without rich components.
    pub fn render(&self) -> String {
        let description = if self.description.is_empty() {
            "N/A"
        } else {
            self.description.as_str()
        };

        format!(
            "{requester}, please confirm this upload:\n\
             Title: {title}\n\
             Description: {description}\n\
             Tags: {tags}\n\
             Audio: {audio}\n\
             Cover: {image}\n\
             Reply {confirm} to publish or {decline} to cancel (expires in {secs}s).",
            requester = self.requester,
            title = self.title,
            description = description,
            tags = tag_list(&self.tags),
            audio = self.audio_filename,
            image = self.image_filename,
            confirm = self.confirm_token,
            decline = self.decline_token,
            secs = self.expires_in.as_secs(),
        )
    }
}

/// The chat platform a request came from.
///
/// Implementations own rendering and delivery; interactions arrive separately
/// on a broadcast stream shared by all runs.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Show the confirmation prompt to the requester.
    async fn send_prompt(&self, prompt: &ConfirmationPrompt) -> anyhow::Result<PromptHandle>;

    /// Remove a prompt so it can no longer be acted on.
    async fn retract_prompt(&self, handle: &PromptHandle) -> anyhow::Result<()>;

    /// Send a user-facing status message to the requester.
    async fn report(&self, requester: &Requester, message: &str) -> anyhow::Result<()>;
}
