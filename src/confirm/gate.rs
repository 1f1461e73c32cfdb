use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use super::{ChatSurface, ConfirmationPrompt, ConfirmationSession, Decision, Interaction};

/// Waits for the requester to accept or decline a prompt.
pub struct ConfirmationGate {
    surface: Arc<dyn ChatSurface>,
    session: ConfirmationSession,
}

impl ConfirmationGate {
    pub fn new(surface: Arc<dyn ChatSurface>, session: ConfirmationSession) -> Self {
        Self { surface, session }
    }

    pub fn session(&self) -> &ConfirmationSession {
        &self.session
    }

    /// Show `prompt`, then resolve on the first matching interaction or on
    /// expiry, whichever comes first.
    ///
    /// `events` must be subscribed before this is called so an immediate
    /// answer cannot be missed. The prompt is retracted and the subscription
    /// dropped before returning; later interactions are never observed.
    ///
    /// # Errors
    ///
    /// Fails only if the prompt cannot be shown. Retraction failures are
    /// logged and do not affect the decision.
    pub async fn await_confirmation(
        &mut self,
        prompt: &ConfirmationPrompt,
        mut events: broadcast::Receiver<Interaction>,
    ) -> anyhow::Result<Decision> {
        let handle = self.surface.send_prompt(prompt).await?;

        let deadline = tokio::time::sleep(self.session.expires_in());
        tokio::pin!(deadline);

        let decision = loop {
            tokio::select! {
                _ = &mut deadline => break Decision::TimedOut,
                received = events.recv() => match received {
                    Ok(interaction) => match self.session.classify(&interaction) {
                        Some(decision) => break decision,
                        None => tracing::debug!(
                            "Ignoring interaction from {} on prompt {}",
                            interaction.user_id,
                            handle.id
                        ),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Confirmation listener lagged, skipped {} events", skipped);
                    }
                    // Nothing can confirm any more
                    Err(RecvError::Closed) => break Decision::TimedOut,
                },
            }
        };
        drop(events);

        self.session.resolve(decision);
        tracing::info!("Confirmation prompt {} resolved: {:?}", handle.id, decision);

        if let Err(e) = self.surface.retract_prompt(&handle).await {
            tracing::warn!("Failed to retract confirmation prompt {}: {}", handle.id, e);
        }

        Ok(decision)
    }
}
