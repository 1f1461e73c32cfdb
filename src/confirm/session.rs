use crate::request::Requester;
use std::time::Duration;
use uuid::Uuid;

use super::Interaction;

/// How a confirmation gate resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Declined,
    TimedOut,
}

/// Lifecycle of a confirmation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Confirmed,
    Declined,
    Expired,
}

impl From<Decision> for SessionState {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Confirmed => SessionState::Confirmed,
            Decision::Declined => SessionState::Declined,
            Decision::TimedOut => SessionState::Expired,
        }
    }
}

/// Correlation state for one confirmation prompt.
#[derive(Debug, Clone)]
pub struct ConfirmationSession {
    confirm_token: String,
    decline_token: String,
    expires_in: Duration,
    requester_id: String,
    state: SessionState,
}

impl ConfirmationSession {
    /// Create a pending session with fresh, distinct tokens.
    pub fn new(requester: &Requester, expires_in: Duration) -> Self {
        Self {
            confirm_token: format!("confirm-{}", Uuid::new_v4().simple()),
            decline_token: format!("decline-{}", Uuid::new_v4().simple()),
            expires_in,
            requester_id: requester.id.clone(),
            state: SessionState::Pending,
        }
    }

    pub fn confirm_token(&self) -> &str {
        &self.confirm_token
    }

    pub fn decline_token(&self) -> &str {
        &self.decline_token
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Map an interaction to a decision.
    ///
    /// Returns `None` for other users, unknown tokens, or once the session
    /// has left `Pending`.
    pub fn classify(&self, interaction: &Interaction) -> Option<Decision> {
        if self.state != SessionState::Pending || interaction.user_id != self.requester_id {
            return None;
        }

        if interaction.token == self.confirm_token {
            Some(Decision::Confirmed)
        } else if interaction.token == self.decline_token {
            Some(Decision::Declined)
        } else {
            None
        }
    }

    /// Move out of `Pending`. Returns false if the session already resolved.
    pub fn resolve(&mut self, decision: Decision) -> bool {
        if self.state != SessionState::Pending {
            return false;
        }
        self.state = decision.into();
        true
    }
}
