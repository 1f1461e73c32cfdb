//! Interactive confirmation before a run acquires anything.
//!
//! The requester is shown a [`ConfirmationPrompt`] carrying two action
//! tokens. [`ConfirmationGate`] then waits on the shared interaction stream
//! for the first matching token from that requester, or for the timeout.

mod gate;
mod session;
mod surface;

pub use gate::ConfirmationGate;
pub use session::{ConfirmationSession, Decision, SessionState};
pub use surface::{ChatSurface, ConfirmationPrompt, Interaction, PromptHandle};
