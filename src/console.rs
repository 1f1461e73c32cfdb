//! Chat surface that prompts on stdout and reads answers from stdin.

use async_trait::async_trait;
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::broadcast;
use trackforge::confirm::{ChatSurface, ConfirmationPrompt, Interaction, PromptHandle};
use trackforge::request::Requester;

/// Tokens of the prompt currently on screen.
#[derive(Debug, Clone)]
struct OpenPrompt {
    id: String,
    confirm: String,
    decline: String,
}

#[derive(Default)]
pub struct ConsoleSurface {
    open: Mutex<Option<OpenPrompt>>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a typed answer to the token it stands for.
    ///
    /// `y`/`yes` and `n`/`no` are shortcuts; anything else is passed through
    /// so the full token works too.
    fn token_for(&self, answer: &str) -> String {
        let open = self.open.lock().ok().and_then(|guard| guard.clone());
        match (answer.to_lowercase().as_str(), open) {
            ("y" | "yes", Some(prompt)) => prompt.confirm,
            ("n" | "no", Some(prompt)) => prompt.decline,
            _ => answer.to_string(),
        }
    }

    /// Forward stdin lines as interactions from `user_id` on a dedicated
    /// thread.
    ///
    /// Stdin reads cannot be cancelled, so they stay off the runtime; the
    /// thread is detached and ends with the process.
    pub fn spawn_answer_reader(
        self: &Arc<Self>,
        user_id: String,
        events: broadcast::Sender<Interaction>,
    ) -> std::io::Result<thread::JoinHandle<()>> {
        self.spawn_reader(std::io::BufReader::new(std::io::stdin()), user_id, events)
    }

    fn spawn_reader<R>(
        self: &Arc<Self>,
        input: R,
        user_id: String,
        events: broadcast::Sender<Interaction>,
    ) -> std::io::Result<thread::JoinHandle<()>>
    where
        R: BufRead + Send + 'static,
    {
        let surface = Arc::clone(self);
        thread::Builder::new()
            .name("console-answers".to_string())
            .spawn(move || {
                if let Err(e) = surface.forward_answers(input, &user_id, &events) {
                    tracing::warn!("Failed to read from stdin: {}", e);
                }
            })
    }

    /// Forward non-empty lines until EOF, returning how many were sent.
    fn forward_answers<R: BufRead>(
        &self,
        input: R,
        user_id: &str,
        events: &broadcast::Sender<Interaction>,
    ) -> std::io::Result<usize> {
        let mut sent = 0;
        for line in input.lines() {
            let line = line?;
            let answer = line.trim();
            if answer.is_empty() {
                continue;
            }
            let interaction = Interaction {
                user_id: user_id.to_string(),
                token: self.token_for(answer),
            };
            if events.send(interaction).is_err() {
                tracing::debug!("No run is waiting for an answer");
            } else {
                sent += 1;
            }
        }
        Ok(sent)
    }
}

#[async_trait]
impl ChatSurface for ConsoleSurface {
    async fn send_prompt(&self, prompt: &ConfirmationPrompt) -> anyhow::Result<PromptHandle> {
        let id = uuid::Uuid::new_v4().to_string();
        if let Ok(mut open) = self.open.lock() {
            *open = Some(OpenPrompt {
                id: id.clone(),
                confirm: prompt.confirm_token.clone(),
                decline: prompt.decline_token.clone(),
            });
        }

        println!("{}", prompt.render());
        println!("(y = confirm, n = decline)");
        Ok(PromptHandle { id })
    }

    async fn retract_prompt(&self, handle: &PromptHandle) -> anyhow::Result<()> {
        if let Ok(mut open) = self.open.lock() {
            if open.as_ref().is_some_and(|p| p.id == handle.id) {
                *open = None;
            }
        }
        println!("Confirmation closed.");
        Ok(())
    }

    async fn report(&self, requester: &Requester, message: &str) -> anyhow::Result<()> {
        println!("@{}: {}", requester, message);
        Ok(())
    }
}
