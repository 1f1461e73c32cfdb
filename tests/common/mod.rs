//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which points every remote collaborator of a
//! [`Pipeline`] at one wiremock server, keeps scratch storage in a temporary
//! directory, and swaps the chat surface and encoder for recording fakes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use trackforge::config::{
    AudioPlatformConfig, Config, ConfirmationConfig, FeedConfig, ScratchConfig, SiteConfig,
    VideoPlatformConfig,
};
use trackforge::confirm::{ChatSurface, ConfirmationPrompt, Interaction, PromptHandle};
use trackforge::pipeline::{Pipeline, RunReport};
use trackforge::request::{Attachment, IncomingRequest, Requester};
use trackforge::transcode::Transcoder;

pub const AUDIO_PATH: &str = "/files/song.mp3";
pub const IMAGE_PATH: &str = "/files/cover.png";
pub const SITE_SECRET: &str = "site-secret";

/// How the fake requester answers a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Confirm,
    Decline,
    Ignore,
}

/// Chat surface that records everything and answers prompts itself.
pub struct ScriptedSurface {
    answer: Answer,
    events: broadcast::Sender<Interaction>,
    pub prompts: Mutex<Vec<String>>,
    pub retracted: Mutex<Vec<String>>,
    pub reports: Mutex<Vec<String>>,
}

impl ScriptedSurface {
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn retract_count(&self) -> usize {
        self.retracted.lock().unwrap().len()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSurface for ScriptedSurface {
    async fn send_prompt(&self, prompt: &ConfirmationPrompt) -> anyhow::Result<PromptHandle> {
        self.prompts.lock().unwrap().push(prompt.render());

        let token = match self.answer {
            Answer::Confirm => Some(prompt.confirm_token.clone()),
            Answer::Decline => Some(prompt.decline_token.clone()),
            Answer::Ignore => None,
        };
        if let Some(token) = token {
            self.events
                .send(Interaction {
                    user_id: prompt.requester.id.clone(),
                    token,
                })
                .unwrap();
        }

        Ok(PromptHandle {
            id: format!("prompt-{}", self.prompt_count()),
        })
    }

    async fn retract_prompt(&self, handle: &PromptHandle) -> anyhow::Result<()> {
        self.retracted.lock().unwrap().push(handle.id.clone());
        Ok(())
    }

    async fn report(&self, _requester: &Requester, message: &str) -> anyhow::Result<()> {
        self.reports.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Encoder stand-in that writes a small file, or fails.
#[derive(Default)]
pub struct FakeTranscoder {
    pub fail: bool,
    calls: AtomicUsize,
}

impl FakeTranscoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn combine(&self, image: &Path, audio: &Path, output: &Path) -> trackforge_av::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(image.exists(), "image must be downloaded before encoding");
        assert!(audio.exists(), "audio must be downloaded before encoding");

        if self.fail {
            return Err(trackforge_av::Error::tool_failed(
                "ffmpeg",
                "exited with exit status: 1: Invalid data found when processing input",
            ));
        }
        tokio::fs::write(output, b"fake mp4").await?;
        Ok(())
    }
}

/// Test harness wrapping a fully-wired [`Pipeline`].
pub struct TestHarness {
    pub server: MockServer,
    pub scratch: TempDir,
    pub config: Config,
    pub surface: Arc<ScriptedSurface>,
    pub transcoder: Arc<FakeTranscoder>,
    events: broadcast::Sender<Interaction>,
}

impl TestHarness {
    /// Harness with both targets, the feed and the site enabled.
    pub async fn new(answer: Answer) -> Self {
        Self::with_transcoder(answer, FakeTranscoder::default()).await
    }

    pub async fn with_transcoder(answer: Answer, transcoder: FakeTranscoder) -> Self {
        let server = MockServer::start().await;
        let scratch = tempfile::tempdir().expect("failed to create scratch dir");
        let (events, _) = broadcast::channel(16);

        let config = Config {
            scratch: ScratchConfig {
                dir: scratch.path().join("scratch"),
            },
            confirmation: ConfirmationConfig { timeout_secs: 1 },
            video: VideoPlatformConfig {
                enabled: true,
                api_url: server.uri(),
                access_token: "video-token".to_string(),
                watch_url_template: "https://video.example.com/watch?v={id}".to_string(),
                ..Default::default()
            },
            audio: AudioPlatformConfig {
                enabled: true,
                api_url: server.uri(),
                access_token: "audio-token".to_string(),
                ..Default::default()
            },
            feed: FeedConfig {
                webhook_url: Some(format!("{}/feed", server.uri())),
            },
            site: Some(SiteConfig {
                url: format!("{}/ingest", server.uri()),
                secret: SITE_SECRET.to_string(),
            }),
            ..Default::default()
        };

        let surface = Arc::new(ScriptedSurface {
            answer,
            events: events.clone(),
            prompts: Mutex::default(),
            retracted: Mutex::default(),
            reports: Mutex::default(),
        });

        Self {
            server,
            scratch,
            config,
            surface,
            transcoder: Arc::new(transcoder),
            events,
        }
    }

    /// Build the pipeline from the current config.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::from_config(
            Arc::new(self.config.clone()),
            self.surface.clone(),
            self.events.clone(),
        )
        .with_transcoder(self.transcoder.clone())
    }

    pub async fn handle(&self, request: IncomingRequest) -> RunReport {
        self.pipeline().handle(request).await
    }

    /// The request most tests send: "Test Song", tags "a, b", mp3 + png.
    pub fn request(&self) -> IncomingRequest {
        IncomingRequest {
            requester: Requester::new("42", "alice"),
            title: Some("Test Song".to_string()),
            description: Some("First single".to_string()),
            tags: Some("a, b".to_string()),
            audio: Some(Attachment::new(
                format!("{}{}", self.server.uri(), AUDIO_PATH),
                "song.mp3",
            )),
            image: Some(Attachment::new(
                format!("{}{}", self.server.uri(), IMAGE_PATH),
                "cover.png",
            )),
        }
    }

    /// Mount successful responses for every endpoint the pipeline calls.
    pub async fn mount_happy_path(&self) {
        self.mount(
            Mock::given(method("GET")).and(path(AUDIO_PATH)),
            ResponseTemplate::new(200).set_body_bytes(b"ID3 audio".to_vec()),
        )
        .await;
        self.mount(
            Mock::given(method("GET")).and(path(IMAGE_PATH)),
            ResponseTemplate::new(200).set_body_bytes(b"PNG image".to_vec()),
        )
        .await;
        self.mount(
            Mock::given(method("POST")).and(path("/videos")),
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": "vid123", "status": "uploaded"})),
        )
        .await;
        self.mount(
            Mock::given(method("POST")).and(path("/tracks")),
            ResponseTemplate::new(201).set_body_json(
                serde_json::json!({"permalink_url": "https://audio.example.com/alice/test-song"}),
            ),
        )
        .await;
        self.mount(Mock::given(method("POST")).and(path("/feed")), ResponseTemplate::new(204))
            .await;
        self.mount(Mock::given(method("POST")).and(path("/ingest")), ResponseTemplate::new(200))
            .await;
    }

    /// Mount a response that takes precedence over the happy path.
    pub async fn override_response(
        &self,
        http_method: &str,
        request_path: &str,
        response: ResponseTemplate,
    ) {
        Mock::given(method(http_method))
            .and(path(request_path))
            .respond_with(response)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    async fn mount(&self, mock: wiremock::MockBuilder, response: ResponseTemplate) {
        mock.respond_with(response).mount(&self.server).await;
    }

    /// Requests the server received on `request_path`.
    pub async fn requests_to(&self, request_path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .collect()
    }

    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }

    /// Files left in scratch storage.
    pub fn scratch_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.config.scratch.dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
