use crate::assets::{AssetKind, AssetScope, AssetStore, CleanupReport};
use crate::config::Config;
use crate::confirm::{ChatSurface, ConfirmationGate, ConfirmationPrompt, ConfirmationSession, Decision, Interaction};
use crate::error::{Error, PublishError, Result};
use crate::format::{description_with_tags, format_duration};
use crate::notifications::NotificationManager;
use crate::publish::{self, PublishResult, PublishTarget, Release};
use crate::request::{IncomingRequest, UploadRequest};
use crate::site::{SiteClient, Submission};
use crate::transcode::{FfmpegTranscoder, Transcoder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use super::PipelineStage;

/// How the final site submission went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Submitted,
    /// No site is configured.
    Skipped,
    Failed(String),
}

/// Result of a run that got through publishing.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub title: String,
    pub video: PublishResult,
    pub audio: PublishResult,
    /// Encoded artifact; `None` when the video target is disabled. Already
    /// deleted by the time the run returns.
    pub video_path: Option<PathBuf>,
    pub feed_notified: bool,
    pub submission: SubmissionStatus,
}

/// Everything observable about a finished run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub result: Result<PipelineOutcome>,
    pub cleanup: CleanupReport,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Sequences confirmation, download, encoding, publishing and submission
/// for one request at a time. Runs share nothing but the scratch directory,
/// so one `Pipeline` can serve concurrent requests.
pub struct Pipeline {
    config: Arc<Config>,
    surface: Arc<dyn ChatSurface>,
    interactions: broadcast::Sender<Interaction>,
    assets: AssetStore,
    transcoder: Arc<dyn Transcoder>,
    video: Arc<dyn PublishTarget>,
    audio: Arc<dyn PublishTarget>,
    notifications: NotificationManager,
    site: Option<SiteClient>,
}

impl Pipeline {
    pub fn from_config(
        config: Arc<Config>,
        surface: Arc<dyn ChatSurface>,
        interactions: broadcast::Sender<Interaction>,
    ) -> Self {
        let timeout = config.http.timeout();
        let notifications = NotificationManager::new(&config);
        if !notifications.has_targets() {
            tracing::info!("No feed webhook configured, releases will not be announced");
        }
        if config.site.is_none() {
            tracing::info!("No site configured, releases will not be submitted");
        }

        Self {
            assets: AssetStore::new(config.scratch.dir.clone(), timeout),
            transcoder: Arc::new(FfmpegTranscoder::from_config(&config.encoder)),
            video: publish::video_target(&config),
            audio: publish::audio_target(&config),
            notifications,
            site: config.site.as_ref().map(|site| SiteClient::new(site, timeout)),
            config,
            surface,
            interactions,
        }
    }

    pub fn with_transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    pub fn with_targets(mut self, video: Arc<dyn PublishTarget>, audio: Arc<dyn PublishTarget>) -> Self {
        self.video = video;
        self.audio = audio;
        self
    }

    /// Run one request to completion.
    ///
    /// Never fails: the outcome, including any error, is in the returned
    /// report and has already been reported to the requester.
    pub async fn handle(&self, incoming: IncomingRequest) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", run_id = %run_id);

        async move {
            let started = Instant::now();
            let requester = incoming.requester.clone();
            let mut scope = self.assets.scope();

            let result = self.run(incoming, &mut scope).await;
            if let Err(e) = &result {
                tracing::warn!("Run failed: {}", e);
            }

            enter(PipelineStage::Cleanup);
            let cleanup = scope.release_all().await;
            tracing::info!(
                "Released {} file(s), {} already gone, {} failed",
                cleanup.removed.len(),
                cleanup.missing.len(),
                cleanup.failed.len()
            );
            tracing::info!("Run finished in {}", format_duration(started.elapsed()));

            let message = summary(&result);
            if let Err(e) = self.surface.report(&requester, &message).await {
                tracing::warn!("Failed to report outcome to {}: {}", requester, e);
            }

            RunReport {
                run_id,
                result,
                cleanup,
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, incoming: IncomingRequest, scope: &mut AssetScope) -> Result<PipelineOutcome> {
        enter(PipelineStage::Validating);
        let request = UploadRequest::validate(incoming)?;

        enter(PipelineStage::AwaitingConfirmation);
        self.confirm(&request).await?;

        enter(PipelineStage::Downloading);
        self.assets.prepare().await?;
        let audio = scope.acquire(AssetKind::Audio, request.audio()).await?;
        let image = scope.acquire(AssetKind::Image, request.image()).await?;

        let video_path = if self.config.video.enabled {
            enter(PipelineStage::Transcoding);
            let key = format!("{}\n{}", audio.source_url, image.source_url);
            let video = scope.reserve(AssetKind::Video, &key, "mp4");
            self.transcoder
                .combine(&image.local_path, &audio.local_path, &video.local_path)
                .await?;
            Some(video.local_path)
        } else {
            tracing::info!("Video target disabled, skipping transcoding");
            None
        };

        enter(PipelineStage::Publishing);
        let description = description_with_tags(request.description(), request.tags());
        let release = Release {
            title: request.title(),
            description: &description,
            tags: request.tags(),
            audio: &audio.local_path,
            image: &image.local_path,
            video: video_path.as_deref(),
        };
        let (video_result, audio_result) =
            tokio::join!(self.video.publish(&release), self.audio.publish(&release));
        let (video, audio_result) = self.settle(video_result, audio_result)?;

        enter(PipelineStage::Submitting);
        let feed_notified = self
            .notifications
            .notify_published(request.requester(), request.title(), &video.url, &audio_result.url)
            .await;

        let submission = match &self.site {
            Some(site) => {
                let submission = Submission {
                    title: request.title(),
                    video_url: &video.url,
                    audio_url: &audio_result.url,
                    tags: request.raw_tags(),
                    audio: &audio.local_path,
                    image: &image.local_path,
                };
                match site.submit(&submission).await {
                    Ok(()) => SubmissionStatus::Submitted,
                    Err(e) => {
                        tracing::warn!("Site submission failed: {}", e);
                        SubmissionStatus::Failed(e.to_string())
                    }
                }
            }
            None => {
                tracing::warn!("No site configured, skipping submission");
                SubmissionStatus::Skipped
            }
        };

        Ok(PipelineOutcome {
            title: request.title().to_string(),
            video,
            audio: audio_result,
            video_path,
            feed_notified,
            submission,
        })
    }

    async fn confirm(&self, request: &UploadRequest) -> Result<()> {
        let session = ConfirmationSession::new(request.requester(), self.config.confirmation.timeout());
        let prompt = ConfirmationPrompt::new(request, &session);

        // Subscribe before the prompt is visible so an instant answer is seen
        let events = self.interactions.subscribe();
        let mut gate = ConfirmationGate::new(Arc::clone(&self.surface), session);

        let decision = gate
            .await_confirmation(&prompt, events)
            .await
            .map_err(|e| Error::Surface {
                message: format!("{:#}", e),
            })?;

        match decision {
            Decision::Confirmed => Ok(()),
            Decision::Declined => Err(Error::Declined),
            Decision::TimedOut => Err(Error::TimedOut),
        }
    }

    /// Check both publish results, video first.
    fn settle(
        &self,
        video: std::result::Result<String, PublishError>,
        audio: std::result::Result<String, PublishError>,
    ) -> Result<(PublishResult, PublishResult)> {
        let video_name = self.video.name().to_string();
        let audio_name = self.audio.name().to_string();

        match (video, audio) {
            (Ok(video_url), Ok(audio_url)) => {
                tracing::info!("Published to {}: {}", video_name, video_url);
                tracing::info!("Published to {}: {}", audio_name, audio_url);
                Ok((
                    PublishResult {
                        target: video_name,
                        url: video_url,
                    },
                    PublishResult {
                        target: audio_name,
                        url: audio_url,
                    },
                ))
            }
            (Err(e), audio) => Err(publish_failure(
                video_name,
                e,
                audio.ok().map(|url| (audio_name, url)),
            )),
            (Ok(video_url), Err(e)) => Err(publish_failure(audio_name, e, Some((video_name, video_url)))),
        }
    }
}

fn enter(stage: PipelineStage) {
    tracing::info!("Entering stage: {}", stage);
}

fn publish_failure(target: String, err: PublishError, other: Option<(String, String)>) -> Error {
    let published = other
        .filter(|(_, url)| url != publish::PLACEHOLDER_URL)
        .map(|(name, url)| {
            tracing::warn!("{} already published {} before {} failed", name, url, target);
            url
        })
        .into_iter()
        .collect();

    Error::Publish {
        target,
        message: err.to_string(),
        published,
    }
}

/// User-facing message for a finished run.
fn summary(result: &Result<PipelineOutcome>) -> String {
    match result {
        Ok(outcome) => {
            let mut message = format!(
                "Published \"{}\"\n{}: {}\n{}: {}",
                outcome.title, outcome.video.target, outcome.video.url, outcome.audio.target, outcome.audio.url
            );
            if let SubmissionStatus::Failed(reason) = &outcome.submission {
                message.push_str(&format!("\nSite submission failed: {}", reason));
            }
            message
        }
        Err(Error::Validation(e)) => format!("Upload rejected: {}", e),
        Err(Error::Declined) => "Upload cancelled.".to_string(),
        Err(Error::TimedOut) => "Upload cancelled: confirmation timed out.".to_string(),
        Err(e) => {
            let mut message = format!("Upload failed: {}", e);
            if let Error::Publish { published, .. } = e {
                if !published.is_empty() {
                    message.push_str(&format!("\nAlready published: {}", published.join(", ")));
                }
            }
            message
        }
    }
}
