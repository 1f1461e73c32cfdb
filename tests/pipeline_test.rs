//! End-to-end pipeline runs against mocked platforms.

mod common;

use assert_matches::assert_matches;
use common::{Answer, FakeTranscoder, TestHarness, AUDIO_PATH, IMAGE_PATH, SITE_SECRET};
use trackforge::error::ValidationError;
use trackforge::pipeline::SubmissionStatus;
use trackforge::publish::PLACEHOLDER_URL;
use trackforge::site::{verify_signature, SignedFields, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use trackforge::Error;
use wiremock::ResponseTemplate;

#[tokio::test]
async fn test_confirmed_request_is_published_everywhere() {
    let harness = TestHarness::new(Answer::Confirm).await;
    harness.mount_happy_path().await;

    let report = harness.handle(harness.request()).await;

    let outcome = report.result.expect("run should complete");
    assert_eq!(outcome.video.url, "https://video.example.com/watch?v=vid123");
    assert_eq!(outcome.audio.url, "https://audio.example.com/alice/test-song");
    assert!(outcome.feed_notified);
    assert_eq!(outcome.submission, SubmissionStatus::Submitted);
    assert_eq!(harness.transcoder.calls(), 1);

    // Audio, image and the encoded video were all released
    assert_eq!(report.cleanup.removed.len(), 3);
    assert!(report.cleanup.failed.is_empty());
    assert!(!outcome.video_path.unwrap().exists());
    assert!(harness.scratch_files().is_empty());

    // Both targets got the tag line appended to the description
    let tracks = harness.requests_to("/tracks").await;
    assert_eq!(tracks.len(), 1);
    assert!(String::from_utf8_lossy(&tracks[0].body).contains("First single\n\nTags: a, b"));
    assert_eq!(harness.requests_to("/videos").await.len(), 1);

    let feed = harness.requests_to("/feed").await;
    assert_eq!(feed.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&feed[0].body).unwrap();
    let content = body["content"].as_str().unwrap();
    assert!(content.contains("Test Song"));
    assert!(content.contains("https://video.example.com/watch?v=vid123"));

    let ingest = harness.requests_to("/ingest").await;
    assert_eq!(ingest.len(), 1);
    let submitted = String::from_utf8_lossy(&ingest[0].body);
    assert!(submitted.contains("name=\"tags\""));
    assert!(submitted.contains("a, b"));

    let timestamp = ingest[0].headers.get(TIMESTAMP_HEADER).unwrap().to_str().unwrap();
    let signature = ingest[0].headers.get(SIGNATURE_HEADER).unwrap().to_str().unwrap();
    assert!(verify_signature(
        SITE_SECRET,
        &SignedFields {
            timestamp,
            title: "Test Song",
            video_url: "https://video.example.com/watch?v=vid123",
            audio_url: "https://audio.example.com/alice/test-song",
            tags: "a, b",
            audio: b"ID3 audio",
            image: b"PNG image",
        },
        signature,
    ));

    assert_eq!(harness.surface.prompt_count(), 1);
    assert_eq!(harness.surface.retract_count(), 1);
    let reports = harness.surface.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("Published \"Test Song\""));
}

#[tokio::test]
async fn test_unanswered_prompt_times_out() {
    let harness = TestHarness::new(Answer::Ignore).await;
    harness.mount_happy_path().await;

    let report = harness.handle(harness.request()).await;

    assert_matches!(report.result, Err(Error::TimedOut));
    assert_eq!(harness.surface.retract_count(), 1);
    assert_eq!(report.cleanup.attempted(), 0);
    assert_eq!(harness.request_count().await, 0);
    assert_eq!(harness.transcoder.calls(), 0);
    assert!(harness.surface.reports()[0].contains("timed out"));
}

#[tokio::test]
async fn test_declined_request_does_nothing() {
    let harness = TestHarness::new(Answer::Decline).await;
    harness.mount_happy_path().await;

    let report = harness.handle(harness.request()).await;

    assert_matches!(report.result, Err(Error::Declined));
    assert_eq!(harness.surface.retract_count(), 1);
    assert_eq!(report.cleanup.attempted(), 0);
    assert_eq!(harness.request_count().await, 0);
}

#[tokio::test]
async fn test_invalid_request_is_rejected_before_prompting() {
    let harness = TestHarness::new(Answer::Confirm).await;
    harness.mount_happy_path().await;

    let mut request = harness.request();
    request.title = Some("   ".to_string());
    let report = harness.handle(request).await;

    assert_matches!(
        report.result,
        Err(Error::Validation(ValidationError::EmptyTitle))
    );
    assert_eq!(harness.surface.prompt_count(), 0);
    assert_eq!(harness.request_count().await, 0);
    assert!(harness.surface.reports()[0].starts_with("Upload rejected"));

    let mut request = harness.request();
    request.audio = Some(trackforge::request::Attachment::new(
        format!("{}/files/song.flac", harness.server.uri()),
        "song.flac",
    ));
    let report = harness.handle(request).await;
    assert_matches!(
        report.result,
        Err(Error::Validation(ValidationError::UnsupportedExtension { kind: "audio", .. }))
    );
}

#[tokio::test]
async fn test_audio_download_failure_cleans_nothing() {
    let harness = TestHarness::new(Answer::Confirm).await;
    harness.mount_happy_path().await;
    harness
        .override_response("GET", AUDIO_PATH, ResponseTemplate::new(404))
        .await;

    let report = harness.handle(harness.request()).await;

    assert_matches!(report.result, Err(Error::Download { ref url, .. }) if url.ends_with(AUDIO_PATH));
    assert_eq!(report.cleanup.attempted(), 0);
    assert!(harness.requests_to(IMAGE_PATH).await.is_empty());
    assert!(harness.requests_to("/videos").await.is_empty());
    assert_eq!(harness.transcoder.calls(), 0);
    assert!(harness.surface.reports()[0].starts_with("Upload failed"));
}

#[tokio::test]
async fn test_image_download_failure_releases_audio() {
    let harness = TestHarness::new(Answer::Confirm).await;
    harness.mount_happy_path().await;
    harness
        .override_response("GET", IMAGE_PATH, ResponseTemplate::new(500))
        .await;

    let report = harness.handle(harness.request()).await;

    assert_matches!(report.result, Err(Error::Download { .. }));
    assert_eq!(report.cleanup.removed.len(), 1);
    assert!(harness.scratch_files().is_empty());
}

#[tokio::test]
async fn test_transcode_failure_releases_sources() {
    let harness = TestHarness::with_transcoder(Answer::Confirm, FakeTranscoder::failing()).await;
    harness.mount_happy_path().await;

    let report = harness.handle(harness.request()).await;

    assert_matches!(report.result, Err(Error::Transcode { ref message }) if message.contains("Invalid data"));
    // Audio and image deleted; the reserved video path was never written
    assert_eq!(report.cleanup.removed.len(), 2);
    assert_eq!(report.cleanup.missing.len(), 1);
    assert!(harness.scratch_files().is_empty());
    assert!(harness.requests_to("/videos").await.is_empty());
    assert!(harness.requests_to("/tracks").await.is_empty());
}

#[tokio::test]
async fn test_disabled_video_target_skips_encoding() {
    let mut harness = TestHarness::new(Answer::Confirm).await;
    harness.config.video.enabled = false;
    harness.mount_happy_path().await;

    let report = harness.handle(harness.request()).await;

    let outcome = report.result.expect("run should complete");
    assert_eq!(harness.transcoder.calls(), 0);
    assert!(outcome.video.is_placeholder());
    assert_eq!(outcome.video.url, PLACEHOLDER_URL);
    assert_eq!(outcome.audio.url, "https://audio.example.com/alice/test-song");
    assert!(outcome.video_path.is_none());
    assert!(harness.requests_to("/videos").await.is_empty());
    assert_eq!(report.cleanup.removed.len(), 2);
    assert_eq!(harness.requests_to("/ingest").await.len(), 1);
}

#[tokio::test]
async fn test_publish_failure_reports_already_published_urls() {
    let harness = TestHarness::new(Answer::Confirm).await;
    harness.mount_happy_path().await;
    harness
        .override_response(
            "POST",
            "/tracks",
            ResponseTemplate::new(422).set_body_string("duplicate track"),
        )
        .await;

    let report = harness.handle(harness.request()).await;

    match report.result {
        Err(Error::Publish {
            target,
            message,
            published,
        }) => {
            assert_eq!(target, "audio");
            assert!(message.contains("duplicate track"));
            assert_eq!(published, vec!["https://video.example.com/watch?v=vid123".to_string()]);
        }
        other => panic!("expected publish failure, got {:?}", other),
    }

    assert!(harness.requests_to("/feed").await.is_empty());
    assert!(harness.requests_to("/ingest").await.is_empty());
    assert_eq!(report.cleanup.removed.len(), 3);
    assert!(harness.surface.reports()[0].contains("Already published"));
}

#[tokio::test]
async fn test_video_publish_failure_aborts_run() {
    let harness = TestHarness::new(Answer::Confirm).await;
    harness.mount_happy_path().await;
    harness
        .override_response("POST", "/videos", ResponseTemplate::new(500).set_body_string("boom"))
        .await;

    let report = harness.handle(harness.request()).await;

    match report.result {
        Err(Error::Publish {
            target,
            message,
            published,
        }) => {
            assert_eq!(target, "video");
            assert!(message.contains("boom"));
            assert_eq!(published, vec!["https://audio.example.com/alice/test-song".to_string()]);
        }
        other => panic!("expected publish failure, got {:?}", other),
    }

    // Audio was still attempted since both targets run together
    assert_eq!(harness.requests_to("/tracks").await.len(), 1);
    assert!(harness.requests_to("/feed").await.is_empty());
    assert!(harness.requests_to("/ingest").await.is_empty());
    assert_eq!(report.cleanup.removed.len(), 3);
    assert!(harness.scratch_files().is_empty());
}

#[tokio::test]
async fn test_feed_and_site_failures_do_not_fail_the_run() {
    let harness = TestHarness::new(Answer::Confirm).await;
    harness.mount_happy_path().await;
    harness
        .override_response("POST", "/feed", ResponseTemplate::new(500))
        .await;
    harness
        .override_response(
            "POST",
            "/ingest",
            ResponseTemplate::new(401).set_body_string("bad signature"),
        )
        .await;

    let report = harness.handle(harness.request()).await;

    let outcome = report.result.expect("run should complete");
    assert!(!outcome.feed_notified);
    assert_matches!(outcome.submission, SubmissionStatus::Failed(ref reason) if reason.contains("bad signature"));
    assert_eq!(report.cleanup.removed.len(), 3);
    assert!(harness.surface.reports()[0].contains("Site submission failed"));
}

#[tokio::test]
async fn test_missing_site_skips_submission() {
    let mut harness = TestHarness::new(Answer::Confirm).await;
    harness.config.site = None;
    harness.mount_happy_path().await;

    let report = harness.handle(harness.request()).await;

    let outcome = report.result.expect("run should complete");
    assert_eq!(outcome.submission, SubmissionStatus::Skipped);
    assert!(harness.requests_to("/ingest").await.is_empty());
}
