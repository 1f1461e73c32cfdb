//! Inbound upload requests and their validation.
//!
//! An [`IncomingRequest`] is whatever the chat layer handed us. It becomes an
//! [`UploadRequest`] only after [`UploadRequest::validate`] succeeds, and is
//! read-only from then on.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Accepted audio file extensions.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// Accepted cover image file extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg"];

/// Identity of the user who started a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requester {
    /// Stable platform identifier, used to filter confirmation events.
    pub id: String,
    /// Name shown in prompts and feed messages.
    pub display_name: String,
}

impl Requester {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// A file attached to the request by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub filename: String,
}

impl Attachment {
    pub fn new(url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: filename.into(),
        }
    }
}

/// Raw request as received from the chat layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingRequest {
    pub requester: Requester,
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated tags
    #[serde(default)]
    pub tags: Option<String>,
    pub audio: Option<Attachment>,
    pub image: Option<Attachment>,
}

/// A validated remote source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    url: String,
    filename: String,
    extension: String,
}

impl SourceFile {
    fn validate(
        attachment: Attachment,
        kind: &'static str,
        allowed: &'static [&'static str],
    ) -> Result<Self, ValidationError> {
        let extension = Path::new(&attachment.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .filter(|ext| allowed.contains(&ext.as_str()))
            .ok_or_else(|| ValidationError::UnsupportedExtension {
                kind,
                filename: attachment.filename.clone(),
                allowed,
            })?;

        if attachment.url.trim().is_empty() {
            return Err(ValidationError::MissingField(kind));
        }

        Ok(Self {
            url: attachment.url,
            filename: attachment.filename,
            extension,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Lowercased extension without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    requester: Requester,
    title: String,
    description: String,
    tags: Vec<String>,
    raw_tags: Option<String>,
    audio: SourceFile,
    image: SourceFile,
}

impl UploadRequest {
    /// Check required fields and attachment types.
    ///
    /// Performs no I/O, so a rejected request leaves nothing to clean up.
    pub fn validate(incoming: IncomingRequest) -> Result<Self, ValidationError> {
        let title = incoming
            .title
            .ok_or(ValidationError::MissingField("title"))?
            .trim()
            .to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let audio = incoming
            .audio
            .ok_or(ValidationError::MissingField("audio"))?;
        let image = incoming
            .image
            .ok_or(ValidationError::MissingField("image"))?;

        let audio = SourceFile::validate(audio, "audio", AUDIO_EXTENSIONS)?;
        let image = SourceFile::validate(image, "image", IMAGE_EXTENSIONS)?;

        let raw_tags = incoming.tags.filter(|t| !t.trim().is_empty());
        let tags = raw_tags.as_deref().map(parse_tags).unwrap_or_default();

        Ok(Self {
            requester: incoming.requester,
            title,
            description: incoming.description.unwrap_or_default(),
            tags,
            raw_tags,
            audio,
            image,
        })
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tag field exactly as the requester typed it.
    pub fn raw_tags(&self) -> Option<&str> {
        self.raw_tags.as_deref()
    }

    pub fn audio(&self) -> &SourceFile {
        &self.audio
    }

    pub fn image(&self) -> &SourceFile {
        &self.image
    }
}

/// Split a comma-separated tag field, trimming entries and dropping empty ones.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
