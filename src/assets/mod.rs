//! Content-addressed scratch storage for a pipeline run.
//!
//! Every file a run downloads or produces lives under the scratch directory
//! with a name derived from the SHA-256 of its source URL, so repeated
//! references to one remote file land on the same path. An [`AssetScope`]
//! tracks what a run acquired and releases all of it exactly once.

use crate::error::{Error, Result};
use crate::http::build_client;
use crate::request::SourceFile;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// What a temporary file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Audio,
    Image,
    Video,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Audio => "audio",
            AssetKind::Image => "image",
            AssetKind::Video => "video",
        };
        f.write_str(name)
    }
}

/// A file written to scratch storage on behalf of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryAsset {
    pub kind: AssetKind,
    pub source_url: String,
    pub local_path: PathBuf,
    /// Hex SHA-256 of `source_url`.
    pub content_hash: String,
}

/// Outcome of releasing a run's assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files that were deleted.
    pub removed: Vec<PathBuf>,
    /// Tracked paths that did not exist (never written, or already gone).
    pub missing: Vec<PathBuf>,
    /// Files that could not be deleted, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    /// Number of paths deletion was attempted for.
    pub fn attempted(&self) -> usize {
        self.removed.len() + self.missing.len() + self.failed.len()
    }
}

/// Hex SHA-256 of a source identifier.
pub fn content_hash(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

/// Fetches remote files into the scratch directory.
#[derive(Clone)]
pub struct AssetStore {
    client: Client,
    dir: PathBuf,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            dir: dir.into(),
        }
    }

    /// Ensure the scratch directory exists.
    pub async fn prepare(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Deterministic scratch path for a source identifier and extension.
    pub fn local_path(&self, source: &str, extension: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            content_hash(source),
            extension.trim_start_matches('.').to_lowercase()
        ))
    }

    /// Start tracking assets for a new run.
    pub fn scope(&self) -> AssetScope {
        AssetScope {
            store: self.clone(),
            paths: Vec::new(),
            released: false,
        }
    }

    /// Download `source` fully, then write it atomically to its scratch path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] on transport failure or a non-success
    /// status. Nothing is written in that case.
    pub async fn store(&self, kind: AssetKind, source: &SourceFile) -> Result<TemporaryAsset> {
        let url = source.url();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::download(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::download(url, format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::download(url, e))?;

        let local_path = self.local_path(url, source.extension());
        let dir = self.dir.clone();
        let target = local_path.clone();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut staged = tempfile::NamedTempFile::new_in(&dir)?;
            staged.write_all(&bytes)?;
            staged.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)?
        .map_err(|e| Error::download(url, format!("failed to write {:?}: {}", local_path, e)))?;

        tracing::debug!("Stored {} from {} at {:?}", kind, url, local_path);

        Ok(TemporaryAsset {
            kind,
            source_url: url.to_string(),
            content_hash: content_hash(url),
            local_path,
        })
    }

    /// Delete every path, collecting failures instead of raising them.
    pub async fn release_all(&self, paths: &[PathBuf]) -> CleanupReport {
        let mut report = CleanupReport::default();

        for path in paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => report.removed.push(path.clone()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    report.missing.push(path.clone())
                }
                Err(e) => {
                    tracing::warn!("Failed to remove temporary file {:?}: {}", path, e);
                    report.failed.push((path.clone(), e.to_string()));
                }
            }
        }

        report
    }
}

/// Assets acquired by one run.
///
/// Consumed by [`AssetScope::release_all`]. A scope dropped without being
/// released (panic, cancelled future) deletes its files synchronously.
pub struct AssetScope {
    store: AssetStore,
    paths: Vec<PathBuf>,
    released: bool,
}

impl AssetScope {
    /// Download a source file and track it for release.
    pub async fn acquire(&mut self, kind: AssetKind, source: &SourceFile) -> Result<TemporaryAsset> {
        let asset = self.store.store(kind, source).await?;
        self.track(asset.local_path.clone());
        Ok(asset)
    }

    /// Reserve a tracked path for an artifact the run is about to produce.
    ///
    /// The path is tracked before the producer runs so partial output is
    /// released too.
    pub fn reserve(&mut self, kind: AssetKind, key: &str, extension: &str) -> TemporaryAsset {
        let local_path = self.store.local_path(key, extension);
        self.track(local_path.clone());
        TemporaryAsset {
            kind,
            source_url: key.to_string(),
            content_hash: content_hash(key),
            local_path,
        }
    }

    fn track(&mut self, path: PathBuf) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Paths currently tracked, in acquisition order.
    pub fn tracked(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Release everything this scope acquired.
    pub async fn release_all(mut self) -> CleanupReport {
        self.released = true;
        let paths = std::mem::take(&mut self.paths);
        self.store.release_all(&paths).await
    }
}

impl Drop for AssetScope {
    fn drop(&mut self) {
        if self.released || self.paths.is_empty() {
            return;
        }

        tracing::warn!(
            "Asset scope dropped without release, removing {} file(s)",
            self.paths.len()
        );
        for path in &self.paths {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove temporary file {:?}: {}", path, e);
                }
            }
        }
    }
}
