//! Shared HTTP client construction.

use reqwest::multipart::Part;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Build a client with the given timeout, falling back to defaults.
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("trackforge/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client with timeout: {}", e);
            Client::new()
        })
}

/// MIME type for the file extensions the pipeline handles.
pub fn mime_for(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Read a file into a multipart part named `<stem>.<original extension>`.
pub async fn file_part(path: &Path, stem: &str) -> std::io::Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    bytes_part(bytes, path, stem).map_err(std::io::Error::other)
}

/// Wrap already-read file contents in a part named after `path`'s extension.
pub fn bytes_part(bytes: Vec<u8>, path: &Path, stem: &str) -> reqwest::Result<Part> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    Part::bytes(bytes)
        .file_name(format!("{}.{}", stem, extension))
        .mime_str(mime_for(&extension))
}
