//! Discovery of the external binaries the encoder shells out to.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Binaries `check-tools` reports on. Both print their version with `-version`.
const ENCODER_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Availability of one external binary.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of the `-version` banner.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

fn probe_tool(name: &str) -> ToolInfo {
    let version = Command::new(name)
        .arg("-version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| {
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

    ToolInfo {
        name: name.to_string(),
        available: version.is_some(),
        path: version.as_ref().and_then(|_| which::which(name).ok()),
        version,
    }
}

/// Report on every binary the encoder relies on.
pub fn check_tools() -> Vec<ToolInfo> {
    ENCODER_TOOLS.iter().map(|name| probe_tool(name)).collect()
}

/// Resolve `name`, preferring an explicitly configured path over `PATH`.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] if the configured path does not exist and
/// `name` is not on `PATH` either.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => return Ok(path.to_path_buf()),
        #[cfg(feature = "tracing")]
        Some(path) => tracing::warn!(
            "Configured {} path {:?} does not exist, falling back to PATH",
            name,
            path
        ),
        _ => {}
    }

    which::which(name).map_err(|_| Error::tool_not_found(name))
}
