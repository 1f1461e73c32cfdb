//! # trackforge-av
//!
//! Encoder invocation and external tool discovery for trackforge.
//!
//! This crate provides functionality for:
//! - Combining a still cover image and an audio track into an MP4 upload
//! - Detecting the external tools (ffmpeg, ffprobe) the encoder relies on
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use trackforge_av::{encode_still_video, get_tool_path, StillVideoSettings};
//!
//! # async fn run() -> trackforge_av::Result<()> {
//! let ffmpeg = get_tool_path("ffmpeg", None)?;
//! encode_still_video(
//!     &ffmpeg,
//!     Path::new("cover.png"),
//!     Path::new("song.mp3"),
//!     Path::new("song.mp4"),
//!     &StillVideoSettings::default(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod encode;
mod error;
pub mod tools;

// Re-exports
pub use encode::{encode_still_video, still_video_args, StillVideoSettings};
pub use error::{Error, Result};
pub use tools::{check_tools, get_tool_path, ToolInfo};
