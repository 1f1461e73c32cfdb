//! Trackforge - song publishing pipeline
//!
//! This library crate exposes the core functionality for integration testing.

pub mod assets;
pub mod config;
pub mod confirm;
pub mod error;
pub mod format;
pub mod http;
pub mod notifications;
pub mod pipeline;
pub mod publish;
pub mod request;
pub mod site;
pub mod transcode;

pub use error::{Error, Result};
