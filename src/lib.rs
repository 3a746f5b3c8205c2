//! GenStudio: client for an image generation studio server
//!
//! Runs batches of generation requests (sequentially or concurrently) against the
//! studio server, keeps the server-side settings document in sync with a debounced
//! auto-save, and pages through the generation history.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod settings;
pub mod studio;
