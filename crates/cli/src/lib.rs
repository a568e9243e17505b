//! CLI tool for working with message envelope frames.
//!
//! Provides commands for:
//! - Building an envelope and writing it as a frame
//! - Decoding a frame and describing the envelope inside

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
