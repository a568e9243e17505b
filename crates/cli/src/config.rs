//! Command line configuration.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use streaming::{CodecConfig, MessageCodec};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

/// Encode and inspect RPC message envelope frames.
#[derive(Debug, Parser)]
#[command(name = "rpc-envelope", version)]
pub struct CliConfig {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file with codec settings (id_policy, max_frame_len, max_metadata_len)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load the codec settings, falling back to defaults without `--config`.
    pub fn codec_config(&self) -> anyhow::Result<CodecConfig> {
        let Some(path) = &self.config else {
            return Ok(CodecConfig::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading codec config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing codec config {}", path.display()))?;
        Ok(config)
    }

    /// Install the stderr log subscriber. A second call is a no-op.
    pub fn init_tracing(&self) {
        let default_level = if self.verbose { "debug" } else { "info" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    pub fn run(self) -> anyhow::Result<()> {
        self.init_tracing();
        let codec_config = self.codec_config()?;
        debug!(?codec_config, "loaded codec config");

        let result = self.command.execute(&MessageCodec::new(codec_config))?;
        println!("{result}");
        Ok(())
    }
}
