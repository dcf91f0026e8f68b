//! Command implementations

pub mod config;
pub mod deploy;
pub mod destroy;
pub mod graph;
pub mod invoke;
pub mod status;
pub mod synth;
pub mod version;

use std::path::PathBuf;

use clap::Args;

use crate::domain::{ComposeSettings, StackConfig, StackVariant};

/// Default directory for synthesized and packaged templates.
pub const DEFAULT_OUT_DIR: &str = "target/stack";

/// Arguments shared by commands that compose the stack.
#[derive(Args)]
pub struct ComposeArgs {
    /// Stack variant (mounted, compute-only); overrides stack.variant
    #[arg(long)]
    pub variant: Option<StackVariant>,
}

/// Arguments shared by commands that write templates.
#[derive(Args)]
pub struct OutArgs {
    /// Directory for generated templates
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    pub out: PathBuf,
}

/// Composition settings from `config`, with the `--variant` override applied.
#[must_use]
pub fn compose_settings(config: &StackConfig, args: &ComposeArgs) -> ComposeSettings {
    let mut settings = config.compose_settings();
    if let Some(variant) = args.variant {
        settings.variant = variant;
    }
    settings
}
