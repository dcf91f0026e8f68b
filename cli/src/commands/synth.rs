//! `lambda-efs synth`: compose the stack and write its template.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::{config_service, deploy::synth_stack};
use crate::commands::{ComposeArgs, OutArgs, compose_settings};

/// Arguments for the synth command.
#[derive(Args)]
pub struct SynthArgs {
    #[command(flatten)]
    pub compose: ComposeArgs,

    #[command(flatten)]
    pub out: OutArgs,

    /// Print the template to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Run the synth command.
///
/// # Errors
///
/// Returns an error if composition fails or the template cannot be written.
pub fn run(app: &AppContext, args: &SynthArgs) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    let settings = compose_settings(&config, &args.compose);

    if args.stdout {
        let synthesized = synth_stack(&app.local_fs, &app.local_fs, &settings, None)?;
        print!("{}", synthesized.rendered);
        return Ok(());
    }

    let synthesized = synth_stack(&app.local_fs, &app.local_fs, &settings, Some(&args.out.out))?;
    app.renderer().render_synth(&synthesized)
}
