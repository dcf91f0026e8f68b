//! `lambda-efs destroy`: delete the deployed stack.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::deploy::destroy_stack;

/// Run the destroy command.
///
/// Prompts before deleting unless running non-interactively.
///
/// # Errors
///
/// Returns an error if the prompt or any deletion step fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    let stack = &config.stack.name;

    if !app.non_interactive {
        if !app.output.quiet {
            println!();
            println!("This will delete stack {stack}, including the filesystem and its data.");
            println!();
        }
        if !app.confirm("Continue?", false)? {
            app.output.info("Cancelled.");
            return Ok(());
        }
    }

    let provisioner = app.provisioner(&config);
    let outcome = destroy_stack(&provisioner, &app.reporter(), stack).await?;
    app.renderer().render_destroy(&outcome)
}
