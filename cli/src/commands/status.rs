//! `lambda-efs status`: show the deployed stack's status and outputs.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::deploy::stack_status;

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the stack cannot be described.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    let provisioner = app.provisioner(&config);
    let status = stack_status(&provisioner, &config.stack.name).await?;
    app.renderer().render_status(&status)
}
