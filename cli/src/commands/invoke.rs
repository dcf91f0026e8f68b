//! `lambda-efs invoke`: call the deployed function once and print its result.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::invoke::invoke_function;

/// Run the invoke command.
///
/// # Errors
///
/// Returns an error if the function cannot be resolved or reports a failure.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    let provisioner = app.provisioner(&config);
    let invocation = invoke_function(&provisioner, &provisioner, &config.stack.name).await?;
    app.renderer().render_invocation(&invocation)
}
