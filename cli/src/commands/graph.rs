//! `lambda-efs graph`: show the composed resources without synthesizing.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::{compose::compose, config_service};
use crate::commands::{ComposeArgs, compose_settings};

/// Run the graph command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or composition
/// fails.
pub fn run(app: &AppContext, args: &ComposeArgs) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    let graph = compose(&compose_settings(&config, args))?;
    app.renderer().render_graph(&graph)
}
