//! `lambda-efs deploy`: package the code bundle and deploy the stack.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::deploy::{DeployOptions, deploy_stack};
use crate::commands::{ComposeArgs, OutArgs, compose_settings};

/// Arguments for the deploy command.
#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub compose: ComposeArgs,

    #[command(flatten)]
    pub out: OutArgs,

    /// Bucket for packaged artifacts; overrides deploy.asset_bucket
    #[arg(long)]
    pub asset_bucket: Option<String>,
}

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if the stack cannot be composed, packaged or deployed.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    let settings = compose_settings(&config, &args.compose);
    let provisioner = app.provisioner(&config);
    let reporter = app.reporter();

    let outcome = deploy_stack(
        &provisioner,
        &app.local_fs,
        &app.local_fs,
        DeployOptions {
            reporter: &reporter,
            settings: &settings,
            asset_bucket: args
                .asset_bucket
                .as_deref()
                .or(config.deploy.asset_bucket.as_deref()),
            out_dir: &args.out.out,
        },
    )
    .await?;
    app.renderer().render_deploy(&outcome)
}
