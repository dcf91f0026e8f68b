//! Custom-runtime entry point for the lambda-efs function.
//!
//! Initialises tracing, loads configuration from the environment, and serves
//! invocations against the mounted filesystem until the runtime API goes
//! away.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use lambda_efs_handler::config::HandlerConfig;
use lambda_efs_handler::handler;
use lambda_efs_handler::runtime::{self, RuntimeClient};

fn main() -> Result<()> {
    // Function logs are shipped line by line; JSON keeps fields queryable.
    tracing_subscriber::fmt()
        .json()
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match HandlerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            // Without the runtime API address there is nobody to report to.
            if let Ok(api) = std::env::var("AWS_LAMBDA_RUNTIME_API") {
                runtime::report_init_failure(&api, &e);
            }
            return Err(e);
        }
    };

    tracing::info!(
        mount_path = %config.efs_mount_path.display(),
        "lambda-efs handler starting",
    );

    let client = RuntimeClient::new(&config.aws_lambda_runtime_api);
    let mount = config.efs_mount_path;
    runtime::run(&client, |invocation| {
        handler::handle(&mount, &invocation.event)
    })
}
