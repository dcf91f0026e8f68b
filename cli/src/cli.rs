//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Compose and deploy a function stack with a mounted network filesystem
#[derive(Parser)]
#[command(
    name = "lambda-efs",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub no_color: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compose the stack and write its template
    Synth(commands::synth::SynthArgs),

    /// Show the composed resources and their wiring
    Graph(commands::ComposeArgs),

    /// Package the code bundle and deploy the stack
    Deploy(commands::deploy::DeployArgs),

    /// Delete the deployed stack
    Destroy,

    /// Show stack status and outputs
    Status,

    /// Invoke the deployed function once
    Invoke,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color: self.no_color,
                quiet: self.quiet,
                json: self.json,
            },
            behaviour: BehaviourFlags { yes: self.yes },
        });

        match self.command {
            Command::Synth(args) => commands::synth::run(&app, &args),
            Command::Graph(args) => commands::graph::run(&app, &args),
            Command::Deploy(args) => commands::deploy::run(&app, &args).await,
            Command::Destroy => commands::destroy::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Invoke => commands::invoke::run(&app).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
