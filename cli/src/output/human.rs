//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::services::deploy::{DeployOutcome, DestroyOutcome, StackStatus, Synthesized};
use crate::application::services::invoke::Invocation;
use crate::domain::resources::{Mount, Resource};
use crate::domain::{Checkpoint, StackConfig, StackGraph};
use crate::infra::config::CONFIG_PATH_ENV;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn render_version(&self, version: &str) {
        println!("lambda-efs {version}");
    }

    /// Render the declared resources, their wiring and reached checkpoints.
    pub fn render_graph(&self, graph: &StackGraph) {
        println!();
        println!(
            "  {}",
            format!("{} ({})", graph.name, graph.variant).style(self.ctx.styles.header)
        );
        println!();
        for resource in graph.resources() {
            println!(
                "  {:<14} {}",
                resource.kind().label().style(self.ctx.styles.kind),
                resource.id()
            );
            println!(
                "  {:<14} {}",
                "",
                resource_detail(resource).style(self.ctx.styles.dim)
            );
        }
        println!();
        let reached: Vec<&str> = graph
            .checkpoints()
            .iter()
            .copied()
            .map(Checkpoint::label)
            .collect();
        self.ctx.kv("Checkpoints:", &reached.join(" → "));
        println!();
    }

    pub fn render_synth(&self, synthesized: &Synthesized) {
        let resources = synthesized.template.resources.len();
        match &synthesized.path {
            Some(path) => self.ctx.success(&format!(
                "{} ({}): {resources} resources written to {}",
                synthesized.graph.name,
                synthesized.graph.variant,
                path.display()
            )),
            None => self.ctx.success(&format!(
                "{} ({}): {resources} resources",
                synthesized.graph.name, synthesized.graph.variant
            )),
        }
    }

    /// Render the current configuration.
    pub fn render_config(&self, config: &StackConfig, path: &std::path::Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        for (key, value) in config.entries() {
            let value = value.unwrap_or_else(|| "(not set)".to_string());
            println!("  {:<22} {value}", format!("{key}:"));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in [CONFIG_PATH_ENV, "AWS_PROFILE", "NO_COLOR"] {
            println!(
                "    {:<20} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }

    pub fn render_status(&self, status: &StackStatus) {
        match status {
            StackStatus::NotFound { stack } => {
                self.ctx.warn(&format!("Stack {stack} is not deployed"));
                self.ctx.info("Run: lambda-efs deploy");
            }
            StackStatus::Present {
                stack,
                status,
                outputs,
            } => {
                self.ctx.kv("Stack:", stack);
                self.ctx.kv("Status:", status);
                if !outputs.is_empty() {
                    println!();
                    self.ctx.header("Outputs:");
                    for (key, value) in outputs {
                        self.ctx.kv(&format!("{key}:"), value);
                    }
                }
            }
        }
    }

    pub fn render_deploy(&self, outcome: &DeployOutcome) {
        if let DeployOutcome::Deployed { .. } = outcome {
            self.ctx.info("Run: lambda-efs invoke");
        }
    }

    pub fn render_destroy(&self, _outcome: &DestroyOutcome) {}

    pub fn render_invocation(&self, invocation: &Invocation) {
        if self.ctx.quiet {
            println!("{}", invocation.result);
            return;
        }
        self.ctx.kv("Function:", &invocation.function);
        self.ctx.kv("Result:", &invocation.result);
    }
}

/// One-line summary of what a resource is wired to.
#[must_use]
pub fn resource_detail(resource: &Resource) -> String {
    match resource {
        Resource::Network(n) => format!("{} across {} zones", n.cidr, n.max_azs),
        Resource::Storage(s) => format!(
            "\"{}\" in {}, removal {}",
            s.name,
            s.network,
            s.removal_policy.as_template_policy().to_lowercase()
        ),
        Resource::AccessPoint(ap) => format!(
            "{} on {} as {} ({})",
            ap.root_path, ap.storage, ap.posix_user, ap.permissions
        ),
        Resource::Compute(c) => match &c.mount {
            Mount::None => format!("{} {}, no mount", c.runtime.as_str(), c.entry_point),
            Mount::Bound { access_point, path } => format!(
                "{} {}, mounts {} at {path}",
                c.runtime.as_str(),
                c.entry_point,
                access_point.id
            ),
        },
    }
}
