//! Controller prerequisite checks.

use owo_colors::OwoColorize;

use ztpflow_core::orchestrator::DeviceOrchestrator;
use ztpflow_core::render::ConfigRenderer;

use crate::cli::{GlobalOpts, PreflightArgs};
use crate::error::CliError;
use crate::session::Context;

use super::load_topology;

pub async fn handle(
    ctx: &Context,
    args: PreflightArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let topology = load_topology(&args.topology, &ctx.template_dir, global)?;
    let renderer = ConfigRenderer::new(&ctx.template_dir);
    let orchestrator = DeviceOrchestrator::new(&ctx.session);

    let checks = orchestrator.validate_prerequisites(&topology, &renderer).await;

    let mut failed = 0;
    for (check, ok) in &checks {
        if *ok {
            println!("  {} {check}", "✓".green());
        } else {
            println!("  {} {check}", "✗".red());
            failed += 1;
        }
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed,
            total: checks.len(),
        })
    }
}
