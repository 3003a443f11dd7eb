//! End-to-end provisioning.

use std::time::Duration;

use ztpflow_core::orchestrator::{DeviceOrchestrator, WaitPolicy};
use ztpflow_core::render::ConfigRenderer;

use crate::cli::{GlobalOpts, ProvisionArgs};
use crate::error::CliError;
use crate::session::Context;

use super::load_topology;

pub async fn handle(
    ctx: &Context,
    args: ProvisionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let topology = load_topology(&args.topology, &ctx.template_dir, global)?;
    let renderer = ConfigRenderer::new(&ctx.template_dir);

    let orchestrator = DeviceOrchestrator::new(&ctx.session).with_wait_policy(WaitPolicy {
        max_wait: Duration::from_secs(args.wait_timeout),
        ..WaitPolicy::default()
    });

    let report = orchestrator
        .provision_from_topology(&topology, &renderer)
        .await?;

    let summary = report.summary_text();
    if !global.quiet {
        println!("{summary}");
    }
    if let Some(ref path) = args.report {
        std::fs::write(path, &summary)?;
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed: report.failed(),
            total: report.devices.len(),
        })
    }
}
