//! Offline topology validation.

use owo_colors::OwoColorize;

use ztpflow_core::ConfigRenderer;

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::error::CliError;

use super::{load_topology, offline_template_dir};

pub fn handle(args: ValidateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let template_dir = offline_template_dir(global, &args.topology);
    let topology = load_topology(&args.topology, &template_dir, global)?;

    // Structural checks passed; parse every referenced template too.
    let renderer = ConfigRenderer::new(&template_dir);
    let mut violations = Vec::new();
    let mut checked = std::collections::HashSet::new();
    for device in topology.devices.values() {
        if !checked.insert(device.template_name.as_str()) {
            continue;
        }
        if let Err(e) = renderer.validate_syntax(&device.template_name) {
            violations.push(format!("template '{}': {e}", device.template_name));
        }
    }
    if !violations.is_empty() {
        if !global.quiet {
            for violation in &violations {
                eprintln!("  {} {violation}", "✗".red());
            }
        }
        return Err(CliError::TopologyInvalid { violations });
    }

    if !global.quiet {
        println!(
            "{} {} device(s), {} site(s), {} VLAN(s)",
            "✓".green(),
            topology.devices.len(),
            topology.sites.len(),
            topology.vlans.len()
        );
    }
    Ok(())
}
