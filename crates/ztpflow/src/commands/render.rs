//! Offline configuration rendering.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use ztpflow_core::render::ConfigRenderer;

use crate::cli::{GlobalOpts, RenderArgs};
use crate::error::CliError;

use super::{load_topology, offline_template_dir};

#[derive(Tabled)]
struct RenderRow {
    #[tabled(rename = "DEVICE")]
    device: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "SIZE")]
    size: String,
}

pub fn handle(args: RenderArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let template_dir = offline_template_dir(global, &args.topology);
    let topology = load_topology(&args.topology, &template_dir, global)?;

    let renderer = ConfigRenderer::new(&template_dir);
    let outcome = renderer.render_all(&topology);

    if args.summary {
        let mut rows: Vec<RenderRow> = outcome
            .configs
            .iter()
            .map(|(name, config)| RenderRow {
                device: name.clone(),
                status: "rendered".into(),
                size: format!("{} B", config.len()),
            })
            .collect();
        rows.extend(outcome.errors.iter().map(|(name, err)| RenderRow {
            device: name.clone(),
            status: err.to_string(),
            size: "-".into(),
        }));
        println!("{}", Table::new(rows).with(Style::sharp()));
    } else {
        let out_dir = args.out_dir.unwrap_or_else(|| {
            ztpflow_config::load_config_or_default().defaults.output_dir
        });
        let written = renderer.write_all(&outcome, &out_dir)?;
        if !global.quiet {
            for path in &written {
                println!("{} {}", "wrote".green(), path.display());
            }
        }
        for (name, err) in &outcome.errors {
            eprintln!("{} {name}: {err}", "✗".red());
        }
    }

    if outcome.errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed: outcome.errors.len(),
            total: topology.devices.len(),
        })
    }
}
