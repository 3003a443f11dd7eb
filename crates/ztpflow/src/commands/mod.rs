//! Command handlers: bridge CLI args to core operations and format output.

pub mod config_cmd;
pub mod devices;
pub mod option43;
pub mod preflight;
pub mod provision;
pub mod render;
pub mod validate;

use std::path::{Path, PathBuf};

use ztpflow_core::topology::Topology;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Template directory for offline commands: the flag wins, then the
/// config default, then `templates/` next to the topology file.
pub fn offline_template_dir(global: &GlobalOpts, topology_path: &Path) -> PathBuf {
    if let Some(ref dir) = global.template_dir {
        return dir.clone();
    }
    let cfg = ztpflow_config::load_config_or_default();
    if cfg.defaults.template_dir.is_absolute() || cfg.defaults.template_dir.exists() {
        return cfg.defaults.template_dir;
    }
    topology_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("templates")
}

/// Load a topology, printing every violation before failing.
pub fn load_topology(
    topology_path: &Path,
    template_dir: &Path,
    global: &GlobalOpts,
) -> Result<Topology, CliError> {
    match Topology::load(topology_path, template_dir) {
        Ok(topology) => Ok(topology),
        Err(ztpflow_core::CoreError::TopologyValidation { violations }) => {
            if !global.quiet {
                use owo_colors::OwoColorize;
                for violation in &violations {
                    eprintln!("  {} {violation}", "✗".red());
                }
            }
            Err(CliError::TopologyInvalid { violations })
        }
        Err(e) => Err(e.into()),
    }
}
