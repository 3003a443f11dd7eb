//! Argument definitions for the `ztpflow` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "ztpflow",
    version,
    about = "Zero-touch provisioning for Catalyst Center PnP",
    long_about = "Renders device configurations from a declarative topology, reconciles the \
                  site hierarchy, and claims plug-and-play devices on a Catalyst Center \
                  controller."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand. Flags beat environment variables
/// beat the config file.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', global = true, env = "ZTP_PROFILE")]
    pub profile: Option<String>,

    /// Controller base URL (overrides the profile)
    #[arg(long, short = 'c', global = true, env = "ZTP_CONTROLLER")]
    pub controller: Option<String>,

    /// Username for controller authentication
    #[arg(long, global = true, env = "ZTP_USERNAME")]
    pub username: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Directory holding Jinja templates (overrides the profile)
    #[arg(long, global = true)]
    pub template_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render, reconcile sites, and claim every device in a topology
    Provision(ProvisionArgs),

    /// Render device configurations locally, no controller required
    Render(RenderArgs),

    /// Validate a topology file offline
    Validate(ValidateArgs),

    /// Build a DHCP Option 43 discovery string
    Option43(Option43Args),

    /// List devices known to the PnP service
    Devices(DevicesArgs),

    /// Check controller prerequisites for a topology
    Preflight(PreflightArgs),

    /// Inspect or manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Topology YAML file
    pub topology: PathBuf,

    /// Write the deployment summary to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Seconds to wait on each claim task
    #[arg(long, default_value_t = 300)]
    pub wait_timeout: u64,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Topology YAML file
    pub topology: PathBuf,

    /// Directory to write rendered configs into
    #[arg(long, short = 'o')]
    pub out_dir: Option<PathBuf>,

    /// Print a per-device summary instead of writing files
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Topology YAML file
    pub topology: PathBuf,
}

#[derive(Debug, Args)]
pub struct Option43Args {
    /// Controller address (IPv4 or FQDN)
    pub address: String,

    /// Controller port
    #[arg(long, default_value_t = 80)]
    pub port: u16,

    /// Discovery transport
    #[arg(long, value_enum, default_value_t = ProtocolArg::Http)]
    pub protocol: ProtocolArg,

    /// NTP server to include
    #[arg(long)]
    pub ntp: Option<String>,

    /// Trusted certificate bundle URL to include
    #[arg(long)]
    pub cert_url: Option<String>,

    /// Treat the address as an FQDN rather than an IP literal
    #[arg(long)]
    pub fqdn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    Http,
    Https,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Filter by onboarding state (e.g. Unclaimed, Provisioned)
    #[arg(long)]
    pub state: Option<String>,

    /// Show only the device with this serial number
    #[arg(long)]
    pub serial: Option<String>,

    /// Output as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PreflightArgs {
    /// Topology YAML file
    pub topology: PathBuf,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config file with one example profile
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print the active configuration (passwords redacted)
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
