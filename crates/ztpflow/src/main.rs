mod cli;
mod commands;
mod error;
mod session;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Offline commands never touch the controller.
        Command::Validate(args) => commands::validate::handle(args, &cli.global),
        Command::Render(args) => commands::render::handle(args, &cli.global),
        Command::Option43(args) => commands::option43::handle(&args, &cli.global),
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ztpflow", &mut std::io::stdout());
            Ok(())
        }

        // Everything else needs an authenticated session.
        Command::Devices(args) => {
            let ctx = session::build(&cli.global)?;
            commands::devices::handle(&ctx, args, &cli.global).await
        }
        Command::Preflight(args) => {
            let ctx = session::build(&cli.global)?;
            commands::preflight::handle(&ctx, args, &cli.global).await
        }
        Command::Provision(args) => {
            let ctx = session::build(&cli.global)?;
            commands::provision::handle(&ctx, args, &cli.global).await
        }
    }
}
