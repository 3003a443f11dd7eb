//! Config inspection.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, _global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = ztpflow_config::config_path();
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists (use --force to overwrite)", path.display()),
                });
            }

            let mut cfg = ztpflow_config::Config::default();
            cfg.profiles.insert(
                "default".into(),
                ztpflow_config::Profile {
                    controller: "https://10.10.20.85".into(),
                    username: Some("admin".into()),
                    password: None,
                    password_env: Some("ZTP_PASSWORD".into()),
                    ca_cert: None,
                    insecure: None,
                    timeout: None,
                    template_dir: None,
                    output_dir: None,
                },
            );
            ztpflow_config::save_config(&cfg)?;
            println!("wrote {}", path.display());
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", ztpflow_config::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = ztpflow_config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some("<redacted>".into());
                }
            }
            let rendered = toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            })?;
            print!("{rendered}");
            Ok(())
        }
    }
}
