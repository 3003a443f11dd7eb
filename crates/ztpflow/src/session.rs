//! Session construction from config file, environment, and flags.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use ztpflow_api::{ControllerSession, Credentials, TlsMode, TransportConfig};
use ztpflow_config as config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a controller-bound command needs.
pub struct Context {
    pub session: ControllerSession,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Build a session. A named profile is used when one matches;
/// otherwise `--controller` plus environment credentials suffice.
/// CLI flags always win over profile values.
pub fn build(global: &GlobalOpts) -> Result<Context, CliError> {
    let cfg = config::load_config_or_default();

    if let Ok((name, profile)) = cfg.profile(global.profile.as_deref()) {
        tracing::debug!(profile = name, "using config profile");
        return from_profile(&cfg, name, profile, global);
    }
    if let Some(ref profile) = global.profile {
        // An explicitly named profile that doesn't exist is an error,
        // not a fall-through.
        return Err(CliError::ProfileNotFound {
            name: profile.clone(),
            path: config::config_path().display().to_string(),
        });
    }

    from_flags(&cfg, global)
}

fn from_profile(
    cfg: &config::Config,
    name: &str,
    profile: &config::Profile,
    global: &GlobalOpts,
) -> Result<Context, CliError> {
    let (mut url, mut credentials, mut transport) =
        config::profile_to_session(profile, name, &cfg.defaults)?;

    if let Some(ref controller) = global.controller {
        url = controller.parse().map_err(|_| CliError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {controller}"),
        })?;
    }
    if let Some(ref username) = global.username {
        credentials.username.clone_from(username);
    }
    if global.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }
    transport.timeout = Duration::from_secs(global.timeout);

    let session = ControllerSession::new(url, credentials, &transport)
        .map_err(|e| CliError::ConnectionFailed {
            detail: e.to_string(),
        })?;

    Ok(Context {
        session,
        template_dir: global
            .template_dir
            .clone()
            .or_else(|| profile.template_dir.clone())
            .unwrap_or_else(|| cfg.defaults.template_dir.clone()),
        output_dir: profile
            .output_dir
            .clone()
            .unwrap_or_else(|| cfg.defaults.output_dir.clone()),
    })
}

fn from_flags(cfg: &config::Config, global: &GlobalOpts) -> Result<Context, CliError> {
    let profile_name = global.profile.clone().unwrap_or_else(|| "default".into());

    let url_str = global
        .controller
        .as_deref()
        .ok_or_else(|| CliError::ProfileNotFound {
            name: profile_name.clone(),
            path: config::config_path().display().to_string(),
        })?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let username = global
        .username
        .clone()
        .or_else(|| std::env::var("ZTP_USERNAME").ok())
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.clone(),
        })?;
    let password = std::env::var("ZTP_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| CliError::NoCredentials {
            profile: profile_name,
        })?;

    let transport = TransportConfig {
        tls: if global.insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: Duration::from_secs(global.timeout),
    };

    let session = ControllerSession::new(url, Credentials { username, password }, &transport)
        .map_err(|e| CliError::ConnectionFailed {
            detail: e.to_string(),
        })?;

    Ok(Context {
        session,
        template_dir: global
            .template_dir
            .clone()
            .unwrap_or_else(|| cfg.defaults.template_dir.clone()),
        output_dir: cfg.defaults.output_dir.clone(),
    })
}
