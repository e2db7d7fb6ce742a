//! CLI-aware config resolution.
//!
//! Wraps srm-config: loads the file (or the `--config` override), applies
//! command-line flags, and produces a `BridgeConfig`.

use std::path::PathBuf;

use srm_config::Config;
use srm_core::{BridgeConfig, TlsVerification};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// The file `load` reads.
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(srm_config::config_path)
}

/// Load config and apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = srm_config::load_config(global.config.as_deref())?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        cfg.router.host.clone_from(host);
    }
    if let Some(port) = global.port {
        cfg.router.port = port;
    }
    if let Some(ref username) = global.username {
        cfg.router.username.clone_from(username);
    }
    if let Some(interval) = global.interval {
        cfg.polling.interval = interval;
    }
    if global.insecure {
        cfg.router.insecure = true;
        cfg.router.ca_cert = None;
    }
}

/// Resolve credentials and build the controller config.
pub fn build_bridge_config(global: &GlobalOpts) -> Result<BridgeConfig, CliError> {
    let cfg = load(global)?;
    Ok(srm_config::to_bridge_config(&cfg)?)
}

/// `--output`, else the config default, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    use clap::ValueEnum;

    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Short description of the TLS mode for `check`.
pub fn describe_tls(tls: &TlsVerification) -> String {
    match tls {
        TlsVerification::SystemDefaults => "system CA store".into(),
        TlsVerification::CustomCa(path) => format!("custom CA ({})", path.display()),
        TlsVerification::DangerAcceptInvalid => "accept self-signed".into(),
    }
}
