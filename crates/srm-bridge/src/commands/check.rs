//! `srm-bridge check`: validate config without contacting the router.

use owo_colors::OwoColorize;
use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::effective_path(global);
    let cfg = config::load(global)?;
    let password = srm_config::resolve_password(&cfg.router);

    // Password presence is reported separately; it is not needed to validate.
    let bridge =
        srm_config::bridge_config_with(&cfg, SecretString::from(String::new()))?.validated()?;
    let base_url = bridge.base_url()?;
    let color = output::should_color(global.color);

    let password_status = match password {
        Ok(_) if color => "configured".green().to_string(),
        Ok(_) => "configured".into(),
        Err(_) if color => "missing".red().to_string(),
        Err(_) => "missing".into(),
    };

    let lines = [
        ("config", path.display().to_string()),
        ("router", base_url.to_string()),
        ("username", bridge.username.clone()),
        ("password", password_status),
        ("tls", config::describe_tls(&bridge.tls)),
        ("interval", format!("{}s", bridge.interval.as_secs())),
        ("connect timeout", format!("{}ms", bridge.connect_timeout.as_millis())),
        ("reconnect delay", format!("{}s", bridge.reconnect_delay.as_secs())),
        ("write settle", format!("{}s", bridge.write_settle.as_secs())),
        ("retry policy", bridge.retry_policy.to_string()),
    ];
    let text = lines
        .iter()
        .map(|(key, value)| format!("{key:>16}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");
    output::print_output(&text, global.quiet);
    Ok(())
}
