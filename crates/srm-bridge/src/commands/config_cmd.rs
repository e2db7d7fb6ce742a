//! `srm-bridge config`: path, init, set-password.

use srm_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", config::effective_path(global).display());
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::effective_path(global);
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists (use --force)", path.display()),
                });
            }
            let mut cfg = Config::default();
            config::apply_overrides(&mut cfg, global);
            srm_config::save_config(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = config::load(global)?;
            let router = &cfg.router;
            let password =
                rpassword::prompt_password(format!("Password for {}@{}: ", router.username, router.host))
                    .map_err(|e| CliError::Validation {
                        field: "password".into(),
                        reason: format!("failed to read password: {e}"),
                    })?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            srm_config::store_password(router, &password)?;
            if !global.quiet {
                eprintln!(
                    "✓ Password stored in system keyring for {}@{}",
                    router.username, router.host
                );
            }
            Ok(())
        }
    }
}
