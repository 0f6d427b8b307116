//! Config subcommand handlers.

use std::path::Path;

use nuimo_hue_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::commands;
use crate::error::CliError;

/// Format the resolved config for display, masking the bridge username.
fn format_config_redacted(cfg: &Config, show_secret: bool) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = writeln!(out, "[hue]");
    let _ = writeln!(out, "host = \"{}\"", cfg.hue.host);
    let _ = writeln!(
        out,
        "username = \"{}\"",
        commands::display_username(&cfg.hue.username, show_secret)
    );
    let _ = writeln!(out, "group = {}", cfg.hue.group);
    let _ = writeln!(out, "timeout = {}", cfg.hue.timeout);
    let _ = writeln!(out, "discovery_url = \"{}\"", cfg.hue.discovery_url);
    let _ = writeln!(out);
    let _ = writeln!(out, "[mqtt]");
    let _ = writeln!(out, "host = \"{}\"", cfg.mqtt.host);
    let _ = writeln!(out);
    let _ = writeln!(out, "[commissioning]");
    let _ = writeln!(
        out,
        "app_description = \"{}\"",
        cfg.commissioning.app_description
    );
    let _ = writeln!(out, "retries = {}", cfg.commissioning.retries);
    let _ = writeln!(out, "retry_delay = {}", cfg.commissioning.retry_delay);

    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, config_path: &Path) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let written = nuimo_hue_config::init_config(config_path)
                .map_err(|e| CliError::config(config_path, e))?;
            if written {
                eprintln!("Wrote default configuration to {}", config_path.display());
            } else {
                eprintln!("Configuration already exists at {}", config_path.display());
            }
            Ok(())
        }

        ConfigCommand::Show { show_secret } => {
            let cfg = commands::load(config_path)?;
            print!("{}", format_config_redacted(&cfg, show_secret));
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}
