//! Clap derive structures for the `nuimo-hue` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nuimo-hue -- drive Philips Hue lights from a Nuimo gesture remote
#[derive(Debug, Parser)]
#[command(
    name = "nuimo-hue",
    version,
    about = "Control Philips Hue lights with a Nuimo gesture remote",
    long_about = "Bridges Nuimo gesture events to a Philips Hue bridge.\n\n\
        Rotating the remote changes the brightness of all lights, pressing it\n\
        turns them off. Gesture events are read as JSON lines on stdin and\n\
        device feedback is written as JSON lines on stdout, so the process can\n\
        sit between any MQTT subscriber and publisher.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(long, env = "NUIMO_HUE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl GlobalOpts {
    /// The config file in effect: `--config` or the platform default.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(nuimo_hue_config::config_path)
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Commission the bridge if needed, then dispatch gestures from stdin
    Run(RunArgs),

    /// Find the bridge and register a user, then exit
    Setup(SetupArgs),

    /// Inspect or initialize the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Do not attempt bridge commissioning at startup
    #[arg(long)]
    pub skip_setup: bool,
}

#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Print the bridge username instead of masking it
    #[arg(long)]
    pub show_secret: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file if none exists
    Init,

    /// Display the resolved configuration
    Show {
        /// Print the bridge username instead of masking it
        #[arg(long)]
        show_secret: bool,
    },

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
